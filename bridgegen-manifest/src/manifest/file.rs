use std::path::{Path, PathBuf};

use super::Manifest;
use crate::{Error, Result};

/// Name of the manifest picked up from the working directory.
const DEFAULT_FILE_NAME: &str = "bridge.toml";

/// Represents a bridge.toml file with both raw content and parsed manifest.
pub struct BridgeToml {
    path: PathBuf,
    content: String,
    manifest: Manifest,
}

impl BridgeToml {
    /// Open and parse a bridge.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let filename = path.display().to_string();
        let manifest = Manifest::from_str_with_filename(&content, &filename)?;

        Ok(Self {
            path,
            content,
            manifest,
        })
    }

    /// Open `bridge.toml` in `dir` if it exists.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Option<Self>> {
        let candidate = dir.as_ref().join(DEFAULT_FILE_NAME);
        if !candidate.is_file() {
            return Ok(None);
        }
        Self::open(candidate).map(Some)
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the raw content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the parsed manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn into_manifest(self) -> Manifest {
        self.manifest
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_discover_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(BridgeToml::discover(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_discover_reads_manifest() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("bridge.toml"),
            "[handler]\nclass = \"Other\"\n",
        )
        .unwrap();

        let file = BridgeToml::discover(dir.path()).unwrap().unwrap();
        assert_eq!(file.path(), dir.path().join("bridge.toml"));
        assert!(file.content().contains("Other"));
        assert_eq!(file.manifest().handler.class, "Other");
    }

    #[test]
    fn test_discover_reports_invalid_manifest() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bridge.toml"), "[emit]\nlock = \"1x\"\n").unwrap();
        assert!(BridgeToml::discover(dir.path()).is_err());
    }
}

//! The patched server source.

use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::{Result, WrapErr};
use serde::Serialize;

use crate::patch::PatchSet;

/// The skeleton after patching, not yet written.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedServer {
    path: PathBuf,
    patch: PatchSet,
    #[serde(skip)]
    content: String,
}

impl GeneratedServer {
    pub fn new(path: impl Into<PathBuf>, patch: PatchSet, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            patch,
            content: content.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// The edits that produced the content.
    pub fn patch(&self) -> &PatchSet {
        &self.patch
    }

    /// Write the content to its path, replacing any previous file.
    pub fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, &self.content)
            .wrap_err_with(|| format!("failed to write {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_creates_parent_and_truncates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gen-cpp").join("RemoteManager_server.cpp");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "a much longer previous content\n").unwrap();

        let server = GeneratedServer::new(&path, PatchSet::new(), "int x;\n");
        server.write().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "int x;\n");
        assert_eq!(server.path(), path);
    }

    #[test]
    fn test_write_into_new_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("server.cpp");
        GeneratedServer::new(&path, PatchSet::new(), "").write().unwrap();
        assert!(path.exists());
    }
}

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Placeholder for the hardware library root in path templates.
const LIBRARY_PLACEHOLDER: &str = "{library}";
/// Placeholder for the Thrift include root in path templates.
const THRIFT_PLACEHOLDER: &str = "{thrift}";

/// The `[sources]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Sources {
    /// Thrift-generated server skeleton to patch
    pub skeleton: String,

    /// Where the patched server is written
    pub output: String,

    /// Header declaring the manager class
    pub manager_header: String,

    /// Include search path, in order
    pub include_dirs: Vec<String>,

    /// Macros defined before parsing (`NAME` or `NAME=VALUE`)
    pub defines: Vec<String>,

    /// Identifiers dropped from the token stream, e.g. export decorators
    pub ignored_macros: Vec<String>,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            skeleton: "gen-cpp/RemoteManager_server.skeleton.cpp".into(),
            output: "gen-cpp/RemoteManager_server.cpp".into(),
            manager_header: "{library}/cpp/src/Manager.h".into(),
            include_dirs: [
                "gen-cpp",
                "{thrift}",
                "{library}/cpp/tinyxml",
                "{library}/cpp/src",
                "{library}/cpp/src/value_classes",
                "{library}/cpp/src/command_classes",
                "{library}/cpp/src/platform",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            defines: vec!["HAVE_INTTYPES_H".into(), "HAVE_NETINET_IN_H".into()],
            ignored_macros: vec!["OPENZWAVE_EXPORT".into()],
        }
    }
}

/// The two external source trees named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    /// OpenZWave checkout (`--ozwroot`)
    pub library: PathBuf,
    /// Thrift C++ include directory (`--thriftroot`)
    pub thrift: PathBuf,
}

/// [`Sources`] with placeholders substituted and relative paths anchored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSources {
    pub skeleton: PathBuf,
    pub output: PathBuf,
    pub manager_header: PathBuf,
    pub include_dirs: Vec<PathBuf>,
    pub defines: Vec<String>,
    pub ignored_macros: Vec<String>,
}

impl Sources {
    /// Substitute `{library}` / `{thrift}` and resolve relative paths
    /// against `base` (the working directory).
    pub fn resolve(&self, roots: &Roots, base: &Path) -> ResolvedSources {
        let path = |template: &str| {
            let substituted = template
                .replace(LIBRARY_PLACEHOLDER, &roots.library.to_string_lossy())
                .replace(THRIFT_PLACEHOLDER, &roots.thrift.to_string_lossy());
            let path = PathBuf::from(substituted);
            if path.is_absolute() {
                path
            } else {
                base.join(path)
            }
        };

        ResolvedSources {
            skeleton: path(&self.skeleton),
            output: path(&self.output),
            manager_header: path(&self.manager_header),
            include_dirs: self.include_dirs.iter().map(|d| path(d)).collect(),
            defines: self.defines.clone(),
            ignored_macros: self.ignored_macros.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots() -> Roots {
        Roots {
            library: PathBuf::from("/opt/open-zwave"),
            thrift: PathBuf::from("/usr/include/thrift"),
        }
    }

    #[test]
    fn test_placeholders_substituted() {
        let resolved = Sources::default().resolve(&roots(), Path::new("/work"));
        assert_eq!(
            resolved.manager_header,
            PathBuf::from("/opt/open-zwave/cpp/src/Manager.h")
        );
        assert_eq!(resolved.include_dirs[1], PathBuf::from("/usr/include/thrift"));
        assert_eq!(
            resolved.include_dirs[6],
            PathBuf::from("/opt/open-zwave/cpp/src/platform")
        );
    }

    #[test]
    fn test_relative_paths_anchored_to_base() {
        let resolved = Sources::default().resolve(&roots(), Path::new("/work"));
        assert_eq!(
            resolved.skeleton,
            PathBuf::from("/work/gen-cpp/RemoteManager_server.skeleton.cpp")
        );
        assert_eq!(
            resolved.output,
            PathBuf::from("/work/gen-cpp/RemoteManager_server.cpp")
        );
        assert_eq!(resolved.include_dirs[0], PathBuf::from("/work/gen-cpp"));
    }

    #[test]
    fn test_defines() {
        let resolved = Sources::default().resolve(&roots(), Path::new("/work"));
        assert_eq!(resolved.defines, vec!["HAVE_INTTYPES_H", "HAVE_NETINET_IN_H"]);
    }
}

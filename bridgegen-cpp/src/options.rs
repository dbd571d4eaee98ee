//! Front-end configuration.

use std::path::PathBuf;

/// Include search path and predefined macros for one parse batch.
#[derive(Debug, Clone, Default)]
pub struct FrontendOptions {
    /// Directories searched for `#include` targets, in order.
    pub include_dirs: Vec<PathBuf>,
    /// Object-like macros defined before parsing (`-D` flags).
    pub defines: Vec<String>,
    /// Identifiers removed from the token stream, e.g. export decorators.
    pub ignored_macros: Vec<String>,
}

impl FrontendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dirs.push(dir.into());
        self
    }

    pub fn define(mut self, name: impl Into<String>) -> Self {
        self.defines.push(name.into());
        self
    }

    pub fn ignore_macro(mut self, name: impl Into<String>) -> Self {
        self.ignored_macros.push(name.into());
        self
    }
}

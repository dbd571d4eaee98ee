//! Manifest types and parsing for bridge.toml files.

mod classes;
mod emit;
mod file;
mod matching;
mod parse;
mod sources;
mod validate;

pub use classes::{Handler, Manager};
pub use emit::{Emit, IndentStyle};
pub use file::BridgeToml;
pub use matching::Matching;
pub use parse::parse_manifest;
use serde::Deserialize;
pub use sources::{ResolvedSources, Roots, Sources};
pub use validate::ParseContext;

/// Root manifest for bridge.toml.
///
/// Every section is optional; `Manifest::default()` reproduces the
/// OpenZWave `RemoteManager` setup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    /// Input and output files, include path and predefined macros
    pub sources: Sources,

    /// The RPC-facing class whose method bodies are generated
    pub handler: Handler,

    /// The library class the handler forwards to
    pub manager: Manager,

    /// Handler-to-manager name matching and argument binding rules
    pub matching: Matching,

    /// Shape of the emitted code
    pub emit: Emit,
}

impl Manifest {
    /// Whether a manager method is intentionally not exposed by the handler.
    pub fn is_ignored(&self, method: &str) -> bool {
        self.manager.ignored_methods.iter().any(|m| m == method)
    }
}

//! Built-in pipeline phases.
//!
//! - [`ParsePhase`] - parses the skeleton and manager header
//! - [`InventoryPhase`] - lists methods on both sides and runs coverage lints
//! - [`ResolvePhase`] - matches overloads, binds arguments and plans each body
//! - [`EmitPhase`] - applies the plans to the skeleton text

mod emit;
pub mod inventory;
mod parse;
mod resolve;

pub use emit::EmitPhase;
pub use inventory::{CoverageLint, InventoryPhase, Lint, LintInfo, UnknownIgnoreLint};
pub use parse::ParsePhase;
pub use resolve::ResolvePhase;

//! Built-in inventory lints.

mod coverage;
mod unknown_ignore;

pub use coverage::CoverageLint;
pub use unknown_ignore::UnknownIgnoreLint;

//! Generation pipeline.
//!
//! A [`Pipeline`] runs the phases from parsing to patching:
//!
//! - Explicit phase boundaries (parse → inventory → resolve → emit)
//! - Plugin hooks before and after each phase
//! - Diagnostics collected in one place
//! - Intermediate results shared through [`CompilationContext`]
//!
//! # Example
//!
//! ```ignore
//! use bridgegen_codegen::pipeline::{Pipeline, Severity};
//!
//! let mut ctx = Pipeline::new().run(manifest, sources)?;
//! for diag in &ctx.diagnostics {
//!     if matches!(diag.severity, Severity::Warning) {
//!         eprintln!("warning: {}", diag.message);
//!     }
//! }
//! ctx.take_output()?.write()?;
//! ```

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod plugin;
mod runner;
mod snapshot;

pub use context::CompilationContext;
pub use diagnostic::{Diagnostic, Severity};
pub use phase::{Phase, PhaseInfo};
pub use plugin::Plugin;
pub use runner::Pipeline;
pub use snapshot::{PhaseSnapshot, SnapshotPlugin};

//! Bridge generation for the bridgegen server generator.
//!
//! Takes the parsed Thrift server skeleton and the OpenZWave manager header
//! and rewrites every handler method body into a call on the manager
//! singleton.
//!
//! # Module Organization
//!
//! - [`pipeline`] - Phase orchestration, diagnostics and plugins
//! - [`inventory`] - Public method inventory and coverage
//! - [`matching`] - Handler name splitting and overload selection
//! - [`binding`] - Manager argument to handler value binding
//! - [`call`] - Call, return clause and size checks
//! - [`callbacks`] - Callback stub registry
//! - [`patch`] - Span edits over the skeleton text
//! - [`builder`] - Indented code building
//! - [`output`] - The generated server source

pub mod binding;
pub mod builder;
pub mod call;
pub mod callbacks;
pub mod error;
pub mod inventory;
pub mod matching;
pub mod output;
pub mod patch;
pub mod pipeline;
pub mod plan;

#[cfg(test)]
mod testing;

pub use error::{PatchError, ResolveError};
pub use output::GeneratedServer;
pub use pipeline::{CompilationContext, Diagnostic, Pipeline, Severity};

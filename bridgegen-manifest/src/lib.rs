//! Configuration for the bridgegen server generator.
//!
//! Everything the generator used to hard-code (file locations, include
//! search path, class names, the ignore list, the overload naming convention
//! and the shape of the emitted code) lives in an optional `bridge.toml`.
//! A missing file or section falls back to the OpenZWave / Thrift defaults.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod manifest;

pub use error::{Error, Result, SourceContext};
pub use manifest::{
    BridgeToml, Emit, Handler, IndentStyle, Manager, Manifest, Matching, ParseContext,
    ResolvedSources, Roots, Sources, parse_manifest,
};

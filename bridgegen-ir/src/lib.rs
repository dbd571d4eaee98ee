//! Language-neutral symbol table for the bridgegen server generator.
//!
//! The C++ front end (`bridgegen-cpp`) lowers the parsed translation units
//! into these types; the matching and patching logic (`bridgegen-codegen`)
//! only ever looks at them.
//!
//! # Architecture
//!
//! ```text
//! skeleton.cpp + Manager.h → bridgegen-cpp (lex, preprocess, parse)
//!                          → bridgegen-ir (symbol table)
//!                          → bridgegen-codegen (match, bind, patch)
//! ```
//!
//! Every declaration keeps the byte [`Span`] it came from, so generated code
//! can be spliced into the original file text by symbol identity.

mod span;
mod symbols;
mod types;

pub use span::{BodySpan, FileId, SourceFile, Span};
pub use symbols::{
    Access, Class, ClassKind, Field, FreeFunction, Method, MethodKind, Param, SymbolTable, Typedef,
};
pub use types::{CppType, FunctionSig};

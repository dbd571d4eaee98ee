//! Declaration-level C++ front end.
//!
//! Reads a batch of translation units (the server skeleton and the manager
//! header) through a small preprocessor and a tolerant parser, and lowers
//! what it finds into a [`bridgegen_ir::SymbolTable`]. It does not type-check
//! or expand macros; it only needs classes, methods, fields, typedefs and
//! function bodies with their exact byte spans.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod lexer;
mod options;
mod parser;
mod preprocess;
mod types;

use std::path::{Path, PathBuf};

use bridgegen_ir::SymbolTable;
pub use error::{Error, Result, SourceContext};
pub use lexer::{Token, TokenKind, lex};
pub use options::FrontendOptions;
pub use parser::{Parsed, parse};
pub use preprocess::{Preprocessed, Preprocessor, evaluate};
use tracing::debug;

/// Result of parsing a batch of root files.
#[derive(Debug, Default)]
pub struct Batch {
    pub symbols: SymbolTable,
    /// Include targets not found on the search path (system headers, usually).
    pub unresolved_includes: Vec<String>,
}

/// Parse several root files in one batch.
///
/// All roots share one include-once set and one macro table, so a header
/// pulled in by the first root is not parsed again for the second.
pub fn parse_batch<P: AsRef<Path>>(roots: &[P], options: &FrontendOptions) -> Result<Batch> {
    let mut pp = Preprocessor::new(options);
    for root in roots {
        pp.add_root(root.as_ref())?;
    }
    finish(pp)
}

/// Parse in-memory sources as one batch; includes still resolve on disk.
pub fn parse_sources(
    sources: &[(PathBuf, String)],
    options: &FrontendOptions,
) -> Result<Batch> {
    let mut pp = Preprocessor::new(options);
    for (path, text) in sources {
        pp.add_source(path.clone(), text.clone())?;
    }
    finish(pp)
}

fn finish(pp: Preprocessor<'_>) -> Result<Batch> {
    let pre = pp.finish();
    debug!(
        files = pre.files.len(),
        tokens = pre.tokens.len(),
        unresolved = pre.unresolved_includes.len(),
        "preprocessed batch"
    );
    let parsed = parse(&pre.tokens, &pre.files)?;
    Ok(Batch {
        symbols: SymbolTable {
            files: pre.files,
            classes: parsed.classes,
            typedefs: parsed.typedefs,
            functions: parsed.functions,
        },
        unresolved_includes: pre.unresolved_includes,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_batch_shares_headers() {
        let dir = TempDir::new().unwrap();
        let inc = dir.path().join("inc");
        fs::create_dir(&inc).unwrap();
        fs::write(
            inc.join("Defs.h"),
            "#ifndef DEFS_H\n#define DEFS_H\ntypedef unsigned char uint8;\n#endif\n",
        )
        .unwrap();
        fs::write(
            inc.join("Manager.h"),
            "#include \"Defs.h\"\nnamespace OpenZWave { class Manager { public: uint8 GetLevel(); }; }\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("server.cpp"),
            "#include <Defs.h>\nclass Handler { public: int8_t GetLevel() { return 0; } };\n",
        )
        .unwrap();

        let options = FrontendOptions::new().include_dir(&inc);
        let batch = parse_batch(
            &[dir.path().join("server.cpp"), inc.join("Manager.h")],
            &options,
        )
        .unwrap();

        let table = &batch.symbols;
        assert_eq!(table.files.len(), 3);
        assert!(table.class("Handler").is_some());
        assert!(table.class("Manager").is_some());
        assert_eq!(table.typedefs.len(), 1);

        let level = &table.class("OpenZWave::Manager").unwrap().methods[0];
        let ret = level.return_type.as_ref().unwrap();
        assert_eq!(table.element_size(ret), Some(8));
    }

    #[test]
    fn test_parse_sources_in_memory() {
        let batch = parse_sources(
            &[(
                PathBuf::from("skeleton.cpp"),
                "class H { public: void f(int a) {} };\nint main() { return 0; }\n".to_string(),
            )],
            &FrontendOptions::new(),
        )
        .unwrap();
        assert!(batch.symbols.function("main").is_some());
        assert_eq!(batch.symbols.class("H").unwrap().methods.len(), 1);
    }

    #[test]
    fn test_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let result = parse_batch(&[dir.path().join("missing.h")], &FrontendOptions::new());
        assert!(matches!(result.map(|_| ()).unwrap_err().as_ref(), Error::Io { .. }));
    }
}

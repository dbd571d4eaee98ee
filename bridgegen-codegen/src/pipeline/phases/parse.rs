//! Parse phase - reads the skeleton and manager header into a symbol table.

use std::{fs, path::Path};

use bridgegen_cpp::{FrontendOptions, parse_batch};
use bridgegen_ir::{FileId, SymbolTable};
use eyre::{Result, WrapErr, eyre};
use tracing::{debug, info};

use crate::pipeline::{CompilationContext, Phase};

/// Phase that parses both C++ inputs in one batch.
///
/// The skeleton and the manager header share one include-once set, so the
/// manager header pulled in through the Thrift types is parsed only once.
pub struct ParsePhase;

impl Phase for ParsePhase {
    fn name(&self) -> &'static str {
        "parse"
    }

    fn description(&self) -> &'static str {
        "Parse the server skeleton and manager header"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let sources = &ctx.sources;
        let options = FrontendOptions {
            include_dirs: sources.include_dirs.clone(),
            defines: sources.defines.clone(),
            ignored_macros: sources.ignored_macros.clone(),
        };

        info!("Parsing: {}", sources.skeleton.display());
        info!("Parsing: {}", sources.manager_header.display());
        let roots = [sources.skeleton.clone(), sources.manager_header.clone()];
        let batch = parse_batch(&roots, &options)
            .map_err(|e| eyre::Report::new(*e))
            .wrap_err("failed to parse C++ sources")?;

        let skeleton = find_file(&batch.symbols, &sources.skeleton).ok_or_else(|| {
            eyre!(
                "skeleton {} is missing from the parsed files",
                sources.skeleton.display()
            )
        })?;

        debug!(
            files = batch.symbols.files.len(),
            classes = batch.symbols.classes.len(),
            typedefs = batch.symbols.typedefs.len(),
            "symbol table built"
        );
        if !batch.unresolved_includes.is_empty() {
            ctx.add_info(
                self.name(),
                format!(
                    "{} include(s) not found on the search path were skipped",
                    batch.unresolved_includes.len()
                ),
            );
        }
        ctx.skeleton = Some(skeleton);
        ctx.symbols = Some(batch.symbols);
        Ok(())
    }
}

/// The id of `path` among the parsed files, which are keyed by canonical path.
fn find_file(symbols: &SymbolTable, path: &Path) -> Option<FileId> {
    let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    symbols
        .files
        .iter()
        .find(|f| f.path == canonical || f.path == path)
        .map(|f| f.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    #[test]
    fn test_parse_fixture() {
        let fixture = Fixture::openzwave();
        let mut ctx = CompilationContext::new(fixture.manifest(), fixture.sources());
        ParsePhase.run(&mut ctx).unwrap();

        let symbols = ctx.symbols().unwrap();
        assert!(symbols.class("RemoteManagerHandler").is_some());
        assert!(symbols.class("OpenZWave::Manager").is_some());
        assert!(symbols.class("Bool_Bool").is_some());
        assert!(symbols.typedef("Driver::pfnControllerCallback_t").is_some());

        let skeleton = ctx.skeleton_file().unwrap();
        assert!(skeleton.path.ends_with("gen-cpp/RemoteManager_server.skeleton.cpp"));
        assert!(skeleton.text.starts_with("// This autogenerated skeleton"));
    }

    #[test]
    fn test_system_includes_are_reported() {
        let fixture = Fixture::openzwave();
        let mut ctx = CompilationContext::new(fixture.manifest(), fixture.sources());
        ParsePhase.run(&mut ctx).unwrap();
        assert!(
            ctx.diagnostics
                .iter()
                .any(|d| d.phase == "parse" && d.message.contains("not found on the search path"))
        );
    }

    #[test]
    fn test_missing_header_fails() {
        let fixture = Fixture::openzwave();
        let mut sources = fixture.sources();
        sources.manager_header = fixture.root().join("ozw/cpp/src/Missing.h");
        let mut ctx = CompilationContext::new(fixture.manifest(), sources);
        let err = ParsePhase.run(&mut ctx).unwrap_err();
        assert!(err.to_string().contains("failed to parse C++ sources"));
        assert!(ctx.symbols.is_none());
    }
}

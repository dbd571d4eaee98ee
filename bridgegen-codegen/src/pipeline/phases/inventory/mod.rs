//! Inventory phase - lists both classes' public methods and checks coverage.

mod lint;
pub mod lints;

use bridgegen_ir::{Class, FileId, SymbolTable};
use eyre::{Result, WrapErr};
pub use lint::{Lint, LintInfo};
pub use lints::{CoverageLint, UnknownIgnoreLint};
use tracing::info;

use crate::{
    error::ResolveError,
    inventory::Inventory,
    pipeline::{CompilationContext, Phase},
};

/// Phase that builds the [`Inventory`] and runs lints over it.
pub struct InventoryPhase {
    lints: Vec<Box<dyn Lint>>,
}

impl InventoryPhase {
    /// Create an inventory phase with the default lints.
    pub fn new() -> Self {
        Self {
            lints: vec![Box::new(CoverageLint), Box::new(UnknownIgnoreLint)],
        }
    }

    /// Create an inventory phase with no lints.
    pub fn empty() -> Self {
        Self { lints: Vec::new() }
    }

    pub fn with_lint(mut self, lint: impl Lint + 'static) -> Self {
        self.lints.push(Box::new(lint));
        self
    }

    pub fn lint_names(&self) -> Vec<&'static str> {
        self.lints.iter().map(|l| l.name()).collect()
    }

    pub fn lint_info(&self) -> Vec<LintInfo> {
        self.lints.iter().map(|l| l.info()).collect()
    }
}

impl Default for InventoryPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for InventoryPhase {
    fn name(&self) -> &'static str {
        "inventory"
    }

    fn description(&self) -> &'static str {
        "List handler and manager methods and check coverage"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let manifest = &ctx.manifest;
        let pattern = manifest
            .matching
            .disambiguation_regex()
            .wrap_err("invalid disambiguation pattern")?;

        let inventory = {
            let symbols = ctx.symbols()?;
            let skeleton = ctx.skeleton_file()?.id;
            let handler = handler_class(symbols, &manifest.handler.class, skeleton)?;
            let manager = manager_class(symbols, &manifest.manager.class)?;
            Inventory::build(handler, manager, manifest, &pattern)
        };

        info!(
            handler = inventory.handler_count(),
            manager = inventory.manager_count(),
            ignored = inventory.ignored_count(),
            uncovered = inventory.uncovered.len(),
            "method inventory"
        );

        for lint in &self.lints {
            lint.check(&inventory, &ctx.manifest, &mut ctx.diagnostics);
        }
        ctx.inventory = Some(inventory);
        Ok(())
    }
}

/// The handler class, which must be defined in the skeleton itself.
pub(crate) fn handler_class<'s>(
    symbols: &'s SymbolTable,
    name: &str,
    skeleton: FileId,
) -> Result<&'s Class, ResolveError> {
    symbols
        .classes
        .iter()
        .find(|c| c.span.file == skeleton && (c.qualified_name == name || c.name == name))
        .ok_or_else(|| ResolveError::ClassNotFound(name.to_string()))
}

pub(crate) fn manager_class<'s>(
    symbols: &'s SymbolTable,
    name: &str,
) -> Result<&'s Class, ResolveError> {
    symbols
        .class(name)
        .ok_or_else(|| ResolveError::ClassNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use bridgegen_manifest::Manifest;

    use super::*;
    use crate::{
        pipeline::{Diagnostic, phases::ParsePhase},
        testing::Fixture,
    };

    fn parsed(fixture: &Fixture, manifest: Manifest) -> CompilationContext {
        let mut ctx = CompilationContext::new(manifest, fixture.sources());
        ParsePhase.run(&mut ctx).unwrap();
        ctx
    }

    #[test]
    fn test_fixture_inventory() {
        let fixture = Fixture::openzwave();
        let mut ctx = parsed(&fixture, fixture.manifest());
        InventoryPhase::new().run(&mut ctx).unwrap();

        let inventory = ctx.inventory().unwrap();
        assert_eq!(inventory.handler_class, "RemoteManagerHandler");
        assert_eq!(inventory.manager_class, "OpenZWave::Manager");
        assert_eq!(inventory.uncovered, vec!["ResetController", "SoftReset"]);
        assert!(inventory.handler_targets.contains(&"SetValue".to_string()));

        let warnings: Vec<_> = ctx.warnings().map(|d| d.message.as_str()).collect();
        assert_eq!(
            warnings,
            vec![
                "Missing OpenZWave::Manager method mapping from RemoteManagerHandler: 'ResetController'",
                "Missing OpenZWave::Manager method mapping from RemoteManagerHandler: 'SoftReset'",
            ]
        );
    }

    #[test]
    fn test_ignored_methods_never_warn() {
        let fixture = Fixture::openzwave();
        let mut ctx = parsed(&fixture, fixture.manifest());
        InventoryPhase::new().run(&mut ctx).unwrap();

        for ignored in &ctx.manifest.manager.ignored_methods {
            let quoted = format!("'{}'", ignored);
            assert!(ctx.diagnostics.iter().all(|d| !d.message.contains(&quoted)));
        }
    }

    #[test]
    fn test_missing_handler_class() {
        let fixture = Fixture::openzwave();
        let mut manifest = fixture.manifest();
        manifest.handler.class = "NoSuchHandler".into();
        let mut ctx = parsed(&fixture, manifest);

        let err = InventoryPhase::new().run(&mut ctx).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ResolveError>(),
            Some(&ResolveError::ClassNotFound("NoSuchHandler".into()))
        );
    }

    #[test]
    fn test_handler_must_live_in_skeleton() {
        let fixture = Fixture::openzwave();
        let mut manifest = fixture.manifest();
        // declared in RemoteManager.h, not in the skeleton
        manifest.handler.class = "RemoteManagerNull".into();
        let mut ctx = parsed(&fixture, manifest);
        assert!(InventoryPhase::new().run(&mut ctx).is_err());
    }

    #[test]
    fn test_custom_lint() {
        struct CountLint;
        impl Lint for CountLint {
            fn name(&self) -> &'static str {
                "count"
            }
            fn description(&self) -> &'static str {
                "Reports the handler method count"
            }
            fn check(&self, inventory: &Inventory, _: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
                diagnostics.push(Diagnostic::info(
                    "inventory",
                    format!("{} handler methods", inventory.handler_count()),
                ));
            }
        }

        let phase = InventoryPhase::empty().with_lint(CountLint);
        assert_eq!(phase.lint_names(), vec!["count"]);

        let fixture = Fixture::openzwave();
        let mut ctx = parsed(&fixture, fixture.manifest());
        phase.run(&mut ctx).unwrap();
        assert!(!ctx.has_warnings());
        assert_eq!(ctx.diagnostics.last().unwrap().message, "19 handler methods");
    }

    #[test]
    fn test_default_lints() {
        assert_eq!(InventoryPhase::new().lint_names(), vec!["coverage", "unknown-ignore"]);
    }
}

//! Lint for manager methods with no handler counterpart.

use bridgegen_manifest::Manifest;

use super::super::Lint;
use crate::{inventory::Inventory, pipeline::Diagnostic};

/// Warns once per public manager method that no handler method targets and
/// that is not on the ignore list.
pub struct CoverageLint;

impl Lint for CoverageLint {
    fn name(&self) -> &'static str {
        "coverage"
    }

    fn description(&self) -> &'static str {
        "Report manager methods the handler does not expose"
    }

    fn check(&self, inventory: &Inventory, manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
        let manager = manifest.manager.short_name();
        for name in &inventory.uncovered {
            diagnostics.push(
                Diagnostic::warning(
                    "inventory",
                    format!(
                        "Missing {} method mapping from {}: '{}'",
                        inventory.manager_class, inventory.handler_class, name
                    ),
                )
                .at(format!("{}::{}", manager, name)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory(uncovered: &[&str]) -> Inventory {
        Inventory {
            handler_class: "RemoteManagerHandler".into(),
            manager_class: "OpenZWave::Manager".into(),
            handler_methods: vec!["WriteConfig".into()],
            manager_methods: vec!["WriteConfig".into(), "SoftReset".into()],
            handler_targets: vec!["WriteConfig".into()],
            ignored: Vec::new(),
            uncovered: uncovered.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_uncovered_methods_warn() {
        let mut diagnostics = Vec::new();
        CoverageLint.check(&inventory(&["SoftReset"]), &Manifest::default(), &mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].severity.is_warning());
        assert_eq!(
            diagnostics[0].message,
            "Missing OpenZWave::Manager method mapping from RemoteManagerHandler: 'SoftReset'"
        );
        assert_eq!(diagnostics[0].location.as_deref(), Some("Manager::SoftReset"));
    }

    #[test]
    fn test_full_coverage_is_silent() {
        let mut diagnostics = Vec::new();
        CoverageLint.check(&inventory(&[]), &Manifest::default(), &mut diagnostics);
        assert!(diagnostics.is_empty());
    }
}

//! Lint for ignore-list entries the manager does not declare.

use bridgegen_manifest::Manifest;

use super::super::Lint;
use crate::{inventory::Inventory, pipeline::Diagnostic};

/// Notes ignored method names that match no public manager method, usually a
/// typo or a method removed from the library.
pub struct UnknownIgnoreLint;

impl Lint for UnknownIgnoreLint {
    fn name(&self) -> &'static str {
        "unknown-ignore"
    }

    fn description(&self) -> &'static str {
        "Report ignored names that are not manager methods"
    }

    fn check(&self, inventory: &Inventory, _manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
        for name in &inventory.ignored {
            if !inventory.manager_methods.contains(name) {
                diagnostics.push(
                    Diagnostic::info(
                        "inventory",
                        format!(
                            "ignored method '{}' is not a public method of {}",
                            name, inventory.manager_class
                        ),
                    )
                    .at(format!("manager.ignored_methods.{}", name)),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_ignored_name() {
        let inventory = Inventory {
            handler_class: "RemoteManagerHandler".into(),
            manager_class: "OpenZWave::Manager".into(),
            handler_methods: Vec::new(),
            manager_methods: vec!["Create".into(), "Get".into()],
            handler_targets: Vec::new(),
            ignored: vec!["Create".into(), "Destory".into()],
            uncovered: Vec::new(),
        };
        let mut diagnostics = Vec::new();
        UnknownIgnoreLint.check(&inventory, &Manifest::default(), &mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, crate::pipeline::Severity::Info);
        assert!(diagnostics[0].message.contains("'Destory'"));
    }
}

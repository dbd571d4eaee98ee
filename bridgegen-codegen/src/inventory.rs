//! Public method inventory of the handler and manager classes.

use bridgegen_ir::Class;
use bridgegen_manifest::Manifest;
use indexmap::IndexSet;
use regex::Regex;
use serde::Serialize;

use crate::matching::split_name;

/// Method names on both sides of the bridge and what is left uncovered.
#[derive(Debug, Clone, Serialize)]
pub struct Inventory {
    pub handler_class: String,
    pub manager_class: String,
    /// Public handler methods in declaration order.
    pub handler_methods: Vec<String>,
    /// Distinct public manager method names in declaration order.
    pub manager_methods: Vec<String>,
    /// Handler method names with the disambiguation suffix removed.
    pub handler_targets: Vec<String>,
    /// Manager methods excluded from coverage by configuration.
    pub ignored: Vec<String>,
    /// Manager methods no handler method targets and not ignored.
    pub uncovered: Vec<String>,
}

impl Inventory {
    pub fn build(handler: &Class, manager: &Class, manifest: &Manifest, pattern: &Regex) -> Self {
        let handler_methods: Vec<String> =
            handler.public_methods().map(|m| m.name.clone()).collect();
        let manager_methods: IndexSet<&str> =
            manager.public_methods().map(|m| m.name.as_str()).collect();
        let targets: IndexSet<String> = handler_methods
            .iter()
            .map(|name| split_name(pattern, name).target.to_string())
            .collect();

        let uncovered = manager_methods
            .iter()
            .filter(|name| !targets.contains(**name) && !manifest.is_ignored(name))
            .map(|name| name.to_string())
            .collect();

        Self {
            handler_class: handler.qualified_name.clone(),
            manager_class: manager.qualified_name.clone(),
            handler_targets: targets.into_iter().collect(),
            manager_methods: manager_methods.iter().map(|m| m.to_string()).collect(),
            ignored: manifest.manager.ignored_methods.clone(),
            uncovered,
            handler_methods,
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handler_methods.len()
    }

    pub fn manager_count(&self) -> usize {
        self.manager_methods.len()
    }

    pub fn ignored_count(&self) -> usize {
        self.ignored.len()
    }

    pub fn is_complete(&self) -> bool {
        self.uncovered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use bridgegen_cpp::{FrontendOptions, parse_sources};

    use super::*;

    #[test]
    fn test_inventory_coverage() {
        let src = r#"
namespace OpenZWave {
class Manager {
 public:
  static Manager* Create();
  static Manager* Get();
  Manager();
  void WriteConfig(int _homeId);
  bool SetValue(int _id, bool _value);
  bool SetValue(int _id, int _value);
  bool RefreshNodeInfo(int _homeId, int _nodeId);
 private:
  void Hidden();
};
}
class RemoteManagerHandler {
 public:
  RemoteManagerHandler() {}
  void WriteConfig(int _homeId) {}
  bool SetValue_Bool(int _id, bool _value) {}
  bool SetValue_Int32(int _id, int _value) {}
};
"#;
        let symbols = parse_sources(
            &[(PathBuf::from("inv.cpp"), src.to_string())],
            &FrontendOptions::new(),
        )
        .unwrap()
        .symbols;
        let manifest = Manifest::default();
        let pattern = manifest.matching.disambiguation_regex().unwrap();
        let inventory = Inventory::build(
            symbols.class("RemoteManagerHandler").unwrap(),
            symbols.class("Manager").unwrap(),
            &manifest,
            &pattern,
        );

        assert_eq!(inventory.manager_class, "OpenZWave::Manager");
        assert_eq!(inventory.handler_count(), 3);
        assert_eq!(
            inventory.manager_methods,
            vec!["Create", "Get", "WriteConfig", "SetValue", "RefreshNodeInfo"]
        );
        assert_eq!(inventory.handler_targets, vec!["WriteConfig", "SetValue"]);
        assert_eq!(inventory.uncovered, vec!["RefreshNodeInfo"]);
        assert_eq!(inventory.ignored_count(), 8);
        assert!(!inventory.is_complete());
    }
}

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

/// The `[matching]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Matching {
    /// Splits a handler method name into target name (group 1) and
    /// overload hint (group 2). Names that do not match have no hint.
    pub disambiguation_pattern: String,

    /// Manager arguments whose name contains this get a callback stub
    pub callback_marker: String,

    /// Manager arguments whose name contains this get `context_expression`
    pub context_marker: String,

    /// Expression passed for context arguments
    pub context_expression: String,

    /// Handler argument types converted by calling a method on them,
    /// e.g. `RemoteValueID = "toValueID()"`
    pub conversions: IndexMap<String, String>,
}

impl Default for Matching {
    fn default() -> Self {
        let mut conversions = IndexMap::new();
        conversions.insert("RemoteValueID".to_string(), "toValueID()".to_string());
        Self {
            disambiguation_pattern: "^([^_]*)_(.*)$".into(),
            callback_marker: "callback".into(),
            context_marker: "context".into(),
            context_expression: "(void*) this".into(),
            conversions,
        }
    }
}

impl Matching {
    /// Compile the disambiguation pattern.
    pub fn disambiguation_regex(&self) -> Result<Regex, regex::Error> {
        Regex::new(&self.disambiguation_pattern)
    }

    /// Conversion call for a handler argument type, matched on the type's
    /// base name with or without namespace.
    pub fn conversion_for(&self, base: &str) -> Option<&str> {
        let last = base.rsplit("::").next().unwrap_or(base);
        self.conversions
            .get(base)
            .or_else(|| self.conversions.get(last))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern_splits_on_first_underscore() {
        let re = Matching::default().disambiguation_regex().unwrap();
        let caps = re.captures("SetValue_Uint8").unwrap();
        assert_eq!(&caps[1], "SetValue");
        assert_eq!(&caps[2], "Uint8");

        let caps = re.captures("GetValue_List_Selection").unwrap();
        assert_eq!(&caps[1], "GetValue");
        assert_eq!(&caps[2], "List_Selection");

        assert!(re.captures("WriteConfig").is_none());
    }

    #[test]
    fn test_conversion_lookup() {
        let matching = Matching::default();
        assert_eq!(matching.conversion_for("RemoteValueID"), Some("toValueID()"));
        assert_eq!(
            matching.conversion_for("OpenZWave::RemoteValueID"),
            Some("toValueID()")
        );
        assert_eq!(matching.conversion_for("int32_t"), None);
    }
}

//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from a check run.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the config file, `None` when running on defaults.
    pub config_path: Option<PathBuf>,
    /// Method coverage, absent when the pipeline stopped early.
    pub coverage: Option<Coverage>,
    /// Error messages.
    pub errors: Vec<String>,
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Info messages.
    pub infos: Vec<String>,
}

/// Handler and manager method counts.
#[derive(Debug)]
pub struct Coverage {
    pub handler_class: String,
    pub manager_class: String,
    pub handler_count: usize,
    pub manager_count: usize,
    pub ignored_count: usize,
    /// Handler methods with a planned body, `None` when resolution failed.
    pub mapped: Option<usize>,
    pub uncovered: Vec<String>,
}

impl CheckReport {
    /// Whether the check passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for error in &self.errors {
            out.error(error);
        }
        for warning in &self.warnings {
            out.warning(warning);
        }
        for info in &self.infos {
            out.preformatted(&format!("info: {}", info));
        }
        if !self.warnings.is_empty() || !self.errors.is_empty() {
            out.newline();
        }

        let config = self
            .config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in defaults".to_string());
        out.key_value("Configuration", &config);

        if let Some(coverage) = &self.coverage {
            out.newline();
            out.section(&format!(
                "{} -> {}",
                coverage.handler_class, coverage.manager_class
            ));
            out.key_value_indented("handler methods", &coverage.handler_count.to_string());
            out.key_value_indented("manager methods", &coverage.manager_count.to_string());
            out.key_value_indented("ignored", &coverage.ignored_count.to_string());
            if let Some(mapped) = coverage.mapped {
                out.key_value_indented("bridged", &mapped.to_string());
            }
            out.key_value_indented("uncovered", &coverage.uncovered.len().to_string());
        }

        if self.is_valid() {
            out.newline();
            out.preformatted("✓ every handler method can be bridged");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::testing::RecordingOutput;

    #[test]
    fn test_render_valid() {
        let report = CheckReport {
            config_path: None,
            coverage: Some(Coverage {
                handler_class: "RemoteManagerHandler".into(),
                manager_class: "OpenZWave::Manager".into(),
                handler_count: 19,
                manager_count: 24,
                ignored_count: 8,
                mapped: Some(18),
                uncovered: vec!["SoftReset".into()],
            }),
            errors: Vec::new(),
            warnings: vec!["Missing mapping: 'SoftReset'".into()],
            infos: Vec::new(),
        };
        let mut out = RecordingOutput::default();
        report.render(&mut out);

        assert_eq!(out.lines[0], "warning: Missing mapping: 'SoftReset'");
        assert!(out.lines.contains(&"Configuration: built-in defaults".to_string()));
        assert!(out.lines.contains(&"RemoteManagerHandler -> OpenZWave::Manager:".to_string()));
        assert!(out.lines.contains(&"  uncovered: 1".to_string()));
        assert_eq!(out.lines.last().unwrap(), "✓ every handler method can be bridged");
    }

    #[test]
    fn test_render_failed_resolution_keeps_coverage() {
        let report = CheckReport {
            config_path: None,
            coverage: Some(Coverage {
                handler_class: "RemoteManagerHandler".into(),
                manager_class: "OpenZWave::Manager".into(),
                handler_count: 19,
                manager_count: 24,
                ignored_count: 8,
                mapped: None,
                uncovered: vec!["ResetController".into(), "SoftReset".into()],
            }),
            errors: vec!["method 'SetValue': 'SetValue' is overloaded 5 times".into()],
            warnings: vec!["Missing mapping: 'SoftReset'".into()],
            infos: Vec::new(),
        };
        let mut out = RecordingOutput::default();
        report.render(&mut out);

        assert_eq!(out.lines[0], "error: method 'SetValue': 'SetValue' is overloaded 5 times");
        assert_eq!(out.lines[1], "warning: Missing mapping: 'SoftReset'");
        assert!(out.lines.contains(&"  uncovered: 2".to_string()));
        assert!(!out.lines.iter().any(|l| l.starts_with("  bridged")));
        assert!(!out.lines.iter().any(|l| l.starts_with('✓')));
    }

    #[test]
    fn test_render_errors() {
        let report = CheckReport {
            config_path: Some("bridge.toml".into()),
            coverage: None,
            errors: vec!["Resolution failed with 1 error(s)".into()],
            warnings: Vec::new(),
            infos: Vec::new(),
        };
        assert!(!report.is_valid());
        let mut out = RecordingOutput::default();
        report.render(&mut out);
        assert_eq!(
            out.lines,
            vec![
                "error: Resolution failed with 1 error(s)",
                "",
                "Configuration: bridge.toml",
            ]
        );
    }
}

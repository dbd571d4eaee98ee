//! Generate command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from server generation.
#[derive(Debug)]
pub struct GenerateReport {
    pub handler_class: String,
    pub manager_class: String,
    /// Number of handler methods given a new body.
    pub mapped: usize,
    /// Handler methods left unchanged.
    pub skipped: Vec<String>,
    /// Names of generated callback stubs.
    pub callbacks: Vec<String>,
    /// Warning messages from the pipeline.
    pub warnings: Vec<String>,
    pub result: GenerationResult,
}

/// Result of generation.
#[derive(Debug)]
pub enum GenerationResult {
    /// The server source was written to disk.
    Written(WrittenResult),
    /// Dry-run preview.
    Preview(PreviewResult),
}

#[derive(Debug)]
pub struct WrittenResult {
    pub path: PathBuf,
    /// Path to debug snapshots, if visualization was enabled.
    pub debug_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub struct PreviewResult {
    pub path: PathBuf,
    pub content: String,
    pub edit_count: usize,
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        match &self.result {
            GenerationResult::Written(written) => self.render_written(out, written),
            GenerationResult::Preview(preview) => self.render_preview(out, preview),
        }
    }
}

impl GenerateReport {
    fn render_written(&self, out: &mut dyn Output, written: &WrittenResult) {
        if let Some(debug_dir) = &written.debug_dir {
            out.key_value(
                "Pipeline snapshots written to",
                &debug_dir.display().to_string(),
            );
            out.newline();
        }

        for warning in &self.warnings {
            out.warning(warning);
        }
        if !self.warnings.is_empty() {
            out.newline();
        }

        out.section(&format!("{} -> {}", self.handler_class, self.manager_class));
        out.key_value_indented("bridged", &self.mapped.to_string());
        if !self.skipped.is_empty() {
            out.key_value_indented("unchanged", &self.skipped.join(", "));
        }
        if !self.callbacks.is_empty() {
            out.newline();
            out.section("Callback stubs to fill in");
            for name in &self.callbacks {
                out.list_item(name);
            }
        }
        out.newline();
        out.key_value("Generated", &written.path.display().to_string());
    }

    fn render_preview(&self, out: &mut dyn Output, preview: &PreviewResult) {
        for warning in &self.warnings {
            out.warning(warning);
        }
        out.divider(&preview.path.display().to_string());
        out.preformatted(&preview.content);
        out.divider("Summary");
        out.preformatted(&format!(
            "{} edits, {} methods bridged; nothing written",
            preview.edit_count, self.mapped
        ));
    }
}

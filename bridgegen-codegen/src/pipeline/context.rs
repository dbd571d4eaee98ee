//! Compilation context passed through pipeline phases.

use bridgegen_ir::{FileId, SourceFile, SymbolTable};
use bridgegen_manifest::{Manifest, ResolvedSources};
use eyre::{Result, eyre};

use super::diagnostic::{Diagnostic, Severity};
use crate::{inventory::Inventory, output::GeneratedServer, plan::Resolution};

/// Context passed through all pipeline phases.
///
/// Carries the configuration and every intermediate result, plus the
/// diagnostics accumulated along the way.
#[derive(Debug)]
pub struct CompilationContext {
    pub manifest: Manifest,
    /// Source paths with roots substituted.
    pub sources: ResolvedSources,
    /// Parsed declarations (populated by ParsePhase).
    pub symbols: Option<SymbolTable>,
    /// The skeleton's file inside `symbols` (populated by ParsePhase).
    pub skeleton: Option<FileId>,
    /// Method inventory (populated by InventoryPhase).
    pub inventory: Option<Inventory>,
    /// Per-method plans and callback stubs (populated by ResolvePhase).
    pub resolution: Option<Resolution>,
    /// The patched skeleton (populated by EmitPhase).
    pub output: Option<GeneratedServer>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationContext {
    pub fn new(manifest: Manifest, sources: ResolvedSources) -> Self {
        Self {
            manifest,
            sources,
            symbols: None,
            skeleton: None,
            inventory: None,
            resolution: None,
            output: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn add_error(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(phase, message));
    }

    pub fn add_warning(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(phase, message));
    }

    pub fn add_info(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::info(phase, message));
    }

    /// Add a diagnostic with a location.
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity.is_warning())
    }

    pub fn symbols(&self) -> Result<&SymbolTable> {
        self.symbols
            .as_ref()
            .ok_or_else(|| eyre!("symbol table not available: the parse phase has not run"))
    }

    /// The skeleton source as parsed.
    pub fn skeleton_file(&self) -> Result<&SourceFile> {
        let id = self
            .skeleton
            .ok_or_else(|| eyre!("skeleton not available: the parse phase has not run"))?;
        self.symbols()?
            .file(id)
            .ok_or_else(|| eyre!("skeleton file {:?} missing from the symbol table", id))
    }

    pub fn inventory(&self) -> Result<&Inventory> {
        self.inventory
            .as_ref()
            .ok_or_else(|| eyre!("inventory not available: the inventory phase has not run"))
    }

    pub fn resolution(&self) -> Result<&Resolution> {
        self.resolution
            .as_ref()
            .ok_or_else(|| eyre!("method plans not available: the resolve phase has not run"))
    }

    /// Take the generated server out of the context.
    pub fn take_output(&mut self) -> Result<GeneratedServer> {
        self.output
            .take()
            .ok_or_else(|| eyre!("no output: the emit phase has not run"))
    }
}

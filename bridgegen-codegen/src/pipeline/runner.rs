//! Pipeline orchestrator.

use bridgegen_manifest::{Manifest, ResolvedSources};
use eyre::Result;
use tracing::info;

use super::{
    CompilationContext, Phase, Plugin,
    phases::{EmitPhase, InventoryPhase, ParsePhase, ResolvePhase},
};

/// The generation pipeline orchestrator.
///
/// Runs the built-in phases (parse, inventory, resolve and, unless built with
/// [`Pipeline::check`], emit) followed by any user phases, calling plugin hooks
/// before and after each phase.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new().plugin(SnapshotPlugin::with_output_dir(".bridgegen/debug"));
/// let mut ctx = pipeline.run(manifest, sources)?;
/// ctx.take_output()?.write()?;
/// ```
pub struct Pipeline {
    emit: bool,
    phases: Vec<Box<dyn Phase>>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    /// A pipeline that produces the patched server.
    pub fn new() -> Self {
        Self {
            emit: true,
            phases: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// A pipeline that stops after resolving, producing no output.
    pub fn check() -> Self {
        Self {
            emit: false,
            ..Self::new()
        }
    }

    /// Add a phase to run after the built-in phases.
    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    /// Add a plugin to receive phase lifecycle hooks.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Run the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if any phase fails fatally. Nothing is written by the
    /// pipeline itself; the caller writes the output once every phase passed.
    pub fn run(&self, manifest: Manifest, sources: ResolvedSources) -> Result<CompilationContext> {
        let mut ctx = CompilationContext::new(manifest, sources);
        self.run_in(&mut ctx)?;
        Ok(ctx)
    }

    /// Run the pipeline over a caller-owned context.
    ///
    /// On failure the context keeps every diagnostic recorded before and by
    /// the failing phase, so warnings can still be reported.
    pub fn run_in(&self, ctx: &mut CompilationContext) -> Result<()> {
        let mut builtin_phases: Vec<Box<dyn Phase>> = vec![
            Box::new(ParsePhase),
            Box::new(InventoryPhase::new()),
            Box::new(ResolvePhase),
        ];
        if self.emit {
            builtin_phases.push(Box::new(EmitPhase));
        }

        for phase in builtin_phases.iter().chain(self.phases.iter()) {
            self.run_phase(phase.as_ref(), ctx)?;
        }

        Ok(())
    }

    fn run_phase(&self, phase: &dyn Phase, ctx: &mut CompilationContext) -> Result<()> {
        let phase_name = phase.name();
        info!(phase = phase_name, "{}", phase.description());

        for plugin in &self.plugins {
            plugin.on_before_phase(phase_name, ctx)?;
        }

        phase.run(ctx)?;

        for plugin in &self.plugins {
            plugin.on_after_phase(phase_name, ctx)?;
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

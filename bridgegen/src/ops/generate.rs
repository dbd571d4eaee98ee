//! Generate operation - patch the skeleton into the server source.

use bridgegen_codegen::pipeline::{CompilationContext, Pipeline, SnapshotPlugin};
use eyre::{Result, WrapErr};
use tracing::warn;

use crate::{
    commands::Job,
    reports::{GenerateReport, GenerationResult, PreviewResult, WrittenResult},
};

/// Options for the generate operation.
pub struct GenerateOptions {
    /// Whether to print the output without writing it.
    pub dry_run: bool,
    /// Whether to output debug snapshots.
    pub visualize: bool,
}

/// Execute the generate operation.
///
/// The output file is written only after every phase has succeeded.
pub fn generate(job: Job, opts: GenerateOptions) -> Result<GenerateReport> {
    let debug_dir = job.working_dir.join(".bridgegen/debug");
    let mut pipeline = Pipeline::new();
    if opts.visualize {
        pipeline = pipeline.plugin(SnapshotPlugin::with_output_dir(&debug_dir));
    }
    let mut ctx = CompilationContext::new(job.manifest, job.sources);
    if let Err(e) = pipeline.run_in(&mut ctx) {
        for diag in ctx.warnings() {
            warn!("{}", diag);
        }
        return Err(e);
    }

    let output = ctx.take_output()?;
    let resolution = ctx.resolution()?;
    let inventory = ctx.inventory()?;

    let result = if opts.dry_run {
        GenerationResult::Preview(PreviewResult {
            path: output.path().to_path_buf(),
            content: output.content().to_string(),
            edit_count: output.patch().len(),
        })
    } else {
        output.write().wrap_err("Failed to write the server source")?;
        GenerationResult::Written(WrittenResult {
            path: output.path().to_path_buf(),
            debug_dir: opts.visualize.then_some(debug_dir),
        })
    };

    Ok(GenerateReport {
        handler_class: inventory.handler_class.clone(),
        manager_class: inventory.manager_class.clone(),
        mapped: resolution.plans.len(),
        skipped: resolution.skipped.clone(),
        callbacks: resolution.callbacks.iter().map(|s| s.name.clone()).collect(),
        warnings: ctx.warnings().map(|d| d.to_string()).collect(),
        result,
    })
}

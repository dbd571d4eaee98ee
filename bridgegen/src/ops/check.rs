//! Check operation - coverage and bridging diagnostics.

use bridgegen_codegen::pipeline::{CompilationContext, Pipeline, Severity};
use eyre::Result;

use crate::{
    commands::Job,
    reports::{CheckReport, Coverage},
};

/// Execute the check operation.
///
/// Runs every phase except emit. Failures that stop the pipeline are
/// reported as errors rather than returned, together with the warnings
/// recorded before the failure. Front-end errors carry a source span and are
/// returned for rendering.
pub fn check(job: Job) -> Result<CheckReport> {
    let mut report = CheckReport {
        config_path: job.config_path,
        coverage: None,
        errors: Vec::new(),
        warnings: Vec::new(),
        infos: Vec::new(),
    };

    let mut ctx = CompilationContext::new(job.manifest, job.sources);
    match Pipeline::check().run_in(&mut ctx) {
        Ok(()) => {}
        Err(e) if e.downcast_ref::<bridgegen_cpp::Error>().is_some() => return Err(e),
        // located error diagnostics already describe the failure
        Err(e) if !ctx.has_errors() => report.errors.push(format!("{:#}", e)),
        Err(_) => {}
    }

    for diag in &ctx.diagnostics {
        let msg = match &diag.location {
            Some(loc) => format!("{}\n  --> {}", diag.message, loc),
            None => diag.message.clone(),
        };
        match diag.severity {
            Severity::Error => report.errors.push(msg),
            Severity::Warning => report.warnings.push(msg),
            Severity::Info => report.infos.push(msg),
        }
    }

    if let Some(inventory) = &ctx.inventory {
        report.coverage = Some(Coverage {
            handler_class: inventory.handler_class.clone(),
            manager_class: inventory.manager_class.clone(),
            handler_count: inventory.handler_count(),
            manager_count: inventory.manager_count(),
            ignored_count: inventory.ignored_count(),
            mapped: ctx.resolution.as_ref().map(|r| r.plans.len()),
            uncovered: inventory.uncovered.clone(),
        });
    }
    Ok(report)
}

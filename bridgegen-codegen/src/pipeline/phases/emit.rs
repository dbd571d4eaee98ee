//! Emit phase - patches the skeleton text into the server source.

use std::ops::Range;

use bridgegen_ir::SourceFile;
use bridgegen_manifest::Manifest;
use eyre::{Result, WrapErr};
use tracing::{debug, info};

use super::inventory::handler_class;
use crate::{
    builder::{CodeBuilder, Indent},
    output::GeneratedServer,
    patch::{PatchSet, line_starts},
    pipeline::{CompilationContext, Diagnostic, Phase},
    plan::MethodPlan,
};

const MAIN_COMMENT: &str = "// ";

/// Phase that turns the method plans into edits over the skeleton.
///
/// Every byte outside the banner, the callback block, the replaced method
/// bodies and the commented-out `main` is copied through unchanged.
pub struct EmitPhase;

impl Phase for EmitPhase {
    fn name(&self) -> &'static str {
        "emit"
    }

    fn description(&self) -> &'static str {
        "Rewrite handler bodies and patch the skeleton"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let mut diagnostics = Vec::new();
        let output = {
            let manifest = &ctx.manifest;
            let symbols = ctx.symbols()?;
            let file = ctx.skeleton_file()?;
            let inventory = ctx.inventory()?;
            let resolution = ctx.resolution()?;
            let handler = handler_class(symbols, &inventory.handler_class, file.id)?;
            let indent = Indent::from(&manifest.emit);

            let mut patch = PatchSet::new();
            if let Some((range, banner)) = banner_edit(&file.text, &manifest.emit.banner) {
                patch.replace(range, banner, "banner");
            }
            if !resolution.callbacks.is_empty() {
                patch.insert(
                    file.line_start(handler.head_line),
                    resolution.callbacks.render_block(indent),
                    "callback stubs",
                );
            }
            for plan in &resolution.plans {
                patch.replace(
                    plan.body.inner().range(),
                    replacement_body(file, plan, manifest, indent),
                    format!("body of {}", plan.handler),
                );
            }
            if manifest.emit.comment_out_main {
                let main = symbols
                    .functions
                    .iter()
                    .find(|f| f.name == "main" && f.name_span.file == file.id);
                match main {
                    Some(main) => {
                        comment_out_from(&mut patch, &file.text, main.line.saturating_sub(1))
                    }
                    None => diagnostics.push(Diagnostic::warning(
                        self.name(),
                        "no 'main' function in the skeleton, nothing commented out",
                    )),
                }
            }

            debug!(edits = patch.len(), "applying edits");
            let content = patch
                .apply(&file.text)
                .wrap_err("failed to patch the skeleton")?;
            GeneratedServer::new(ctx.sources.output.clone(), patch, content)
        };

        info!(
            path = %output.path().display(),
            bytes = output.content().len(),
            "server source generated"
        );
        ctx.diagnostics.extend(diagnostics);
        ctx.output = Some(output);
        Ok(())
    }
}

/// Replace the leading run of `//` lines with `banner`, or insert it at the
/// top when the file has none. An empty banner leaves the file alone.
fn banner_edit(text: &str, banner: &[String]) -> Option<(Range<usize>, String)> {
    if banner.is_empty() {
        return None;
    }
    let end = text
        .split_inclusive('\n')
        .take_while(|line| line.trim_start().starts_with("//"))
        .map(str::len)
        .sum();
    let mut replacement = String::new();
    for line in banner {
        replacement.push_str(line);
        replacement.push('\n');
    }
    Some((0..end, replacement))
}

/// The new text between a handler method's braces.
fn replacement_body(
    file: &SourceFile,
    plan: &MethodPlan,
    manifest: &Manifest,
    indent: Indent,
) -> String {
    let close = plan.body.close.start;
    let lead = file
        .text
        .get(file.line_start_of(close)..close)
        .unwrap_or_default();
    let close_indent = if lead.chars().all(char::is_whitespace) {
        lead
    } else {
        ""
    };

    let mut builder = CodeBuilder::at_level(indent, 1);
    builder.push_blank();
    for line in plan.call.body_lines(manifest) {
        builder.push_line(&line);
    }
    builder.push_raw(close_indent);
    builder.build()
}

/// Prefix every line from the 1-based `line` to the end of the file.
fn comment_out_from(patch: &mut PatchSet, text: &str, line: usize) {
    let first = line.saturating_sub(1);
    for start in line_starts(text).into_iter().skip(first) {
        patch.insert(start, MAIN_COMMENT, "main");
    }
}

//! Resolve phase - matches every handler method to a manager method and
//! plans its replacement body.

use bridgegen_ir::Method;
use eyre::{Result, WrapErr, bail};
use tracing::debug;

use super::inventory::{handler_class, manager_class};
use crate::{
    binding::Binder,
    call::{CallSite, size_mismatches},
    matching::{select_overload, split_name},
    pipeline::{CompilationContext, Diagnostic, Phase},
    plan::{MethodPlan, Resolution},
};

/// Phase that builds a [`MethodPlan`] for every public handler method with a
/// manager counterpart.
///
/// Unbridgeable methods are recorded as errors and the phase fails once all
/// methods have been tried, so one run reports every problem.
pub struct ResolvePhase;

impl Phase for ResolvePhase {
    fn name(&self) -> &'static str {
        "resolve"
    }

    fn description(&self) -> &'static str {
        "Match handler methods to manager overloads and bind arguments"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let mut diagnostics = Vec::new();
        let mut errors = Vec::new();
        let resolution = {
            let manifest = &ctx.manifest;
            let symbols = ctx.symbols()?;
            let skeleton = ctx.skeleton_file()?.id;
            let handler = handler_class(symbols, &manifest.handler.class, skeleton)?;
            let manager = manager_class(symbols, &manifest.manager.class)?;
            let pattern = manifest
                .matching
                .disambiguation_regex()
                .wrap_err("invalid disambiguation pattern")?;
            let binder = Binder::new(symbols, manifest);

            let mut resolution = Resolution::default();
            for method in handler.public_methods() {
                let location = format!("{}::{}", handler.name, method.name);
                let split = split_name(&pattern, &method.name);
                let candidates: Vec<&Method> = manager.public_methods_named(split.target).collect();

                let selection = match select_overload(&method.name, &split, &candidates) {
                    Ok(Some(selection)) => selection,
                    Ok(None) => {
                        diagnostics.push(
                            Diagnostic::info(
                                self.name(),
                                format!(
                                    "method '{}': {} has no method '{}', left unchanged",
                                    method.name, manager.qualified_name, split.target
                                ),
                            )
                            .at(&location),
                        );
                        resolution.skipped.push(method.name.clone());
                        continue;
                    }
                    Err(e) => {
                        errors.push((e, location));
                        continue;
                    }
                };
                let target = selection.method;
                if selection.is_ambiguous() {
                    diagnostics.push(
                        Diagnostic::warning(
                            self.name(),
                            format!(
                                "method '{}': hint '{}' matches {} overloads of '{}', using the last one ({})",
                                method.name,
                                split.hint.unwrap_or_default(),
                                selection.matches,
                                target.name,
                                describe(target)
                            ),
                        )
                        .at(&location),
                    );
                }

                let Some(body) = method.body else {
                    diagnostics.push(
                        Diagnostic::warning(
                            self.name(),
                            format!("method '{}' has no body to replace", method.name),
                        )
                        .at(&location),
                    );
                    resolution.skipped.push(method.name.clone());
                    continue;
                };

                let bindings = match binder.bind(method, target, &mut resolution.callbacks) {
                    Ok(bindings) => bindings,
                    Err(e) => {
                        errors.push((e, location));
                        continue;
                    }
                };
                for mismatch in size_mismatches(symbols, &bindings, manifest) {
                    diagnostics.push(
                        Diagnostic::warning(
                            self.name(),
                            format!(
                                "method '{}': argument '{}' size mismatch (src={} tgt={})",
                                method.name, mismatch.argument, mismatch.source, mismatch.target
                            ),
                        )
                        .at(&location),
                    );
                }

                let call = CallSite::new(
                    method,
                    target,
                    binder.return_aggregate(method),
                    &bindings,
                    manifest,
                );
                debug!(
                    handler = %method.name,
                    target = %describe(target),
                    "mapped {}",
                    call.call
                );
                resolution.plans.push(MethodPlan {
                    handler: method.name.clone(),
                    target: target.name.clone(),
                    hint: split.hint.map(String::from),
                    line: method.line,
                    body,
                    bindings,
                    call,
                });
            }
            resolution
        };

        ctx.diagnostics.extend(diagnostics);
        if !errors.is_empty() {
            let count = errors.len();
            let messages: Vec<String> = errors.iter().map(|(e, _)| e.to_string()).collect();
            for (error, location) in errors {
                ctx.add_diagnostic(Diagnostic::error(self.name(), error.to_string()).at(location));
            }
            bail!(
                "Resolution failed with {} error(s):\n  {}",
                count,
                messages.join("\n  ")
            );
        }

        debug!(
            plans = resolution.plans.len(),
            skipped = resolution.skipped.len(),
            callbacks = resolution.callbacks.len(),
            "resolution complete"
        );
        ctx.resolution = Some(resolution);
        Ok(())
    }
}

/// `Name(type, type, ...)` for logs and diagnostics.
fn describe(method: &Method) -> String {
    let params: Vec<&str> = method.params.iter().map(|p| p.ty.spelling.as_str()).collect();
    format!("{}({})", method.name, params.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        binding::ArgSource,
        call::ReturnClause,
        pipeline::phases::{InventoryPhase, ParsePhase},
        testing::Fixture,
    };

    fn resolved(fixture: &Fixture) -> Result<CompilationContext> {
        let mut ctx = CompilationContext::new(fixture.manifest(), fixture.sources());
        ParsePhase.run(&mut ctx)?;
        InventoryPhase::new().run(&mut ctx)?;
        ResolvePhase.run(&mut ctx)?;
        Ok(ctx)
    }

    #[test]
    fn test_fixture_plans() {
        let fixture = Fixture::openzwave();
        let ctx = resolved(&fixture).unwrap();
        let resolution = ctx.resolution().unwrap();

        assert_eq!(resolution.plans.len(), 18);
        assert_eq!(resolution.skipped, vec!["SendAllValues"]);
        assert_eq!(resolution.callbacks.len(), 1);

        let plan = resolution.plan("SetValue_UInt8").unwrap();
        assert_eq!(plan.target, "SetValue");
        assert_eq!(plan.hint.as_deref(), Some("UInt8"));
        assert_eq!(plan.bindings[1].target_type.spelling, "uint8 const");

        let plan = resolution.plan("GetValueAsBool").unwrap();
        assert_eq!(plan.call.clause, ReturnClause::Field("_return.retval".into()));
        assert_eq!(plan.bindings[1].source, ArgSource::ReturnField("o_value".into()));
    }

    #[test]
    fn test_callback_and_context_arguments() {
        let fixture = Fixture::openzwave();
        let ctx = resolved(&fixture).unwrap();
        let plan = ctx.resolution().unwrap().plan("BeginControllerCommand").unwrap();
        let sources: Vec<_> = plan.bindings.iter().map(|b| b.source.clone()).collect();
        assert_eq!(
            sources,
            vec![
                ArgSource::HandlerArg("_homeId".into()),
                ArgSource::HandlerArg("_command".into()),
                ArgSource::Callback("&BeginControllerCommand_callback".into()),
                ArgSource::Context("(void*) this".into()),
                ArgSource::HandlerArg("_highPower".into()),
                ArgSource::HandlerArg("_nodeId".into()),
            ]
        );
    }

    #[test]
    fn test_size_mismatch_warning() {
        let fixture = Fixture::openzwave();
        let ctx = resolved(&fixture).unwrap();
        let warnings: Vec<_> = ctx
            .warnings()
            .filter(|d| d.phase == "resolve")
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(
            warnings,
            vec!["method 'SetValue_Float': argument '_value' size mismatch (src=64 tgt=32)"]
        );
    }

    #[test]
    fn test_unmatched_method_is_skipped_with_info() {
        let fixture = Fixture::openzwave();
        let ctx = resolved(&fixture).unwrap();
        let info = ctx
            .diagnostics
            .iter()
            .find(|d| d.location.as_deref() == Some("RemoteManagerHandler::SendAllValues"))
            .unwrap();
        assert_eq!(info.severity, crate::pipeline::Severity::Info);
    }

    #[test]
    fn test_overload_without_hint_fails() {
        let fixture = Fixture::openzwave();
        let skeleton = fixture
            .skeleton()
            .replace("bool SetValue_Bool(", "bool SetValue(");
        fixture.write_skeleton(&skeleton);

        let mut ctx = CompilationContext::new(fixture.manifest(), fixture.sources());
        ParsePhase.run(&mut ctx).unwrap();
        InventoryPhase::new().run(&mut ctx).unwrap();
        let err = ResolvePhase.run(&mut ctx).unwrap_err();

        assert!(err.to_string().contains("'SetValue' is overloaded 5 times"));
        assert_eq!(ctx.error_count(), 1);
        assert_eq!(
            ctx.errors().next().unwrap().location.as_deref(),
            Some("RemoteManagerHandler::SetValue")
        );
        assert!(ctx.resolution.is_none());
    }

    #[test]
    fn test_unknown_hint_fails() {
        let fixture = Fixture::openzwave();
        let skeleton = fixture
            .skeleton()
            .replace("bool SetValue_Int32(", "bool SetValue_Decimal(");
        fixture.write_skeleton(&skeleton);
        let err = resolved(&fixture).unwrap_err();
        assert!(err.to_string().contains("hint 'Decimal'"));
    }
}

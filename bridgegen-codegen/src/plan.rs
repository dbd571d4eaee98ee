//! Resolved handler-to-manager mappings.

use bridgegen_ir::BodySpan;
use serde::Serialize;

use crate::{binding::Binding, call::CallSite, callbacks::CallbackRegistry};

/// Everything needed to rewrite one handler method body.
#[derive(Debug, Clone, Serialize)]
pub struct MethodPlan {
    pub handler: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// 1-based line of the handler method name.
    pub line: usize,
    pub body: BodySpan,
    pub bindings: Vec<Binding>,
    pub call: CallSite,
}

/// Output of the resolve phase.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    pub plans: Vec<MethodPlan>,
    /// Handler methods with no manager counterpart, left as generated.
    pub skipped: Vec<String>,
    pub callbacks: CallbackRegistry,
}

impl Resolution {
    pub fn plan(&self, handler: &str) -> Option<&MethodPlan> {
        self.plans.iter().find(|p| p.handler == handler)
    }
}

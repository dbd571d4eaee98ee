//! Callback stubs for manager arguments that take a function pointer.

use bridgegen_ir::FunctionSig;
use indexmap::IndexMap;
use serde::Serialize;

use crate::builder::{CodeBuilder, Indent};

/// Body placed in every generated stub.
pub const STUB_BODY: &str = "// FIXME: fill in the blanks (sorry!)";

/// An empty free function matching a manager callback signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallbackStub {
    pub name: String,
    pub return_type: String,
    /// Parameter types, named `arg1`, `arg2`, ... when rendered.
    pub params: Vec<String>,
}

impl CallbackStub {
    /// Stub for the callback argument of `method`, named `<method>_callback`.
    pub fn for_method(method: &str, sig: &FunctionSig) -> Self {
        Self {
            name: stub_name(method),
            return_type: sig.return_type.spelling.clone(),
            params: sig.params.iter().map(|p| p.spelling.clone()).collect(),
        }
    }

    /// The expression passed to the manager in place of the callback.
    pub fn address(&self) -> String {
        format!("&{}", self.name)
    }

    pub fn render(&self, indent: Indent) -> String {
        let params = self
            .params
            .iter()
            .enumerate()
            .map(|(i, ty)| format!("{} arg{}", ty, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        CodeBuilder::new(indent)
            .line(&format!("{} {}({}) {{", self.return_type, self.name, params))
            .indent()
            .line(STUB_BODY)
            .dedent()
            .line("}")
            .build()
    }
}

pub fn stub_name(method: &str) -> String {
    format!("{}_callback", method)
}

/// Callback stubs keyed by name, in the order they were first needed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct CallbackRegistry {
    stubs: IndexMap<String, CallbackStub>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the stub for `method` unless one exists already, returning
    /// the registered stub.
    pub fn register(&mut self, method: &str, sig: &FunctionSig) -> &CallbackStub {
        self.stubs
            .entry(stub_name(method))
            .or_insert_with(|| CallbackStub::for_method(method, sig))
    }

    pub fn get(&self, name: &str) -> Option<&CallbackStub> {
        self.stubs.get(name)
    }

    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CallbackStub> {
        self.stubs.values()
    }

    /// All stubs separated by blank lines, followed by one blank line so the
    /// block sits apart from the code it precedes.
    pub fn render_block(&self, indent: Indent) -> String {
        let mut builder = CodeBuilder::new(indent);
        for stub in self.iter() {
            builder.push_raw(&stub.render(indent)).push_blank();
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use bridgegen_ir::CppType;

    use super::*;

    fn sig() -> FunctionSig {
        let mut first = CppType::named("Driver::ControllerState");
        first.spelling = "Driver::ControllerState".into();
        let mut second = CppType::named("void");
        second.pointer_depth = 1;
        second.spelling = "void*".into();
        FunctionSig {
            return_type: CppType::void(),
            params: vec![first, second],
        }
    }

    #[test]
    fn test_render_stub() {
        let stub = CallbackStub::for_method("BeginControllerCommand", &sig());
        assert_eq!(
            stub.render(Indent::Tab),
            "void BeginControllerCommand_callback(Driver::ControllerState arg1, void* arg2) {\n\t// FIXME: fill in the blanks (sorry!)\n}\n"
        );
        assert_eq!(stub.address(), "&BeginControllerCommand_callback");
    }

    #[test]
    fn test_register_once_per_method() {
        let mut registry = CallbackRegistry::new();
        registry.register("BeginControllerCommand", &sig());
        registry.register("AddNode", &sig());
        registry.register("BeginControllerCommand", &sig());
        let names: Vec<_> = registry.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["BeginControllerCommand_callback", "AddNode_callback"]
        );
    }

    #[test]
    fn test_render_block() {
        let mut registry = CallbackRegistry::new();
        assert_eq!(registry.render_block(Indent::Tab), "");
        registry.register("A", &FunctionSig {
            return_type: CppType::void(),
            params: Vec::new(),
        });
        registry.register("B", &FunctionSig {
            return_type: CppType::named("bool"),
            params: vec![CppType::named("int")],
        });
        assert_eq!(
            registry.render_block(Indent::Tab),
            "void A_callback() {\n\t// FIXME: fill in the blanks (sorry!)\n}\n\nbool B_callback(int arg1) {\n\t// FIXME: fill in the blanks (sorry!)\n}\n\n"
        );
    }
}

//! Correspondence between manager arguments and handler-side values.

use bridgegen_ir::{Class, CppType, Method, SymbolTable};
use bridgegen_manifest::Manifest;
use serde::Serialize;

use crate::{callbacks::CallbackRegistry, error::ResolveError};

/// Where the value for one manager argument comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ArgSource {
    /// Handler argument of the same name.
    HandlerArg(String),
    /// Field of the handler's return aggregate, e.g. `_return.o_value`.
    ReturnField(String),
    /// Address of a generated callback stub.
    Callback(String),
    /// The callback context expression.
    Context(String),
}

impl ArgSource {
    /// Whether the source is a node of the handler signature, as opposed to
    /// synthesized text.
    pub fn is_handler_node(&self) -> bool {
        matches!(self, ArgSource::HandlerArg(_) | ArgSource::ReturnField(_))
    }
}

/// One bound manager argument.
#[derive(Debug, Clone, Serialize)]
pub struct Binding {
    /// Manager parameter name.
    pub argument: String,
    /// Manager parameter type.
    pub target_type: CppType,
    pub source: ArgSource,
    /// Type of the handler argument or return field, for handler nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<CppType>,
}

/// Binds manager arguments for handler methods of one skeleton.
pub struct Binder<'a> {
    symbols: &'a SymbolTable,
    manifest: &'a Manifest,
}

impl<'a> Binder<'a> {
    pub fn new(symbols: &'a SymbolTable, manifest: &'a Manifest) -> Self {
        Self { symbols, manifest }
    }

    /// The class behind the handler's return argument (`_return`), if the
    /// handler has one and its type is defined in the parsed sources.
    pub fn return_aggregate(&self, handler: &Method) -> Option<&'a Class> {
        let param = handler.param(&self.manifest.handler.return_argument)?;
        self.symbols.class_of(&param.ty)
    }

    /// Bind every argument of `target` in order.
    ///
    /// Callback arguments register their stub in `callbacks`.
    pub fn bind(
        &self,
        handler: &Method,
        target: &Method,
        callbacks: &mut CallbackRegistry,
    ) -> Result<Vec<Binding>, ResolveError> {
        let aggregate = self.return_aggregate(handler);
        let matching = &self.manifest.matching;

        let mut bindings = Vec::with_capacity(target.params.len());
        for (index, param) in target.params.iter().enumerate() {
            let Some(name) = param.name.as_deref() else {
                return Err(ResolveError::UnboundArgument {
                    method: handler.name.clone(),
                    target: target.name.clone(),
                    argument: format!("#{}", index + 1),
                });
            };

            let (source, source_type) = if let Some(arg) = handler.param(name) {
                (ArgSource::HandlerArg(name.to_string()), Some(arg.ty.clone()))
            } else if let Some(field) = aggregate.and_then(|c| c.field(name)) {
                (ArgSource::ReturnField(name.to_string()), Some(field.ty.clone()))
            } else if name.contains(&matching.callback_marker) {
                let resolved = self.symbols.resolve(&param.ty);
                let Some(sig) = param.ty.function.as_deref().or(resolved.function.as_deref())
                else {
                    return Err(ResolveError::CallbackNotFunctionPointer {
                        method: handler.name.clone(),
                        target: target.name.clone(),
                        argument: name.to_string(),
                        ty: param.ty.spelling.clone(),
                    });
                };
                let stub = callbacks.register(&target.name, sig);
                (ArgSource::Callback(stub.address()), None)
            } else if name.contains(&matching.context_marker) {
                (ArgSource::Context(matching.context_expression.clone()), None)
            } else {
                return Err(ResolveError::UnboundArgument {
                    method: handler.name.clone(),
                    target: target.name.clone(),
                    argument: name.to_string(),
                });
            };

            bindings.push(Binding {
                argument: name.to_string(),
                target_type: param.ty.clone(),
                source,
                source_type,
            });
        }
        Ok(bindings)
    }
}

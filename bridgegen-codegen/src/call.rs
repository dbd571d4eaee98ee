//! Call and return-value synthesis for one bridged method.

use bridgegen_ir::{Class, Method, SymbolTable};
use bridgegen_manifest::Manifest;
use serde::Serialize;

use crate::binding::{ArgSource, Binding};

/// How the manager's return value reaches the handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum ReturnClause {
    /// The result is discarded or captured by the handler's own return.
    None,
    /// Stored in the aggregate's result field, e.g. `_return.retval`.
    Field(String),
    /// Assigned to the whole return argument, e.g. `_return`.
    Aggregate(String),
}

impl ReturnClause {
    pub fn for_method(
        handler: &Method,
        target: &Method,
        aggregate: Option<&Class>,
        manifest: &Manifest,
    ) -> Self {
        let config = &manifest.handler;
        if handler.param(&config.return_argument).is_none() {
            return Self::None;
        }
        if aggregate.is_some_and(|c| c.field(&config.retval_field).is_some()) {
            Self::Field(format!("{}.{}", config.return_argument, config.retval_field))
        } else if !target.returns_void() {
            Self::Aggregate(config.return_argument.clone())
        } else {
            Self::None
        }
    }

    /// Text placed before the call, e.g. `_return.retval = `.
    pub fn prefix(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Field(lhs) | Self::Aggregate(lhs) => format!("{} = ", lhs),
        }
    }
}

/// Render the expression passed for one manager argument.
pub fn argument_expression(binding: &Binding, manifest: &Manifest) -> String {
    let source = match &binding.source {
        ArgSource::Callback(expr) | ArgSource::Context(expr) => return expr.clone(),
        ArgSource::HandlerArg(name) => name.clone(),
        ArgSource::ReturnField(field) => {
            format!("{}.{}", manifest.handler.return_argument, field)
        }
    };

    let conversion = binding
        .source_type
        .as_ref()
        .and_then(|ty| manifest.matching.conversion_for(ty.base_path()));
    if let Some(method) = conversion {
        return format!("{}.{}", source, method);
    }

    let address = if binding.target_type.is_pointer() { "&" } else { "" };
    format!("({}) {}{}", binding.target_type.spelling, address, source)
}

/// The synthesized manager call for one handler method.
#[derive(Debug, Clone, Serialize)]
pub struct CallSite {
    pub clause: ReturnClause,
    /// `mgr->Name(args)`.
    pub call: String,
    /// Handler return type, when the handler returns a value itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_type: Option<String>,
}

impl CallSite {
    pub fn new(
        handler: &Method,
        target: &Method,
        aggregate: Option<&Class>,
        bindings: &[Binding],
        manifest: &Manifest,
    ) -> Self {
        let args = bindings
            .iter()
            .map(|b| argument_expression(b, manifest))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            clause: ReturnClause::for_method(handler, target, aggregate, manifest),
            call: format!("{}->{}({})", manifest.manager.variable, target.name, args),
            result_type: handler
                .return_type
                .as_ref()
                .filter(|ty| !ty.is_void())
                .map(|ty| ty.spelling.clone()),
        }
    }

    /// The statement performing the call.
    pub fn statement(&self, manifest: &Manifest) -> String {
        let call = format!("{}{}", self.clause.prefix(), self.call);
        match &self.result_type {
            Some(ty) => format!("{} {} = {};", ty, manifest.emit.result_variable, call),
            None => format!("{};", call),
        }
    }

    /// Statements of the replacement body, without indentation.
    pub fn body_lines(&self, manifest: &Manifest) -> Vec<String> {
        let manager = &manifest.manager;
        let lock = &manifest.emit.lock;
        let short = manager.short_name();

        let mut lines = vec![
            format!(
                "{}* {} = {}::{}();",
                short, manager.variable, short, manager.singleton_accessor
            ),
            format!("{}.lock();", lock),
            self.statement(manifest),
            format!("{}.unlock();", lock),
        ];
        if self.result_type.is_some() {
            lines.push(format!("return({});", manifest.emit.result_variable));
        }
        lines
    }
}

/// A handler value whose element size differs from the manager parameter it
/// is passed as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeMismatch {
    pub argument: String,
    pub source: u32,
    pub target: u32,
}

/// Compare element sizes of every handler-bound argument.
///
/// Arguments passed through a value-object conversion are not compared, nor
/// are arguments where either size is unknown.
pub fn size_mismatches(
    symbols: &SymbolTable,
    bindings: &[Binding],
    manifest: &Manifest,
) -> Vec<SizeMismatch> {
    bindings
        .iter()
        .filter(|b| b.source.is_handler_node())
        .filter_map(|b| {
            let source_type = b.source_type.as_ref()?;
            if manifest
                .matching
                .conversion_for(source_type.base_path())
                .is_some()
            {
                return None;
            }
            let source = symbols.element_size(source_type)?;
            let target = symbols.element_size(&b.target_type)?;
            (source != target).then(|| SizeMismatch {
                argument: b.argument.clone(),
                source,
                target,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use bridgegen_cpp::{FrontendOptions, parse_sources};
    use bridgegen_ir::CppType;

    use super::*;
    use crate::{binding::Binder, callbacks::CallbackRegistry};

    const SOURCE: &str = r#"
typedef long long int64_t;
typedef int int32_t;
typedef signed char int8_t;
typedef unsigned char uint8;
typedef unsigned int uint32;
typedef int64_t RemoteValueID;

class Bool_Bool {
 public:
  bool retval;
  bool o_value;
};

namespace OpenZWave {
class ValueID {};
class Manager {
 public:
  void WriteConfig(uint32 const _homeId);
  bool GetValueAsBool(ValueID const& _id, bool* o_value);
  uint8 GetNodeVersion(uint32 const _homeId, uint8 const _nodeId);
  bool IsNodeAwake(uint32 const _homeId, uint8 const _nodeId);
};
}

class Handler {
 public:
  void WriteConfig(const int32_t _homeId) {}
  void GetValueAsBool(Bool_Bool& _return, const RemoteValueID _id) {}
  int8_t GetNodeVersion(const int32_t _homeId, const int8_t _nodeId) {}
  bool IsNodeAwake(const int32_t _homeId, const int8_t _nodeId) {}
};
"#;

    fn site(name: &str) -> (CallSite, Vec<SizeMismatch>) {
        let symbols = parse_sources(
            &[(PathBuf::from("call.cpp"), SOURCE.to_string())],
            &FrontendOptions::new(),
        )
        .unwrap()
        .symbols;
        let manifest = Manifest::default();
        let handler = symbols.class("Handler").unwrap();
        let manager = symbols.class("Manager").unwrap();
        let h = handler.public_methods_named(name).next().unwrap();
        let m = manager.public_methods_named(name).next().unwrap();
        let binder = Binder::new(&symbols, &manifest);
        let bindings = binder.bind(h, m, &mut CallbackRegistry::new()).unwrap();
        let aggregate = binder.return_aggregate(h);
        (
            CallSite::new(h, m, aggregate, &bindings, &manifest),
            size_mismatches(&symbols, &bindings, &manifest),
        )
    }

    #[test]
    fn test_scalar_void_call() {
        let (site, mismatches) = site("WriteConfig");
        let manifest = Manifest::default();
        assert_eq!(site.clause, ReturnClause::None);
        assert_eq!(
            site.body_lines(&manifest),
            vec![
                "Manager* mgr = Manager::Get();",
                "g_criticalSection.lock();",
                "mgr->WriteConfig((uint32 const) _homeId);",
                "g_criticalSection.unlock();",
            ]
        );
        assert!(mismatches.is_empty());
    }

    #[test]
    fn test_retval_field_and_conversion() {
        let (site, _) = site("GetValueAsBool");
        assert_eq!(site.clause, ReturnClause::Field("_return.retval".into()));
        assert_eq!(
            site.statement(&Manifest::default()),
            "_return.retval = mgr->GetValueAsBool(_id.toValueID(), (bool*) &_return.o_value);"
        );
    }

    #[test]
    fn test_non_void_handler_captures_result() {
        let (site, mismatches) = site("GetNodeVersion");
        let lines = site.body_lines(&Manifest::default());
        assert_eq!(
            lines[2],
            "int8_t function_result = mgr->GetNodeVersion((uint32 const) _homeId, (uint8 const) _nodeId);"
        );
        assert_eq!(lines[4], "return(function_result);");
        assert!(mismatches.is_empty());
    }

    #[test]
    fn test_size_mismatch_is_reported() {
        let (_, mismatches) = site("IsNodeAwake");
        assert!(mismatches.is_empty());

        let symbols = SymbolTable::new();
        let bindings = vec![Binding {
            argument: "_homeId".into(),
            target_type: CppType::named("short"),
            source: ArgSource::HandlerArg("_homeId".into()),
            source_type: Some(CppType::named("int")),
        }];
        assert_eq!(
            size_mismatches(&symbols, &bindings, &Manifest::default()),
            vec![SizeMismatch {
                argument: "_homeId".into(),
                source: 32,
                target: 16,
            }]
        );
    }

    #[test]
    fn test_aggregate_clause_without_retval() {
        let manifest = Manifest::default();
        let mut handler = dummy("GetNodeType");
        handler.params.push(bridgegen_ir::Param {
            name: Some("_return".into()),
            ty: CppType::named("std::string"),
            has_default: false,
        });
        let mut target = dummy("GetNodeType");
        target.return_type = Some(CppType::named("std::string"));
        assert_eq!(
            ReturnClause::for_method(&handler, &target, None, &manifest),
            ReturnClause::Aggregate("_return".into())
        );
        target.return_type = Some(CppType::void());
        assert_eq!(
            ReturnClause::for_method(&handler, &target, None, &manifest),
            ReturnClause::None
        );
    }

    fn dummy(name: &str) -> Method {
        Method {
            name: name.into(),
            kind: bridgegen_ir::MethodKind::Regular,
            return_type: Some(CppType::void()),
            params: Vec::new(),
            access: bridgegen_ir::Access::Public,
            is_static: false,
            is_virtual: false,
            is_const: false,
            line: 1,
            name_span: bridgegen_ir::Span::new(bridgegen_ir::FileId(0), 0, 0),
            body: None,
        }
    }
}

//! Declarations collected from the parsed translation units.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{BodySpan, CppType, FileId, SourceFile, Span};

/// Member access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Struct,
    Union,
}

impl ClassKind {
    /// Access applied to members before the first access specifier.
    pub fn default_access(&self) -> Access {
        match self {
            ClassKind::Class => Access::Private,
            ClassKind::Struct | ClassKind::Union => Access::Public,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Regular,
    Constructor,
    Destructor,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: Option<String>,
    pub ty: CppType,
    pub has_default: bool,
}

/// A member function.
#[derive(Debug, Clone, Serialize)]
pub struct Method {
    pub name: String,
    pub kind: MethodKind,
    /// `None` for constructors and destructors.
    pub return_type: Option<CppType>,
    pub params: Vec<Param>,
    pub access: Access,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_const: bool,
    /// 1-based line of the method name.
    pub line: usize,
    pub name_span: Span,
    /// Present when the method is defined inline.
    pub body: Option<BodySpan>,
}

impl Method {
    pub fn is_public(&self) -> bool {
        self.access == Access::Public
    }

    pub fn is_regular(&self) -> bool {
        self.kind == MethodKind::Regular
    }

    /// Whether the method returns nothing (constructors count as void).
    pub fn returns_void(&self) -> bool {
        self.return_type.as_ref().is_none_or(CppType::is_void)
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name.as_deref() == Some(name))
    }
}

/// A data member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub ty: CppType,
    pub access: Access,
    pub is_static: bool,
}

/// A class, struct or union definition.
#[derive(Debug, Clone, Serialize)]
pub struct Class {
    pub name: String,
    pub qualified_name: String,
    pub kind: ClassKind,
    /// The `class` keyword through the closing `}`.
    pub span: Span,
    /// 1-based line of the class keyword.
    pub head_line: usize,
    pub bases: Vec<String>,
    pub methods: Vec<Method>,
    pub fields: Vec<Field>,
    /// 1-based line of the first declared member, if any.
    pub first_member_line: Option<usize>,
}

impl Class {
    /// Public regular methods in declaration order.
    pub fn public_methods(&self) -> impl Iterator<Item = &Method> {
        self.methods
            .iter()
            .filter(|m| m.is_public() && m.is_regular())
    }

    /// Public regular methods with the given name (an overload set).
    pub fn public_methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Method> {
        self.public_methods().filter(move |m| m.name == name)
    }

    /// Non-static data member by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name && !f.is_static)
    }
}

/// A `typedef` or alias declaration.
#[derive(Debug, Clone, Serialize)]
pub struct Typedef {
    pub name: String,
    pub qualified_name: String,
    pub target: CppType,
}

/// A namespace-scope function.
#[derive(Debug, Clone, Serialize)]
pub struct FreeFunction {
    pub name: String,
    pub qualified_name: String,
    pub return_type: CppType,
    /// 1-based line of the function name.
    pub line: usize,
    pub name_span: Span,
    pub body: Option<BodySpan>,
}

/// Everything the front end learned from one batch of translation units.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolTable {
    pub files: Vec<SourceFile>,
    pub classes: Vec<Class>,
    pub typedefs: IndexMap<String, Typedef>,
    pub functions: Vec<FreeFunction>,
}

const MAX_TYPEDEF_DEPTH: usize = 16;

/// Sizes in bits of the builtin and fixed-width integer types.
const BUILTIN_SIZES: &[(&str, u32)] = &[
    ("bool", 8),
    ("char", 8),
    ("signed char", 8),
    ("unsigned char", 8),
    ("int8_t", 8),
    ("uint8_t", 8),
    ("short", 16),
    ("short int", 16),
    ("unsigned short", 16),
    ("unsigned short int", 16),
    ("int16_t", 16),
    ("uint16_t", 16),
    ("int", 32),
    ("signed", 32),
    ("unsigned", 32),
    ("signed int", 32),
    ("unsigned int", 32),
    ("int32_t", 32),
    ("uint32_t", 32),
    ("float", 32),
    ("long", 64),
    ("unsigned long", 64),
    ("long long", 64),
    ("unsigned long long", 64),
    ("int64_t", 64),
    ("uint64_t", 64),
    ("double", 64),
    ("size_t", 64),
];

const ELEMENT_CONTAINERS: &[&str] = &["vector", "list", "set", "deque", "array"];

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Find a class by qualified name, falling back to a `::` suffix match.
    ///
    /// `Manager` matches `OpenZWave::Manager` when no exact match exists.
    pub fn class(&self, name: &str) -> Option<&Class> {
        let name = name.trim_start_matches("::");
        self.classes
            .iter()
            .find(|c| c.qualified_name == name)
            .or_else(|| {
                let suffix = format!("::{}", name);
                self.classes
                    .iter()
                    .find(|c| c.qualified_name.ends_with(&suffix))
            })
    }

    /// Find a typedef by qualified name, falling back to a suffix match and
    /// then to the last path segment.
    pub fn typedef(&self, name: &str) -> Option<&Typedef> {
        let name = name.trim_start_matches("::");
        if let Some(td) = self.typedefs.get(name) {
            return Some(td);
        }
        let suffix = format!("::{}", name);
        if let Some(td) = self
            .typedefs
            .values()
            .find(|t| t.qualified_name.ends_with(&suffix))
        {
            return Some(td);
        }
        let last = name.rsplit("::").next().unwrap_or(name);
        self.typedefs.values().find(|t| t.name == last)
    }

    /// The first namespace-scope function with the given name.
    pub fn function(&self, name: &str) -> Option<&FreeFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Follow typedefs until a non-typedef type is reached.
    ///
    /// Qualifiers of the outer type are kept: resolving `uint8 const*` where
    /// `typedef unsigned char uint8;` yields a type with base `unsigned char`
    /// and pointer depth 1.
    pub fn resolve(&self, ty: &CppType) -> CppType {
        let mut current = ty.clone();
        for _ in 0..MAX_TYPEDEF_DEPTH {
            let Some(td) = self.typedef(&current.base) else {
                break;
            };
            if td.name == current.base && td.target.base == current.base {
                break;
            }
            let mut next = td.target.clone();
            next.pointer_depth += current.pointer_depth;
            next.is_const |= current.is_const;
            next.is_reference |= current.is_reference;
            current = next;
        }
        current
    }

    /// Resolve a type through typedefs to a class definition.
    pub fn class_of(&self, ty: &CppType) -> Option<&Class> {
        let resolved = self.resolve(ty);
        self.class(&resolved.base)
    }

    /// Size in bits of the element a type designates.
    ///
    /// Pointers, references and cv-qualifiers are looked through, as are
    /// standard containers (`std::vector<int8_t>` has element size 8).
    /// Returns `None` for class types and anything else of unknown size.
    pub fn element_size(&self, ty: &CppType) -> Option<u32> {
        let mut current = self.resolve(ty);
        for _ in 0..MAX_TYPEDEF_DEPTH {
            if ELEMENT_CONTAINERS.contains(&current.base_ident())
                && let Some(inner) = current.template_args.first()
            {
                current = self.resolve(inner);
                continue;
            }
            break;
        }
        if current.function.is_some() {
            return None;
        }
        let base = current.base.trim_start_matches("std::");
        BUILTIN_SIZES
            .iter()
            .find(|(name, _)| *name == base)
            .map(|(_, size)| *size)
    }
}

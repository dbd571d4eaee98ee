//! C++ type representation.

use serde::Serialize;

/// A C++ type as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CppType {
    /// Rendered spelling, e.g. `uint8 const*` or `std::vector<std::string>*`.
    pub spelling: String,
    /// The named type with cv-qualifiers, pointers and references removed,
    /// e.g. `uint8` or `std::vector<std::string>`.
    pub base: String,
    pub is_const: bool,
    pub pointer_depth: u8,
    pub is_reference: bool,
    /// Template arguments of `base`, if it is a template specialization.
    pub template_args: Vec<CppType>,
    /// Signature of the pointed-to function for function pointer types.
    pub function: Option<Box<FunctionSig>>,
}

/// Return and parameter types of a function pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSig {
    pub return_type: CppType,
    pub params: Vec<CppType>,
}

impl CppType {
    /// A plain named type without qualifiers.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            spelling: name.clone(),
            base: name,
            is_const: false,
            pointer_depth: 0,
            is_reference: false,
            template_args: Vec::new(),
            function: None,
        }
    }

    /// The `void` type.
    pub fn void() -> Self {
        Self::named("void")
    }

    pub fn is_void(&self) -> bool {
        self.base == "void" && self.pointer_depth == 0 && self.function.is_none()
    }

    /// Whether the rendered type is a pointer of any kind.
    pub fn is_pointer(&self) -> bool {
        self.pointer_depth > 0 || self.spelling.contains('*')
    }

    pub fn is_function_pointer(&self) -> bool {
        self.function.is_some()
    }

    /// Last path segment of the base name without template arguments,
    /// e.g. `vector` for `std::vector<int>`.
    pub fn base_ident(&self) -> &str {
        let without_args = self.base.split('<').next().unwrap_or(&self.base);
        without_args.rsplit("::").next().unwrap_or(without_args).trim()
    }

    /// The base name without template arguments, e.g. `std::vector`.
    pub fn base_path(&self) -> &str {
        self.base.split('<').next().unwrap_or(&self.base).trim()
    }
}

impl std::fmt::Display for CppType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.spelling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void() {
        assert!(CppType::void().is_void());
        let mut ptr = CppType::void();
        ptr.pointer_depth = 1;
        ptr.spelling = "void*".into();
        assert!(!ptr.is_void());
        assert!(ptr.is_pointer());
    }

    #[test]
    fn test_base_ident() {
        let mut ty = CppType::named("std::vector<std::string>");
        ty.template_args.push(CppType::named("std::string"));
        assert_eq!(ty.base_ident(), "vector");
        assert_eq!(ty.base_path(), "std::vector");
        assert_eq!(CppType::named("uint8").base_ident(), "uint8");
    }

    #[test]
    fn test_display_uses_spelling() {
        let mut ty = CppType::named("ValueID");
        ty.spelling = "ValueID const&".into();
        ty.is_const = true;
        ty.is_reference = true;
        assert_eq!(ty.to_string(), "ValueID const&");
    }
}

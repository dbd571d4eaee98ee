//! Type spelling and structure from declaration tokens.

use bridgegen_ir::{CppType, FunctionSig};

use crate::lexer::Token;

/// Keywords that elaborate a type name without being part of it.
const ELABORATED: &[&str] = &["struct", "class", "union", "enum", "typename"];

/// Builtin type keywords; these can never be a parameter name.
pub(crate) const BUILTIN_TYPES: &[&str] = &[
    "void", "bool", "char", "wchar_t", "char16_t", "char32_t", "short", "int", "long", "float",
    "double", "signed", "unsigned", "auto",
];

/// Words that qualify a type but do not name one.
pub(crate) const QUALIFIERS: &[&str] = &[
    "const", "volatile", "struct", "class", "union", "enum", "typename",
];

/// Render tokens as C++ source the way a type is conventionally written:
/// `std::vector<std::string>*`, `ValueID const&`, `unsigned char`.
pub fn render(tokens: &[&Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for tok in tokens {
        if let Some(p) = prev {
            let space = p.is_punct(",")
                || (tok.is_word()
                    && (p.is_word()
                        || p.is_punct("*")
                        || p.is_punct("&")
                        || p.is_punct("&&")
                        || p.is_punct(">")));
            if space {
                out.push(' ');
            }
        }
        out.push_str(&tok.text);
        prev = Some(tok);
    }
    out
}

/// Build a [`CppType`] from the tokens of a type (no declarator name).
pub fn parse_type(tokens: &[&Token]) -> CppType {
    let mut depth = 0usize;
    let mut is_const = false;
    let mut pointer_depth = 0u8;
    let mut is_reference = false;
    let mut base: Vec<&Token> = Vec::new();

    for tok in tokens {
        if tok.is_punct("<") {
            depth += 1;
        } else if tok.is_punct(">") {
            depth = depth.saturating_sub(1);
        } else if depth == 0 {
            if tok.is_ident("const") || tok.is_ident("volatile") {
                is_const |= tok.text == "const";
                continue;
            }
            if tok.is_punct("*") {
                pointer_depth = pointer_depth.saturating_add(1);
                continue;
            }
            if tok.is_punct("&") || tok.is_punct("&&") {
                is_reference = true;
                continue;
            }
            if ELABORATED.iter().any(|k| tok.is_ident(k)) {
                continue;
            }
        }
        base.push(tok);
    }

    CppType {
        spelling: render(tokens),
        base: render(&base),
        is_const,
        pointer_depth,
        is_reference,
        template_args: template_args(&base),
        function: None,
    }
}

/// A pointer to a function with the given return and parameter types.
pub fn function_pointer(return_type: CppType, params: Vec<CppType>) -> CppType {
    let rendered_params = params
        .iter()
        .map(|p| p.spelling.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let spelling = format!("{} (*)({})", return_type.spelling, rendered_params);
    CppType {
        spelling: spelling.clone(),
        base: spelling,
        is_const: false,
        pointer_depth: 1,
        is_reference: false,
        template_args: Vec::new(),
        function: Some(Box::new(FunctionSig {
            return_type,
            params,
        })),
    }
}

/// Arguments of the first template argument list in `base`.
fn template_args(base: &[&Token]) -> Vec<CppType> {
    let Some(open) = base.iter().position(|t| t.is_punct("<")) else {
        return Vec::new();
    };
    let mut depth = 0usize;
    let mut close = None;
    for (i, tok) in base.iter().enumerate().skip(open) {
        if tok.is_punct("<") {
            depth += 1;
        } else if tok.is_punct(">") {
            depth -= 1;
            if depth == 0 {
                close = Some(i);
                break;
            }
        }
    }
    let Some(close) = close else {
        return Vec::new();
    };
    split_top_level(&base[open + 1..close], ",")
        .into_iter()
        .filter(|arg| !arg.is_empty())
        .map(|arg| parse_type(&arg))
        .collect()
}

/// Split tokens on a separator that is not nested in `()`, `[]`, `{}` or `<>`.
pub fn split_top_level<'t>(tokens: &[&'t Token], sep: &str) -> Vec<Vec<&'t Token>> {
    let mut parts = vec![Vec::new()];
    let mut depth = 0isize;
    for &tok in tokens {
        if depth == 0 && tok.is_punct(sep) {
            parts.push(Vec::new());
            continue;
        }
        if ["(", "[", "{", "<"].iter().any(|p| tok.is_punct(p)) {
            depth += 1;
        } else if [")", "]", "}", ">"].iter().any(|p| tok.is_punct(p)) {
            depth -= 1;
        }
        if let Some(last) = parts.last_mut() {
            last.push(tok);
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use bridgegen_ir::FileId;

    use super::*;
    use crate::{error::SourceContext, lexer::lex};

    fn ty(src: &str) -> CppType {
        let tokens = lex(FileId(0), &SourceContext::new(src, "t.h")).unwrap();
        let refs: Vec<&Token> = tokens.iter().collect();
        parse_type(&refs)
    }

    #[test]
    fn test_render_spacing() {
        assert_eq!(ty("uint8 const *").spelling, "uint8 const*");
        assert_eq!(ty("ValueID const &").spelling, "ValueID const&");
        assert_eq!(
            ty("std :: vector < std :: string > *").spelling,
            "std::vector<std::string>*"
        );
        assert_eq!(ty("unsigned char").spelling, "unsigned char");
        assert_eq!(ty("std::map<int, char>").spelling, "std::map<int, char>");
    }

    #[test]
    fn test_qualifiers() {
        let t = ty("const int32_t");
        assert!(t.is_const);
        assert_eq!(t.base, "int32_t");
        assert_eq!(t.pointer_depth, 0);

        let t = ty("uint8**");
        assert_eq!(t.pointer_depth, 2);
        assert_eq!(t.base, "uint8");

        let t = ty("const RemoteValueID&");
        assert!(t.is_reference);
        assert_eq!(t.base, "RemoteValueID");
    }

    #[test]
    fn test_template_args() {
        let t = ty("std::vector<std::string>* ");
        assert_eq!(t.base, "std::vector<std::string>");
        assert_eq!(t.template_args.len(), 1);
        assert_eq!(t.template_args[0].base, "std::string");

        let t = ty("std::map<int32_t, std::vector<int8_t> >");
        assert_eq!(t.template_args.len(), 2);
        assert_eq!(t.template_args[1].template_args[0].base, "int8_t");
    }

    #[test]
    fn test_split_top_level_ignores_nested_separators() {
        let tokens = lex(
            FileId(0),
            &SourceContext::new("int a, std::map<int, char> b, void (*f)(int, int)", "t.h"),
        )
        .unwrap();
        let refs: Vec<&Token> = tokens.iter().collect();
        let parts: Vec<String> = split_top_level(&refs, ",")
            .iter()
            .map(|part| part.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" "))
            .collect();
        assert_eq!(
            parts,
            vec![
                "int a",
                "std :: map < int , char > b",
                "void ( * f ) ( int , int )",
            ]
        );
    }

    #[test]
    fn test_elaborated_keyword_dropped_from_base() {
        let t = ty("struct tm*");
        assert_eq!(t.base, "tm");
        assert_eq!(t.spelling, "struct tm*");
    }

    #[test]
    fn test_function_pointer() {
        let fp = function_pointer(
            CppType::void(),
            vec![ty("Notification const*"), ty("void*")],
        );
        assert_eq!(fp.spelling, "void (*)(Notification const*, void*)");
        assert!(fp.is_function_pointer());
        assert!(fp.is_pointer());
    }
}

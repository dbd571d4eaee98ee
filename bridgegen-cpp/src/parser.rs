//! Declaration-level C++ parser.
//!
//! Understands enough of C++ to build the symbol table: namespaces, class
//! definitions with access sections, member functions and data members,
//! typedefs and namespace-scope functions. Function bodies, templates,
//! enums, operators and anything else are skipped by balancing delimiters.

use bridgegen_ir::{
    Access, BodySpan, Class, ClassKind, CppType, Field, FreeFunction, Method, MethodKind, Param,
    SourceFile, Span, Typedef,
};
use indexmap::IndexMap;

use crate::{
    error::{Error, Result, SourceContext},
    lexer::{Token, TokenKind},
    types::{BUILTIN_TYPES, QUALIFIERS, function_pointer, parse_type, render, split_top_level},
};

/// Declarations found in a token stream.
#[derive(Debug, Default)]
pub struct Parsed {
    pub classes: Vec<Class>,
    pub typedefs: IndexMap<String, Typedef>,
    pub functions: Vec<FreeFunction>,
}

/// Parse a preprocessed token stream.
pub fn parse(tokens: &[Token], files: &[SourceFile]) -> Result<Parsed> {
    let mut parser = Parser {
        tokens,
        files,
        pos: 0,
        scope: Vec::new(),
        out: Parsed::default(),
    };
    parser.parse_scope(None)?;
    Ok(parser.out)
}

const SPECIFIERS: &[&str] = &[
    "virtual", "static", "inline", "explicit", "friend", "extern", "constexpr", "register",
    "mutable",
];

const ATTRIBUTE_WORDS: &[&str] = &["__attribute__", "__declspec", "alignas", "__asm__", "asm"];

/// Identifiers that can precede `(` without naming a function.
const NOT_DECLARATORS: &[&str] = &[
    "decltype", "sizeof", "alignof", "throw", "noexcept", "typeof", "__typeof__",
];

/// The class a member declaration belongs to.
#[derive(Clone, Copy)]
struct Member<'s> {
    class: &'s str,
    access: Access,
}

enum Decl {
    None,
    Method(Method),
    Fields(Vec<Field>),
}

struct Parser<'a> {
    tokens: &'a [Token],
    files: &'a [SourceFile],
    pos: usize,
    scope: Vec<String>,
    out: Parsed,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, ahead: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + ahead)
    }

    fn qualified(&self, name: &str) -> String {
        self.scope
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("::")
    }

    fn context_for(&self, tok: &Token) -> SourceContext {
        match self.files.iter().find(|f| f.id == tok.span.file) {
            Some(file) => SourceContext::new(file.text.clone(), file.path.display().to_string()),
            None => SourceContext::new(String::new(), "<unknown>"),
        }
    }

    fn unbalanced(&self, open: usize) -> Box<Error> {
        let tok = &self.tokens[open];
        self.context_for(tok)
            .unbalanced(tok.text.clone(), tok.span.range())
    }

    /// Index of the token closing the delimiter at `open`.
    fn matching(&self, open: usize) -> Result<usize> {
        let (o, c) = match self.tokens[open].text.as_str() {
            "(" => ("(", ")"),
            "[" => ("[", "]"),
            "<" => ("<", ">"),
            _ => ("{", "}"),
        };
        let mut depth = 0usize;
        for (i, tok) in self.tokens.iter().enumerate().skip(open) {
            if tok.is_punct(o) {
                depth += 1;
            } else if tok.is_punct(c) {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
        }
        Err(self.unbalanced(open))
    }

    /// Index of the `;`, body `{` or stray `}` ending the declaration that
    /// starts at `start`, or the stream length.
    fn declaration_end(&self, start: usize) -> Result<usize> {
        let mut i = start;
        let mut seen_params = false;
        let mut init_list = false;
        while i < self.tokens.len() {
            let tok = &self.tokens[i];
            if tok.is_punct("(") || tok.is_punct("[") {
                seen_params |= tok.is_punct("(");
                i = self.matching(i)? + 1;
                continue;
            }
            if tok.is_punct(";") || tok.is_punct("}") {
                return Ok(i);
            }
            if tok.is_punct(":") && seen_params {
                init_list = true;
            }
            if tok.is_punct("{") {
                let prev = (i > start).then(|| &self.tokens[i - 1]);
                let brace_init = prev.is_some_and(|p| {
                    p.is_punct("=")
                        || (init_list && (p.kind == TokenKind::Ident || p.is_punct(">")))
                });
                if !brace_init {
                    return Ok(i);
                }
                i = self.matching(i)? + 1;
                continue;
            }
            i += 1;
        }
        Ok(i)
    }

    /// Skip one declaration of any kind, including a trailing body.
    fn skip_declaration(&mut self) -> Result<()> {
        let start = self.pos;
        loop {
            let end = self.declaration_end(self.pos)?;
            let Some(tok) = self.tokens.get(end) else {
                self.pos = end;
                return Ok(());
            };
            if tok.is_punct(";") {
                self.pos = end + 1;
                return Ok(());
            }
            if tok.is_punct("}") {
                self.pos = end;
                return Ok(());
            }
            let close = self.matching(end)?;
            self.pos = close + 1;
            let continues = self.tokens[start..end].iter().any(|t| {
                ["class", "struct", "union", "enum"]
                    .iter()
                    .any(|k| t.is_ident(k))
                    || t.is_punct("=")
            });
            if !continues {
                if self.peek().is_some_and(|t| t.is_punct(";")) {
                    self.pos += 1;
                }
                return Ok(());
            }
        }
    }

    fn skip_template(&mut self) -> Result<()> {
        self.pos += 1;
        if self.peek().is_some_and(|t| t.is_punct("<")) {
            self.pos = self.matching(self.pos)? + 1;
        }
        self.skip_declaration()
    }

    fn parse_scope(&mut self, open: Option<usize>) -> Result<()> {
        while let Some(tok) = self.peek() {
            if tok.is_punct("}") {
                if open.is_some() {
                    self.pos += 1;
                    return Ok(());
                }
                return Err(self
                    .context_for(tok)
                    .unexpected(tok.text.clone(), tok.span.range()));
            }
            if tok.is_punct(";") {
                self.pos += 1;
                continue;
            }
            if tok.is_punct("{") {
                self.pos = self.matching(self.pos)? + 1;
                continue;
            }
            match tok.text.as_str() {
                "namespace" => self.parse_namespace()?,
                "inline" if self.peek_at(1).is_some_and(|t| t.is_ident("namespace")) => {
                    self.pos += 1;
                }
                "extern"
                    if self.peek_at(1).is_some_and(|t| t.kind == TokenKind::Str)
                        && self.peek_at(2).is_some_and(|t| t.is_punct("{")) =>
                {
                    self.pos += 2;
                    let open = self.pos;
                    self.pos += 1;
                    self.parse_scope(Some(open))?;
                }
                "using" => self.parse_using()?,
                "template" => self.skip_template()?,
                "typedef" => self.parse_typedef()?,
                "enum" | "static_assert" => self.skip_declaration()?,
                "class" | "struct" | "union" => {
                    self.parse_class_or_declaration(None)?;
                }
                _ => {
                    if let Decl::Method(method) = self.parse_declaration(None)? {
                        self.record_function(method);
                    }
                }
            }
        }
        if let Some(open) = open {
            return Err(self.unbalanced(open));
        }
        Ok(())
    }

    fn record_function(&mut self, method: Method) {
        if method.kind != MethodKind::Regular {
            return;
        }
        let qualified_name = self.qualified(&method.name);
        self.out.functions.push(FreeFunction {
            name: method.name,
            qualified_name,
            return_type: method.return_type.unwrap_or_else(CppType::void),
            line: method.line,
            name_span: method.name_span,
            body: method.body,
        });
    }

    fn parse_namespace(&mut self) -> Result<()> {
        self.pos += 1;
        let mut names = Vec::new();
        while let Some(tok) = self.peek() {
            if tok.kind == TokenKind::Ident {
                names.push(tok.text.clone());
                self.pos += 1;
            } else if tok.is_punct("::") {
                self.pos += 1;
            } else {
                break;
            }
        }
        if !self.peek().is_some_and(|t| t.is_punct("{")) {
            // namespace alias
            return self.skip_declaration();
        }
        let open = self.pos;
        self.pos += 1;
        let pushed = names.len();
        self.scope.extend(names);
        let result = self.parse_scope(Some(open));
        self.scope.truncate(self.scope.len() - pushed);
        result
    }

    /// `using X = T;` becomes a typedef; using-directives are skipped.
    fn parse_using(&mut self) -> Result<()> {
        let alias = self.peek_at(1).filter(|t| t.kind == TokenKind::Ident);
        let is_alias = self.peek_at(2).is_some_and(|t| t.is_punct("="));
        let (Some(alias), true) = (alias, is_alias) else {
            return self.skip_declaration();
        };
        let tokens = self.tokens;
        let start = self.pos + 3;
        let end = self.declaration_end(start)?;
        let target: Vec<&Token> = tokens[start..end].iter().collect();
        self.register_typedef(&alias.text, parse_type(&target));
        self.pos = end;
        if self.peek().is_some_and(|t| t.is_punct(";")) {
            self.pos += 1;
        }
        Ok(())
    }

    fn register_typedef(&mut self, name: &str, target: CppType) {
        let qualified_name = self.qualified(name);
        self.out.typedefs.insert(
            qualified_name.clone(),
            Typedef {
                name: name.to_string(),
                qualified_name,
                target,
            },
        );
    }

    fn parse_typedef(&mut self) -> Result<()> {
        let tokens = self.tokens;
        self.pos += 1;
        let start = self.pos;
        let end = self.declaration_end(start)?;
        let elaborated = self.peek().is_some_and(|t| {
            ["class", "struct", "union", "enum"]
                .iter()
                .any(|k| t.is_ident(k))
        });

        if elaborated && tokens.get(end).is_some_and(|t| t.is_punct("{")) {
            return self.parse_typedef_definition(start, end);
        }

        let head: Vec<&Token> = tokens[start..end].iter().collect();
        self.pos = end;
        if self.peek().is_some_and(|t| t.is_punct(";")) {
            self.pos += 1;
        }

        if let Some((name, ty)) = function_pointer_declarator(&head) {
            if let Some(name) = name {
                self.register_typedef(&name, ty);
            }
            return Ok(());
        }

        let parts = split_top_level(&head, ",");
        let Some(first) = parts.first() else {
            return Ok(());
        };
        let first = strip_array(first);
        let Some((name, type_tokens)) = split_declarator(&first) else {
            return Ok(());
        };
        let base_tokens: Vec<&Token> = type_tokens
            .iter()
            .copied()
            .filter(|t| !t.is_punct("*") && !t.is_punct("&"))
            .collect();
        self.register_typedef(&name, parse_type(&type_tokens));
        for part in &parts[1..] {
            if let Some((name, ptrs)) = split_extra_declarator(&strip_array(part)) {
                let mut type_tokens = base_tokens.clone();
                type_tokens.extend(ptrs);
                self.register_typedef(&name, parse_type(&type_tokens));
            }
        }
        Ok(())
    }

    /// `typedef struct Tag { ... } Alias, *AliasPtr;`
    fn parse_typedef_definition(&mut self, start: usize, brace: usize) -> Result<()> {
        let tokens = self.tokens;
        let is_enum = tokens[start].is_ident("enum");
        let tag = if is_enum {
            let close = self.matching(brace)?;
            self.pos = close + 1;
            tokens[start + 1..brace]
                .iter()
                .rev()
                .find(|t| t.kind == TokenKind::Ident)
                .map(|t| t.text.clone())
        } else {
            let index = self.parse_class(start, brace)?;
            let class = &self.out.classes[index];
            (!class.name.is_empty()).then(|| class.name.clone())
        };

        let decl_start = self.pos;
        let end = self.declaration_end(decl_start)?;
        let declarators: Vec<&Token> = tokens[decl_start..end].iter().collect();
        self.pos = end;
        if self.peek().is_some_and(|t| t.is_punct(";")) {
            self.pos += 1;
        }

        let mut target_name = tag.clone();
        for part in split_top_level(&declarators, ",") {
            let Some(name_tok) = part.iter().rev().find(|t| t.kind == TokenKind::Ident) else {
                continue;
            };
            let pointers = part.iter().filter(|t| t.is_punct("*")).count();
            if target_name.is_none() && pointers == 0 && !is_enum {
                // anonymous struct takes the name of its first alias
                if let Some(class) = self.out.classes.last_mut() {
                    class.name = name_tok.text.clone();
                    class.qualified_name = {
                        let mut q = self.scope.clone();
                        q.push(name_tok.text.clone());
                        q.join("::")
                    };
                }
                target_name = Some(name_tok.text.clone());
            }
            let base = target_name.clone().unwrap_or_else(|| "int".to_string());
            let mut ty = CppType::named(base.clone());
            if pointers > 0 {
                ty.pointer_depth = pointers as u8;
                ty.spelling = format!("{}{}", base, "*".repeat(pointers));
            }
            if name_tok.text != base || pointers > 0 {
                self.register_typedef(&name_tok.text, ty);
            }
        }
        Ok(())
    }

    /// A class definition, or a declaration that starts with an elaborated
    /// type specifier (`struct tm* now;`, `class Foo;`).
    fn parse_class_or_declaration(&mut self, member: Option<Member<'_>>) -> Result<Decl> {
        let tokens = self.tokens;
        let start = self.pos;
        let end = self.declaration_end(start)?;
        let is_definition = tokens.get(end).is_some_and(|t| t.is_punct("{"))
            && !tokens[start..end]
                .iter()
                .any(|t| t.is_punct("(") || t.is_punct("="));
        if !is_definition {
            return self.parse_declaration(member);
        }
        self.parse_class(start, end)?;
        // declarators after the closing brace: `} instance;`
        if self.peek().is_some_and(|t| t.is_punct(";")) {
            self.pos += 1;
        } else {
            self.skip_declaration()?;
        }
        Ok(Decl::None)
    }

    /// Parse `class Name : bases { ... }` starting at the keyword; returns
    /// the index of the class in the output. Leaves `pos` after the `}`.
    fn parse_class(&mut self, keyword: usize, brace: usize) -> Result<usize> {
        let tokens = self.tokens;
        let kw = &tokens[keyword];
        let kind = match kw.text.as_str() {
            "struct" => ClassKind::Struct,
            "union" => ClassKind::Union,
            _ => ClassKind::Class,
        };
        let head: Vec<&Token> = tokens[keyword + 1..brace].iter().collect();
        let colon = head.iter().position(|t| t.is_punct(":"));
        let name = head[..colon.unwrap_or(head.len())]
            .iter()
            .rev()
            .find(|t| t.kind == TokenKind::Ident && !t.is_ident("final"))
            .map(|t| t.text.clone())
            .unwrap_or_default();
        let bases = colon
            .map(|c| {
                split_top_level(&head[c + 1..], ",")
                    .into_iter()
                    .map(|base| {
                        let base: Vec<&Token> = base
                            .into_iter()
                            .filter(|t| {
                                !["public", "protected", "private", "virtual"]
                                    .iter()
                                    .any(|k| t.is_ident(k))
                            })
                            .collect();
                        render(&base)
                    })
                    .filter(|b| !b.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let qualified_name = self.qualified(&name);
        self.pos = brace + 1;
        self.scope.push(name.clone());
        let body = self.parse_class_body(kind, &name, brace);
        self.scope.pop();
        let (methods, fields, first_member_line) = body?;

        let close = &tokens[self.pos - 1];
        self.out.classes.push(Class {
            name,
            qualified_name,
            kind,
            span: Span::new(kw.span.file, kw.span.start, close.span.end),
            head_line: kw.line,
            bases,
            methods,
            fields,
            first_member_line,
        });
        Ok(self.out.classes.len() - 1)
    }

    fn parse_class_body(
        &mut self,
        kind: ClassKind,
        class: &str,
        open: usize,
    ) -> Result<(Vec<Method>, Vec<Field>, Option<usize>)> {
        let mut access = kind.default_access();
        let mut methods = Vec::new();
        let mut fields = Vec::new();
        let mut first_member_line = None;

        loop {
            let Some(tok) = self.peek() else {
                return Err(self.unbalanced(open));
            };
            if tok.is_punct("}") {
                self.pos += 1;
                break;
            }
            if tok.is_punct(";") {
                self.pos += 1;
                continue;
            }
            let line = tok.line;
            let member = Member { class, access };
            let decl = match tok.text.as_str() {
                "public" | "protected" | "private"
                    if self.peek_at(1).is_some_and(|t| t.is_punct(":")) =>
                {
                    access = match tok.text.as_str() {
                        "public" => Access::Public,
                        "protected" => Access::Protected,
                        _ => Access::Private,
                    };
                    self.pos += 2;
                    continue;
                }
                "friend" | "enum" | "static_assert" => {
                    self.skip_declaration()?;
                    Decl::None
                }
                "using" => {
                    self.parse_using()?;
                    Decl::None
                }
                "template" => {
                    self.skip_template()?;
                    Decl::None
                }
                "typedef" => {
                    self.parse_typedef()?;
                    Decl::None
                }
                "class" | "struct" | "union" => self.parse_class_or_declaration(Some(member))?,
                _ => self.parse_declaration(Some(member))?,
            };
            match decl {
                Decl::Method(method) => {
                    first_member_line.get_or_insert(line);
                    methods.push(method);
                }
                Decl::Fields(new_fields) => {
                    first_member_line.get_or_insert(line);
                    fields.extend(new_fields);
                }
                Decl::None => {}
            }
        }
        Ok((methods, fields, first_member_line))
    }

    /// Parse a function or variable declaration, skipping any body.
    fn parse_declaration(&mut self, member: Option<Member<'_>>) -> Result<Decl> {
        let tokens = self.tokens;
        let start = self.pos;
        let end = self.declaration_end(start)?;
        let Some(terminator) = tokens.get(end) else {
            self.pos = end;
            return Ok(Decl::None);
        };
        if terminator.is_punct("}") {
            self.pos = end;
            return Ok(Decl::None);
        }

        let head = clean_head(&tokens[start..end]);
        let mut decl = classify(&head, member);

        if terminator.is_punct(";") {
            self.pos = end + 1;
            return Ok(decl);
        }

        let close = self.matching(end)?;
        if let Decl::Method(method) = &mut decl {
            method.body = Some(BodySpan {
                open: terminator.span,
                close: tokens[close].span,
            });
        }
        self.pos = close + 1;
        if self.peek().is_some_and(|t| t.is_punct(";")) {
            self.pos += 1;
        }
        Ok(decl)
    }
}

/// Drop attribute syntax that would confuse declarator detection.
fn clean_head(tokens: &[Token]) -> Vec<&Token> {
    let refs: Vec<&Token> = tokens.iter().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < refs.len() {
        let tok = refs[i];
        let attribute = ATTRIBUTE_WORDS.iter().any(|w| tok.is_ident(w))
            && refs.get(i + 1).is_some_and(|t| t.is_punct("("));
        if attribute {
            i = group_end(&refs, i + 1).unwrap_or(refs.len()) + 1;
            continue;
        }
        if tok.is_punct("[") && refs.get(i + 1).is_some_and(|t| t.is_punct("[")) {
            i = group_end(&refs, i).unwrap_or(refs.len()) + 1;
            continue;
        }
        out.push(tok);
        i += 1;
    }
    out
}

/// Index of the token closing the group opened at `open`.
fn group_end(tokens: &[&Token], open: usize) -> Option<usize> {
    let (o, c) = match tokens.get(open)?.text.as_str() {
        "(" => ("(", ")"),
        "[" => ("[", "]"),
        "{" => ("{", "}"),
        _ => ("<", ">"),
    };
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate().skip(open) {
        if tok.is_punct(o) {
            depth += 1;
        } else if tok.is_punct(c) {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Turn the head of a declaration into a method or fields.
fn classify(head: &[&Token], member: Option<Member<'_>>) -> Decl {
    if head.iter().any(|t| t.is_ident("operator")) {
        return Decl::None;
    }

    let mut angle = 0usize;
    let mut paren = None;
    for (i, tok) in head.iter().enumerate() {
        if tok.is_punct("<") {
            angle += 1;
        } else if tok.is_punct(">") {
            angle = angle.saturating_sub(1);
        } else if angle == 0 && tok.is_punct("(") {
            paren = Some(i);
            break;
        }
    }

    let Some(paren) = paren else {
        return match member {
            Some(member) => fields(head, member.access),
            None => Decl::None,
        };
    };

    if head.get(paren + 1).is_some_and(|t| t.is_punct("*")) {
        // function pointer data member
        return match (member, function_pointer_declarator(head)) {
            (Some(member), Some((Some(name), ty))) => Decl::Fields(vec![Field {
                name,
                ty,
                access: member.access,
                is_static: head.iter().any(|t| t.is_ident("static")),
            }]),
            _ => Decl::None,
        };
    }

    let Some(name_tok) = paren
        .checked_sub(1)
        .map(|i| head[i])
        .filter(|t| t.kind == TokenKind::Ident && !NOT_DECLARATORS.contains(&t.text.as_str()))
    else {
        return Decl::None;
    };
    method(head, paren, name_tok, member)
}

fn method(head: &[&Token], paren: usize, name_tok: &Token, member: Option<Member<'_>>) -> Decl {
    let name_idx = paren - 1;
    let is_destructor = name_idx > 0 && head[name_idx - 1].is_punct("~");
    let prefix_end = if is_destructor { name_idx - 1 } else { name_idx };
    if prefix_end > 0 && head[prefix_end - 1].is_punct("::") {
        // out-of-line definition of a member declared elsewhere
        return Decl::None;
    }

    let mut is_static = false;
    let mut is_virtual = false;
    let mut return_tokens = Vec::new();
    for tok in &head[..prefix_end] {
        if tok.is_ident("static") {
            is_static = true;
        } else if tok.is_ident("virtual") {
            is_virtual = true;
        } else if !SPECIFIERS.iter().any(|s| tok.is_ident(s)) && tok.kind != TokenKind::Str {
            return_tokens.push(*tok);
        }
    }

    let Some(close) = group_end(head, paren) else {
        return Decl::None;
    };
    let trailing = &head[close + 1..];
    let qualifier_end = trailing
        .iter()
        .position(|t| t.is_punct("=") || t.is_punct(":") || t.is_punct("->"))
        .unwrap_or(trailing.len());
    let is_const = trailing[..qualifier_end].iter().any(|t| t.is_ident("const"));

    let kind = match member {
        _ if is_destructor => MethodKind::Destructor,
        Some(m) if name_tok.text == m.class && return_tokens.is_empty() => MethodKind::Constructor,
        _ => MethodKind::Regular,
    };

    let return_type = match kind {
        MethodKind::Regular => {
            if let Some(arrow) = trailing.iter().position(|t| t.is_punct("->")) {
                let end = trailing[arrow..]
                    .iter()
                    .position(|t| t.is_punct("=") || t.is_punct(":"))
                    .map(|p| arrow + p)
                    .unwrap_or(trailing.len());
                Some(parse_type(&trailing[arrow + 1..end]))
            } else if return_tokens.is_empty() {
                // a macro invocation, not a declaration
                return Decl::None;
            } else {
                Some(parse_type(&return_tokens))
            }
        }
        _ => None,
    };

    let params = split_top_level(&head[paren + 1..close], ",")
        .iter()
        .filter_map(|p| param(p))
        .collect();

    Decl::Method(Method {
        name: name_tok.text.clone(),
        kind,
        return_type,
        params,
        access: member.map(|m| m.access).unwrap_or(Access::Public),
        is_static,
        is_virtual,
        is_const,
        line: name_tok.line,
        name_span: name_tok.span,
        body: None,
    })
}

fn fields(head: &[&Token], access: Access) -> Decl {
    let is_static = head.iter().any(|t| t.is_ident("static"));
    let head: Vec<&Token> = head
        .iter()
        .copied()
        .filter(|t| !SPECIFIERS.iter().any(|s| t.is_ident(s)))
        .collect();

    let parts = split_top_level(&head, ",");
    let Some(first) = parts.first() else {
        return Decl::None;
    };
    let first = strip_initializer(first);
    let Some((name, type_tokens)) = split_declarator(&strip_array(&first)) else {
        return Decl::None;
    };
    let base_tokens: Vec<&Token> = type_tokens
        .iter()
        .copied()
        .filter(|t| !t.is_punct("*") && !t.is_punct("&"))
        .collect();

    let mut out = vec![Field {
        name,
        ty: parse_type(&type_tokens),
        access,
        is_static,
    }];
    for part in &parts[1..] {
        let part = strip_array(&strip_initializer(part));
        if let Some((name, ptrs)) = split_extra_declarator(&part) {
            let mut type_tokens = base_tokens.clone();
            type_tokens.extend(ptrs);
            out.push(Field {
                name,
                ty: parse_type(&type_tokens),
                access,
                is_static,
            });
        }
    }
    Decl::Fields(out)
}

/// Parse one function parameter.
fn param(tokens: &[&Token]) -> Option<Param> {
    let default_at = tokens.iter().position(|t| t.is_punct("="));
    let has_default = default_at.is_some();
    let tokens = &tokens[..default_at.unwrap_or(tokens.len())];

    if tokens.is_empty()
        || (tokens.len() == 1 && (tokens[0].is_ident("void") || tokens[0].is_punct("...")))
    {
        return None;
    }

    if let Some((name, ty)) = function_pointer_declarator(tokens) {
        return Some(Param {
            name,
            ty,
            has_default,
        });
    }

    let array = tokens.last().is_some_and(|t| t.is_punct("]"));
    let tokens = strip_array(tokens);
    let (name, type_tokens) = match split_declarator(&tokens) {
        Some((name, type_tokens)) => (Some(name), type_tokens),
        None => (None, tokens),
    };
    let mut ty = parse_type(&type_tokens);
    if array {
        ty.pointer_depth += 1;
        ty.spelling.push('*');
    }
    Some(Param {
        name,
        ty,
        has_default,
    })
}

/// Recognise `ret (*name)(params)`; the name is optional.
fn function_pointer_declarator(tokens: &[&Token]) -> Option<(Option<String>, CppType)> {
    let open = tokens
        .iter()
        .position(|t| t.is_punct("("))
        .filter(|&i| tokens.get(i + 1).is_some_and(|t| t.is_punct("*")))?;
    let close = group_end(tokens, open)?;
    let name = tokens[open + 2..close]
        .iter()
        .rev()
        .find(|t| t.kind == TokenKind::Ident && !QUALIFIERS.contains(&t.text.as_str()))
        .map(|t| t.text.clone());
    let params_open = close + 1;
    if !tokens.get(params_open).is_some_and(|t| t.is_punct("(")) {
        return None;
    }
    let params_close = group_end(tokens, params_open)?;
    let params = split_top_level(&tokens[params_open + 1..params_close], ",")
        .iter()
        .filter_map(|p| param(p))
        .map(|p| p.ty)
        .collect();
    let ret: Vec<&Token> = tokens[..open]
        .iter()
        .copied()
        .filter(|t| !SPECIFIERS.iter().any(|s| t.is_ident(s)))
        .collect();
    Some((name, function_pointer(parse_type(&ret), params)))
}

/// Split `T const* name` into the name and the type tokens.
///
/// Returns `None` when the last token cannot be a declarator name, as in
/// the unnamed parameter `const int32_t`.
fn split_declarator<'t>(tokens: &[&'t Token]) -> Option<(String, Vec<&'t Token>)> {
    let (last, rest) = tokens.split_last()?;
    if last.kind != TokenKind::Ident
        || BUILTIN_TYPES.contains(&last.text.as_str())
        || QUALIFIERS.contains(&last.text.as_str())
    {
        return None;
    }
    if rest.last().is_some_and(|t| t.is_punct("::")) {
        return None;
    }
    let names_a_type = rest
        .iter()
        .any(|t| t.kind == TokenKind::Ident && !QUALIFIERS.contains(&t.text.as_str()));
    if !names_a_type {
        return None;
    }
    Some((last.text.clone(), rest.to_vec()))
}

/// Split a declarator after the first comma (`*b` in `int a, *b;`) into the
/// name and its pointer/reference tokens.
fn split_extra_declarator<'t>(tokens: &[&'t Token]) -> Option<(String, Vec<&'t Token>)> {
    let (last, rest) = tokens.split_last()?;
    if last.kind != TokenKind::Ident {
        return None;
    }
    Some((last.text.clone(), rest.to_vec()))
}

/// Drop a trailing `[N]` array suffix.
fn strip_array<'t>(tokens: &[&'t Token]) -> Vec<&'t Token> {
    let mut end = tokens.len();
    while end > 0 && tokens[end - 1].is_punct("]") {
        match tokens[..end].iter().rposition(|t| t.is_punct("[")) {
            Some(open) => end = open,
            None => break,
        }
    }
    tokens[..end].to_vec()
}

/// Drop `= value`, `{ value }` or `: bits` from a data member declarator.
fn strip_initializer<'t>(tokens: &[&'t Token]) -> Vec<&'t Token> {
    let end = tokens
        .iter()
        .position(|t| t.is_punct("=") || t.is_punct("{") || t.is_punct(":"))
        .unwrap_or(tokens.len());
    tokens[..end].to_vec()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use bridgegen_ir::FileId;

    use super::*;
    use crate::{error::SourceContext, lexer::lex};

    fn parse_src(src: &str) -> Parsed {
        let ctx = SourceContext::new(src, "test.cpp");
        let tokens = lex(FileId(0), &ctx).expect("lex failed");
        let files = vec![SourceFile {
            id: FileId(0),
            path: PathBuf::from("test.cpp"),
            text: src.to_string(),
        }];
        parse(&tokens, &files).expect("parse failed")
    }

    fn class<'p>(parsed: &'p Parsed, name: &str) -> &'p Class {
        parsed
            .classes
            .iter()
            .find(|c| c.qualified_name == name)
            .unwrap_or_else(|| panic!("class {} not found", name))
    }

    #[test]
    fn test_namespaced_class_with_access() {
        let parsed = parse_src(
            r#"
namespace OpenZWave {
class Manager {
    friend class Driver;
public:
    static Manager* Get();
    bool GetValueAsBool( ValueID const& _id, bool* o_value );
    void WriteConfig( uint32 const _homeId );
private:
    Manager();
    virtual ~Manager();
    void Hidden();
};
}
"#,
        );
        let manager = class(&parsed, "OpenZWave::Manager");
        assert_eq!(manager.name, "Manager");
        let names: Vec<&str> = manager.public_methods().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Get", "GetValueAsBool", "WriteConfig"]);

        let get_bool = &manager.methods[1];
        assert_eq!(get_bool.params.len(), 2);
        assert_eq!(get_bool.params[0].ty.spelling, "ValueID const&");
        assert_eq!(get_bool.params[1].name.as_deref(), Some("o_value"));
        assert_eq!(get_bool.return_type.as_ref().unwrap().spelling, "bool");

        assert!(manager.methods[0].is_static);
        assert!(
            manager
                .methods
                .iter()
                .any(|m| m.kind == MethodKind::Constructor)
        );
        assert!(
            manager
                .methods
                .iter()
                .any(|m| m.kind == MethodKind::Destructor && m.is_virtual)
        );
    }

    #[test]
    fn test_handler_bodies_are_recorded() {
        let src = r#"
class RemoteManagerHandler : virtual public RemoteManagerIf {
 public:
  RemoteManagerHandler() {
    // Your initialization goes here
  }

  void WriteConfig(const int32_t _homeId) {
    // Your implementation goes here
    printf("WriteConfig\n");
  }
};
"#;
        let parsed = parse_src(src);
        let handler = class(&parsed, "RemoteManagerHandler");
        assert_eq!(handler.bases, vec!["RemoteManagerIf".to_string()]);
        assert_eq!(handler.first_member_line, Some(4));

        let write = handler.public_methods().next().unwrap();
        assert_eq!(write.name, "WriteConfig");
        assert_eq!(write.line, 8);
        let body = write.body.expect("body");
        let inner = &src[body.inner().range()];
        assert!(inner.contains("printf(\"WriteConfig\\n\");"));
        assert_eq!(write.params[0].name.as_deref(), Some("_homeId"));
        assert!(write.params[0].ty.is_const);
    }

    #[test]
    fn test_unnamed_and_default_params() {
        let parsed = parse_src(
            "class A { public: void f(const int32_t, bool _x = false, uint8 _n = 0xff); };",
        );
        let f = &class(&parsed, "A").methods[0];
        assert_eq!(f.params.len(), 3);
        assert_eq!(f.params[0].name, None);
        assert_eq!(f.params[0].ty.base, "int32_t");
        assert!(f.params[1].has_default);
        assert_eq!(f.params[2].name.as_deref(), Some("_n"));
    }

    #[test]
    fn test_function_pointer_typedef_in_class() {
        let parsed = parse_src(
            r#"
namespace OpenZWave {
class Driver {
public:
    typedef void (*pfnControllerCallback_t)( ControllerState _state, void* _context );
};
}
"#,
        );
        let td = parsed
            .typedefs
            .get("OpenZWave::Driver::pfnControllerCallback_t")
            .expect("typedef");
        let sig = td.target.function.as_ref().expect("function pointer");
        assert!(sig.return_type.is_void());
        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.params[0].spelling, "ControllerState");
        assert_eq!(sig.params[1].spelling, "void*");
    }

    #[test]
    fn test_inline_function_pointer_param() {
        let parsed = parse_src(
            "class M { public: bool Begin(uint32 const _homeId, void (*_callback)(int, void*), void* _context = NULL); };",
        );
        let begin = &class(&parsed, "M").methods[0];
        assert_eq!(begin.params.len(), 3);
        assert_eq!(begin.params[1].name.as_deref(), Some("_callback"));
        assert!(begin.params[1].ty.is_function_pointer());
        assert_eq!(begin.params[1].ty.spelling, "void (*)(int, void*)");
    }

    #[test]
    fn test_plain_typedefs() {
        let parsed = parse_src("typedef unsigned char uint8; typedef int64_t RemoteValueID;");
        assert_eq!(parsed.typedefs["uint8"].target.base, "unsigned char");
        assert_eq!(parsed.typedefs["RemoteValueID"].target.base, "int64_t");
    }

    #[test]
    fn test_typedef_struct() {
        let parsed = parse_src(
            "typedef struct _Isset { _Isset() : a(false) {} bool a; } _Isset; typedef struct { int x; } Anon;",
        );
        let isset = class(&parsed, "_Isset");
        assert_eq!(isset.fields.len(), 1);
        let anon = class(&parsed, "Anon");
        assert_eq!(anon.fields[0].name, "x");
    }

    #[test]
    fn test_fields_and_return_aggregate() {
        let parsed = parse_src(
            r#"
namespace OpenZWave {
class Bool_ListString {
 public:
  static const char* ascii_fingerprint;
  Bool_ListString() : retval(0) {
  }
  virtual ~Bool_ListString() throw() {}
  bool retval;
  std::vector<std::string>  arg;
  int a, *b;
  bool operator == (const Bool_ListString & rhs) const { return true; }
};
}
"#,
        );
        let agg = class(&parsed, "OpenZWave::Bool_ListString");
        assert!(agg.field("ascii_fingerprint").is_none());
        assert_eq!(agg.field("retval").unwrap().ty.base, "bool");
        assert_eq!(
            agg.field("arg").unwrap().ty.spelling,
            "std::vector<std::string>"
        );
        assert_eq!(agg.field("b").unwrap().ty.pointer_depth, 1);
        assert_eq!(agg.public_methods().count(), 0);
    }

    #[test]
    fn test_main_and_skipped_constructs() {
        let parsed = parse_src(
            r#"
using namespace ::apache::thrift;
template <typename T> class Box { T t; };
enum Color { Red, Green };
extern "C" { int c_func(void); }
int main(int argc, char **argv) {
  int port = 9090;
  if (argc) { return 0; }
  return 0;
}
"#,
        );
        let main = parsed.functions.iter().find(|f| f.name == "main").unwrap();
        assert_eq!(main.line, 6);
        assert!(main.body.is_some());
        assert!(parsed.functions.iter().any(|f| f.name == "c_func"));
        assert!(parsed.classes.iter().all(|c| c.name != "Box"));
    }

    #[test]
    fn test_nested_class_qualified_name() {
        let parsed = parse_src("namespace a { struct Outer { struct Inner { int v; }; int w; }; }");
        assert!(parsed.classes.iter().any(|c| c.qualified_name == "a::Outer::Inner"));
        assert_eq!(class(&parsed, "a::Outer").fields.len(), 1);
    }

    #[test]
    fn test_unbalanced_brace_is_error() {
        let src = "class A { void f() {";
        let ctx = SourceContext::new(src, "test.cpp");
        let tokens = lex(FileId(0), &ctx).unwrap();
        let files = vec![SourceFile {
            id: FileId(0),
            path: PathBuf::from("test.cpp"),
            text: src.to_string(),
        }];
        assert!(parse(&tokens, &files).is_err());
    }

    #[test]
    fn test_stray_close_brace_is_error() {
        let src = "int x; }";
        let ctx = SourceContext::new(src, "test.cpp");
        let tokens = lex(FileId(0), &ctx).unwrap();
        let files = vec![SourceFile {
            id: FileId(0),
            path: PathBuf::from("test.cpp"),
            text: src.to_string(),
        }];
        assert!(parse(&tokens, &files).is_err());
    }
}

//! Include resolution and conditional compilation.
//!
//! Produces a single token stream for a batch of root files: included files
//! are spliced in at the `#include`, inactive conditional regions are
//! dropped, and each file is read at most once per batch. Macros are
//! recorded for `#if` evaluation but never expanded.

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use bridgegen_ir::{FileId, SourceFile};
use tracing::{debug, trace};

use crate::{
    error::{Error, Result, SourceContext},
    lexer::{Token, TokenKind, lex},
    options::FrontendOptions,
};

/// Output of a preprocessing batch.
#[derive(Debug, Default)]
pub struct Preprocessed {
    pub files: Vec<SourceFile>,
    pub tokens: Vec<Token>,
    /// Include targets that could not be found on the search path.
    pub unresolved_includes: Vec<String>,
}

pub struct Preprocessor<'a> {
    options: &'a FrontendOptions,
    macros: HashMap<String, String>,
    included: HashSet<PathBuf>,
    out: Preprocessed,
}

struct Conditional {
    directive: String,
    span: (usize, usize),
    parent_active: bool,
    taken: bool,
    active: bool,
}

impl<'a> Preprocessor<'a> {
    pub fn new(options: &'a FrontendOptions) -> Self {
        let macros = options
            .defines
            .iter()
            .map(|d| match d.split_once('=') {
                Some((name, value)) => (name.trim().to_string(), value.trim().to_string()),
                None => (d.trim().to_string(), "1".to_string()),
            })
            .collect();
        Self {
            options,
            macros,
            included: HashSet::new(),
            out: Preprocessed::default(),
        }
    }

    /// Preprocess a root file, appending its tokens to the batch.
    pub fn add_root(&mut self, path: &Path) -> Result<()> {
        self.process_file(path)
    }

    /// Preprocess in-memory source as if it had been read from `path`.
    pub fn add_source(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Result<()> {
        let path = path.into();
        self.included.insert(path.clone());
        self.process_text(path, text.into())
    }

    pub fn finish(self) -> Preprocessed {
        self.out
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    fn process_file(&mut self, path: &Path) -> Result<()> {
        let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if !self.included.insert(canonical.clone()) {
            trace!(path = %canonical.display(), "already included");
            return Ok(());
        }

        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        self.process_text(canonical, text)
    }

    fn process_text(&mut self, path: PathBuf, text: String) -> Result<()> {
        let id = FileId(self.out.files.len() as u32);
        let ctx = SourceContext::new(text.clone(), path.display().to_string());
        debug!(path = %path.display(), "parsing");
        let dir = path.parent().map(Path::to_path_buf);
        self.out.files.push(SourceFile { id, path, text });

        let tokens = lex(id, &ctx)?;
        let mut stack: Vec<Conditional> = Vec::new();

        for tok in tokens {
            let active = stack.last().is_none_or(|c| c.active);
            if tok.kind != TokenKind::Directive {
                if active && !self.is_ignored(&tok) {
                    self.out.tokens.push(tok);
                }
                continue;
            }

            let (name, rest) = split_directive(&tok.text);
            let span = (tok.span.start, tok.span.len());
            match name {
                "if" | "ifdef" | "ifndef" => {
                    let value = active && self.condition(name, rest);
                    stack.push(Conditional {
                        directive: name.to_string(),
                        span,
                        parent_active: active,
                        taken: value || !active,
                        active: value,
                    });
                }
                "elif" => {
                    let Some(top) = stack.last() else {
                        return Err(ctx.dangling_directive(name, span));
                    };
                    let value = top.parent_active && !top.taken && self.condition("if", rest);
                    if let Some(top) = stack.last_mut() {
                        top.active = value;
                        top.taken |= value;
                    }
                }
                "else" => {
                    let Some(top) = stack.last_mut() else {
                        return Err(ctx.dangling_directive(name, span));
                    };
                    top.active = top.parent_active && !top.taken;
                    top.taken = true;
                }
                "endif" => {
                    if stack.pop().is_none() {
                        return Err(ctx.dangling_directive(name, span));
                    }
                }
                _ if !active => {}
                "define" => {
                    let (macro_name, value) = split_define(rest);
                    if !macro_name.is_empty() {
                        self.macros.insert(macro_name, value);
                    }
                }
                "undef" => {
                    self.macros.remove(rest.trim());
                }
                "include" | "import" => self.include(rest, dir.as_deref())?,
                _ => trace!(directive = %tok.text, "ignored directive"),
            }
        }

        if let Some(open) = stack.pop() {
            return Err(ctx.unterminated_conditional(open.directive, open.span));
        }
        Ok(())
    }

    fn is_ignored(&self, tok: &Token) -> bool {
        tok.kind == TokenKind::Ident && self.options.ignored_macros.iter().any(|m| *m == tok.text)
    }

    fn condition(&self, directive: &str, rest: &str) -> bool {
        match directive {
            "ifdef" => self.is_defined(rest.trim()),
            "ifndef" => !self.is_defined(rest.trim()),
            _ => evaluate(rest, &self.macros) != 0,
        }
    }

    fn include(&mut self, rest: &str, current_dir: Option<&Path>) -> Result<()> {
        let rest = rest.trim();
        let (target, quoted) = if let Some(inner) = rest.strip_prefix('"') {
            (inner.trim_end_matches('"'), true)
        } else if let Some(inner) = rest.strip_prefix('<') {
            (inner.trim_end_matches('>'), false)
        } else {
            // computed includes are not supported
            trace!(include = rest, "skipping macro include");
            return Ok(());
        };

        match self.resolve_include(target, quoted, current_dir) {
            Some(path) => {
                trace!(include = target, path = %path.display(), "resolved include");
                self.process_file(&path)
            }
            None => {
                debug!(include = target, "include not found on search path");
                self.out.unresolved_includes.push(target.to_string());
                Ok(())
            }
        }
    }

    fn resolve_include(
        &self,
        target: &str,
        quoted: bool,
        current_dir: Option<&Path>,
    ) -> Option<PathBuf> {
        let local = if quoted { current_dir } else { None };
        local
            .into_iter()
            .chain(self.options.include_dirs.iter().map(PathBuf::as_path))
            .map(|dir| dir.join(target))
            .find(|candidate| candidate.is_file())
    }
}

fn split_directive(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    let end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    (&text[..end], &text[end..])
}

fn split_define(rest: &str) -> (String, String) {
    let rest = rest.trim_start();
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let name = rest[..end].to_string();
    let value = rest[end..].trim();
    // function-like macros have no usable value
    let value = if value.starts_with('(') && rest[end..].starts_with('(') {
        String::new()
    } else {
        value.to_string()
    };
    (name, value)
}

/// Evaluate a `#if` expression. Unknown identifiers are 0.
pub fn evaluate(expr: &str, macros: &HashMap<String, String>) -> i64 {
    evaluate_nested(expr, macros, 0)
}

fn evaluate_nested(expr: &str, macros: &HashMap<String, String>, depth: usize) -> i64 {
    let tokens = expr_tokens(expr);
    let mut eval = Eval {
        tokens: &tokens,
        pos: 0,
        macros,
        depth,
    };
    eval.or()
}

fn expr_tokens(expr: &str) -> Vec<String> {
    let mut out = Vec::new();
    let chars: Vec<char> = expr.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            out.push(chars[start..i].iter().collect());
        } else {
            let two: String = chars[i..(i + 2).min(chars.len())].iter().collect();
            if ["&&", "||", "==", "!=", "<=", ">="].contains(&two.as_str()) {
                out.push(two);
                i += 2;
            } else {
                out.push(c.to_string());
                i += 1;
            }
        }
    }
    out
}

const MAX_MACRO_DEPTH: usize = 8;

struct Eval<'a> {
    tokens: &'a [String],
    pos: usize,
    macros: &'a HashMap<String, String>,
    depth: usize,
}

impl Eval<'_> {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn eat(&mut self, tok: &str) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or(&mut self) -> i64 {
        let mut value = self.and();
        while self.eat("||") {
            let rhs = self.and();
            value = ((value != 0) || (rhs != 0)) as i64;
        }
        value
    }

    fn and(&mut self) -> i64 {
        let mut value = self.comparison();
        while self.eat("&&") {
            let rhs = self.comparison();
            value = ((value != 0) && (rhs != 0)) as i64;
        }
        value
    }

    fn comparison(&mut self) -> i64 {
        let mut value = self.unary();
        loop {
            let op = match self.peek() {
                Some(op @ ("==" | "!=" | "<" | ">" | "<=" | ">=")) => op.to_string(),
                _ => return value,
            };
            self.pos += 1;
            let rhs = self.unary();
            value = match op.as_str() {
                "==" => value == rhs,
                "!=" => value != rhs,
                "<" => value < rhs,
                ">" => value > rhs,
                "<=" => value <= rhs,
                _ => value >= rhs,
            } as i64;
        }
    }

    fn unary(&mut self) -> i64 {
        if self.eat("!") {
            return (self.unary() == 0) as i64;
        }
        if self.eat("-") {
            return -self.unary();
        }
        self.primary()
    }

    fn primary(&mut self) -> i64 {
        if self.eat("(") {
            let value = self.or();
            self.eat(")");
            return value;
        }
        let Some(tok) = self.peek().map(str::to_string) else {
            return 0;
        };
        self.pos += 1;
        if tok == "defined" {
            let parens = self.eat("(");
            let name = self.peek().map(str::to_string).unwrap_or_default();
            self.pos += 1;
            if parens {
                self.eat(")");
            }
            return self.macros.contains_key(&name) as i64;
        }
        if let Some(value) = parse_int(&tok) {
            return value;
        }
        match self.macros.get(&tok) {
            Some(value) if self.depth < MAX_MACRO_DEPTH => {
                evaluate_nested(value, self.macros, self.depth + 1)
            }
            _ => 0,
        }
    }
}

fn parse_int(tok: &str) -> Option<i64> {
    if !tok.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let digits = tok.trim_end_matches(['u', 'U', 'l', 'L']);
    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        return i64::from_str_radix(hex, 16).ok();
    }
    digits.parse().ok()
}

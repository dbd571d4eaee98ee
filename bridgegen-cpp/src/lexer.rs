//! Tokenizer for C++ source text.
//!
//! Comments are dropped, preprocessor lines are kept whole as
//! [`TokenKind::Directive`] tokens. Every token records its byte span in the
//! original text so the parser's spans can be used to patch that text.

use bridgegen_ir::{FileId, Span};

use crate::error::{Result, SourceContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    Str,
    Char,
    Punct,
    /// A full preprocessor line without the leading `#`, continuations joined.
    Directive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    /// 1-based line of the first character.
    pub line: usize,
}

impl Token {
    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == p
    }

    pub fn is_ident(&self, s: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == s
    }

    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Ident | TokenKind::Number)
    }
}

/// Multi-character punctuators recognised as one token.
///
/// `<<` and `>>` are deliberately absent so that nested template argument
/// lists close one `>` at a time.
const MULTI_PUNCT: &[&str] = &["...", "::", "->", "&&", "||", "==", "!=", "++", "--"];

/// Tokenize one file.
pub fn lex(file: FileId, ctx: &SourceContext) -> Result<Vec<Token>> {
    Lexer::new(file, ctx).run()
}

struct Lexer<'a> {
    file: FileId,
    ctx: &'a SourceContext,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    at_line_start: bool,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(file: FileId, ctx: &'a SourceContext) -> Self {
        Self {
            file,
            ctx,
            bytes: ctx.src().as_bytes(),
            pos: 0,
            line: 1,
            at_line_start: true,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while self.pos < self.bytes.len() {
            let c = self.bytes[self.pos];
            match c {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                    self.at_line_start = true;
                }
                b' ' | b'\t' | b'\r' | 0x0c | 0x0b => self.pos += 1,
                b'\\' if self.peek(1) == Some(b'\n') => {
                    self.pos += 2;
                    self.line += 1;
                }
                b'/' if self.peek(1) == Some(b'/') => self.skip_line_comment(),
                b'/' if self.peek(1) == Some(b'*') => self.skip_block_comment()?,
                b'#' if self.at_line_start => self.directive()?,
                _ => {
                    self.at_line_start = false;
                    self.token()?;
                }
            }
        }
        Ok(self.tokens)
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize) {
        let text = self.ctx.src()[start..self.pos].to_string();
        self.push_text(kind, text, start, line);
    }

    fn push_text(&mut self, kind: TokenKind, text: String, start: usize, line: usize) {
        self.tokens.push(Token {
            kind,
            text,
            span: Span::new(self.file, start, self.pos),
            line,
        });
    }

    fn skip_line_comment(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 2;
        loop {
            match self.bytes.get(self.pos) {
                None => return Err(self.ctx.unterminated_comment(start..start + 2)),
                Some(b'*') if self.peek(1) == Some(b'/') => {
                    self.pos += 2;
                    return Ok(());
                }
                Some(b'\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn directive(&mut self) -> Result<()> {
        let start = self.pos;
        let line = self.line;
        self.pos += 1;
        let mut text = String::new();
        while let Some(&c) = self.bytes.get(self.pos) {
            match c {
                b'\n' => break,
                b'\\' if self.peek(1) == Some(b'\n') => {
                    self.pos += 2;
                    self.line += 1;
                    text.push(' ');
                }
                b'\\' if self.peek(1) == Some(b'\r') && self.peek(2) == Some(b'\n') => {
                    self.pos += 3;
                    self.line += 1;
                    text.push(' ');
                }
                b'/' if self.peek(1) == Some(b'/') => self.skip_line_comment(),
                b'/' if self.peek(1) == Some(b'*') => {
                    self.skip_block_comment()?;
                    text.push(' ');
                }
                b'"' | b'<' if is_include(&text) => {
                    let close = if c == b'"' { b'"' } else { b'>' };
                    text.push(c as char);
                    self.pos += 1;
                    while let Some(&d) = self.bytes.get(self.pos) {
                        if d == b'\n' {
                            break;
                        }
                        text.push(d as char);
                        self.pos += 1;
                        if d == close {
                            break;
                        }
                    }
                }
                _ => {
                    text.push(c as char);
                    self.pos += 1;
                }
            }
        }
        let text = text.trim().to_string();
        self.push_text(TokenKind::Directive, text, start, line);
        Ok(())
    }

    fn token(&mut self) -> Result<()> {
        let start = self.pos;
        let line = self.line;
        let c = self.bytes[self.pos];

        if c.is_ascii_alphabetic() || c == b'_' || c == b'$' {
            while let Some(&d) = self.bytes.get(self.pos) {
                if d.is_ascii_alphanumeric() || d == b'_' || d == b'$' {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            // String prefixes: L"...", u8"...", R"(...)" are lexed as plain strings
            if matches!(self.peek(0), Some(b'"') | Some(b'\''))
                && matches!(&self.ctx.src()[start..self.pos], "L" | "u" | "U" | "u8" | "R")
            {
                return self.quoted(start, line);
            }
            self.push(TokenKind::Ident, start, line);
            return Ok(());
        }

        if c.is_ascii_digit() || (c == b'.' && self.peek(1).is_some_and(|d| d.is_ascii_digit())) {
            while let Some(&d) = self.bytes.get(self.pos) {
                let exponent_sign = (d == b'+' || d == b'-')
                    && matches!(self.bytes[self.pos - 1], b'e' | b'E' | b'p' | b'P');
                if d.is_ascii_alphanumeric() || d == b'.' || d == b'\'' || exponent_sign {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            self.push(TokenKind::Number, start, line);
            return Ok(());
        }

        if c == b'"' || c == b'\'' {
            return self.quoted(start, line);
        }

        let rest = &self.ctx.src()[self.pos..];
        let len = MULTI_PUNCT
            .iter()
            .find(|p| rest.starts_with(**p))
            .map(|p| p.len())
            .unwrap_or_else(|| rest.chars().next().map(char::len_utf8).unwrap_or(1));
        self.pos += len;
        self.push(TokenKind::Punct, start, line);
        Ok(())
    }

    fn quoted(&mut self, start: usize, line: usize) -> Result<()> {
        let quote = self.bytes[self.pos];
        let (kind, what) = if quote == b'"' {
            (TokenKind::Str, "string")
        } else {
            (TokenKind::Char, "character")
        };
        self.pos += 1;
        loop {
            match self.bytes.get(self.pos) {
                None | Some(b'\n') => {
                    return Err(self.ctx.unterminated_literal(what, start..self.pos));
                }
                Some(b'\\') => self.pos += 2,
                Some(&d) if d == quote => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        self.push(kind, start, line);
        Ok(())
    }
}

fn is_include(text: &str) -> bool {
    let t = text.trim_start();
    (t.starts_with("include") || t.starts_with("import")) && t.split_whitespace().count() == 1
}

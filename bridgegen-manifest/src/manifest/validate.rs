//! Validation context and utilities for manifest parsing.

use std::sync::Arc;

use miette::SourceSpan;
use regex::Regex;

use crate::{Result, error::SourceContext};

/// Parsing and validation context that carries source information.
///
/// This struct encapsulates the source content, filename, and current
/// section path, so that errors raised deep inside validation still point at
/// the right place in bridge.toml.
///
/// # Example
///
/// ```ignore
/// let ctx = ParseContext::new(src, "bridge.toml");
/// ctx.push("handler").validate_qualified_name("RemoteManagerHandler", "class name")?;
/// ```
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    /// Source context for error reporting (shared across nested contexts)
    source: Arc<SourceContext>,
    /// Section path (e.g., ["manager"])
    path: Vec<&'a str>,
}

impl<'a> ParseContext<'a> {
    /// Create a new parse context with the given source and filename.
    pub fn new(src: &str, filename: &str) -> Self {
        Self {
            source: Arc::new(SourceContext::new(src, filename)),
            path: Vec::new(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        self.source.src()
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        self.source.filename()
    }

    /// Get the source context for error creation.
    pub fn source_context(&self) -> &SourceContext {
        &self.source
    }

    /// Push a path segment and return a new context.
    pub fn push(&self, segment: &'a str) -> Self {
        let mut new_path = self.path.clone();
        new_path.push(segment);
        Self {
            source: Arc::clone(&self.source),
            path: new_path,
        }
    }

    /// Get the current path as a dot-separated string.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Get a context description for error messages.
    ///
    /// For example: "class name in 'handler'" or just "class name" if no path.
    pub fn context_for(&self, kind: &str) -> String {
        if self.path.is_empty() {
            kind.to_string()
        } else {
            format!("{} in '{}'", kind, self.path_string())
        }
    }

    /// Find the span of a quoted value in the source.
    pub fn find_span(&self, value: &str) -> Option<SourceSpan> {
        find_value_span(self.source.src(), value)
    }

    /// Validate that a name is a usable C++ identifier.
    pub fn validate_name(&self, name: &str, kind: &str) -> Result<()> {
        if is_cpp_keyword(name) {
            return Err(self.source.reserved_keyword_error(
                name,
                self.context_for(kind),
                self.find_span(name),
            ));
        }

        if let Some(reason) = validate_identifier(name) {
            return Err(self.source.invalid_identifier_error(
                name,
                self.context_for(kind),
                reason,
                self.find_span(name),
            ));
        }

        Ok(())
    }

    /// Validate a possibly namespace-qualified name such as
    /// `OpenZWave::Manager`.
    pub fn validate_qualified_name(&self, name: &str, kind: &str) -> Result<()> {
        let trimmed = name.strip_prefix("::").unwrap_or(name);
        if trimmed.is_empty() {
            return Err(self.source.invalid_identifier_error(
                name,
                self.context_for(kind),
                "name cannot be empty",
                self.find_span(name),
            ));
        }
        for segment in trimmed.split("::") {
            if is_cpp_keyword(segment) {
                return Err(self.source.reserved_keyword_error(
                    segment,
                    self.context_for(kind),
                    self.find_span(name),
                ));
            }
            if let Some(reason) = validate_identifier(segment) {
                return Err(self.source.invalid_identifier_error(
                    name,
                    self.context_for(kind),
                    reason,
                    self.find_span(name),
                ));
            }
        }
        Ok(())
    }

    /// Validate that a marker used for substring matching is not empty.
    pub fn validate_marker(&self, marker: &str, kind: &str) -> Result<()> {
        if marker.trim().is_empty() {
            return Err(self.source.validation_error_at(
                format!("{} cannot be empty", self.context_for(kind)),
                None,
            ));
        }
        Ok(())
    }

    /// Validate the disambiguation pattern: it must compile and capture
    /// exactly the target name and the hint.
    pub fn validate_pattern(&self, pattern: &str) -> Result<()> {
        let span = self.find_span(pattern);
        let regex = Regex::new(pattern)
            .map_err(|e| self.source.invalid_pattern_error(e, span))?;

        // group 0 is the whole match
        if regex.captures_len() != 3 {
            return Err(self.source.validation_error_at(
                format!(
                    "disambiguation pattern must have exactly two capture groups (name, hint), found {}",
                    regex.captures_len() - 1
                ),
                span,
            ));
        }
        Ok(())
    }
}

/// C++ reserved keywords that cannot be used as identifiers
pub(crate) const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char16_t", "char32_t", "class", "compl", "const", "constexpr",
    "const_cast", "continue", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
    "reinterpret_cast", "return", "short", "signed", "sizeof", "static", "static_assert",
    "static_cast", "struct", "switch", "template", "this", "thread_local", "throw", "true", "try",
    "typedef", "typeid", "typename", "union", "unsigned", "using", "virtual", "void", "volatile",
    "wchar_t", "while", "xor", "xor_eq",
];

/// Check if a name is a C++ reserved keyword
pub(crate) fn is_cpp_keyword(name: &str) -> bool {
    CPP_KEYWORDS.contains(&name)
}

/// Find the span of a value in the TOML source, inside double or single
/// quotes (`class = "Manager"`, `["Create", "Get"]`).
pub(crate) fn find_value_span(src: &str, value: &str) -> Option<SourceSpan> {
    if value.is_empty() {
        return None;
    }

    for quote in ['"', '\''] {
        let pattern = format!("{quote}{value}{quote}");
        if let Some(pos) = src.find(&pattern) {
            // +1 to skip the opening quote
            return Some(SourceSpan::from((pos + 1, value.len())));
        }
    }

    // Conversion keys appear unquoted: `{ RemoteValueID = "..." }`
    let key_patterns = [format!("{{ {} =", value), format!(", {} =", value)];
    for pattern in &key_patterns {
        if let Some(pos) = src.find(pattern.as_str()) {
            return Some(SourceSpan::from((pos + 2, value.len())));
        }
    }

    // No fallback - better to have no span than point to wrong location
    None
}

/// Validate that a name is a valid C++ identifier
/// Returns None if valid, Some(reason) if invalid
pub(crate) fn validate_identifier(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();

    // First character must be a letter or underscore
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        Some(_) => return Some("name must start with a letter or underscore"),
        None => return Some("name cannot be empty"),
    }

    if chars.any(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
        return Some("name must contain only letters, numbers, and underscores");
    }

    None
}

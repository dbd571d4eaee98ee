//! Line builder for indented C++ fragments.

use super::Indent;

/// Fluent API for building code with proper indentation.
///
/// Supports both consuming methods (returning `Self`) for chaining and
/// mutable methods (returning `&mut Self`) for loops.
///
/// # Example
///
/// ```
/// use bridgegen_codegen::builder::{CodeBuilder, Indent};
///
/// let code = CodeBuilder::new(Indent::Tab)
///     .line("void WriteConfig_callback() {")
///     .indent()
///     .line("// FIXME: fill in the blanks (sorry!)")
///     .dedent()
///     .line("}")
///     .build();
///
/// assert_eq!(code, "void WriteConfig_callback() {\n\t// FIXME: fill in the blanks (sorry!)\n}\n");
/// ```
#[derive(Debug, Clone)]
pub struct CodeBuilder {
    indent_level: usize,
    indent: Indent,
    buffer: String,
}

impl CodeBuilder {
    pub fn new(indent: Indent) -> Self {
        Self {
            indent_level: 0,
            indent,
            buffer: String::new(),
        }
    }

    /// Start at the given indent level, for text spliced into existing code.
    pub fn at_level(indent: Indent, level: usize) -> Self {
        Self {
            indent_level: level,
            ..Self::new(indent)
        }
    }

    /// Add a line of code with current indentation (mutable).
    pub fn push_line(&mut self, s: &str) -> &mut Self {
        self.write_indent();
        self.buffer.push_str(s);
        self.buffer.push('\n');
        self
    }

    /// Add a blank line (mutable).
    pub fn push_blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    /// Add raw text without indentation or newline (mutable).
    pub fn push_raw(&mut self, s: &str) -> &mut Self {
        self.buffer.push_str(s);
        self
    }

    pub fn push_indent(&mut self) -> &mut Self {
        self.indent_level += 1;
        self
    }

    pub fn push_dedent(&mut self) -> &mut Self {
        self.indent_level = self.indent_level.saturating_sub(1);
        self
    }

    pub fn line(mut self, s: &str) -> Self {
        self.push_line(s);
        self
    }

    pub fn blank(mut self) -> Self {
        self.push_blank();
        self
    }

    pub fn raw(mut self, s: &str) -> Self {
        self.push_raw(s);
        self
    }

    pub fn indent(mut self) -> Self {
        self.push_indent();
        self
    }

    pub fn dedent(mut self) -> Self {
        self.push_dedent();
        self
    }

    /// Consume the builder and return the generated text.
    pub fn build(self) -> String {
        self.buffer
    }

    fn write_indent(&mut self) {
        let unit = self.indent.unit();
        for _ in 0..self.indent_level {
            self.buffer.push_str(&unit);
        }
    }
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::new(Indent::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutable_api() {
        let mut builder = CodeBuilder::new(Indent::Spaces(2));
        builder
            .push_line("if (x) {")
            .push_indent()
            .push_line("y();")
            .push_dedent()
            .push_line("}");
        assert_eq!(builder.build(), "if (x) {\n  y();\n}\n");
    }

    #[test]
    fn test_at_level() {
        let code = CodeBuilder::at_level(Indent::Tab, 1)
            .line("mgr->WriteConfig(_homeId);")
            .raw("\t")
            .build();
        assert_eq!(code, "\tmgr->WriteConfig(_homeId);\n\t");
    }

    #[test]
    fn test_blank_has_no_indent() {
        let code = CodeBuilder::at_level(Indent::Tab, 2).blank().build();
        assert_eq!(code, "\n");
    }

    #[test]
    fn test_dedent_saturates() {
        let code = CodeBuilder::default().dedent().line("x").build();
        assert_eq!(code, "x\n");
    }
}

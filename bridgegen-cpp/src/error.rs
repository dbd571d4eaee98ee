use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for front-end operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Pairs a file's text with its display name so lexer, preprocessor and
/// parser errors can all point at the offending bytes.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    pub fn unterminated_comment(&self, span: impl Into<SourceSpan>) -> Box<Error> {
        Box::new(Error::UnterminatedComment {
            src: self.named_source(),
            span: span.into(),
        })
    }

    pub fn unterminated_literal(
        &self,
        what: &'static str,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::UnterminatedLiteral {
            src: self.named_source(),
            span: span.into(),
            what,
        })
    }

    pub fn unbalanced(
        &self,
        delimiter: impl Into<String>,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Unbalanced {
            src: self.named_source(),
            span: span.into(),
            delimiter: delimiter.into(),
        })
    }

    pub fn unexpected(&self, token: impl Into<String>, span: impl Into<SourceSpan>) -> Box<Error> {
        Box::new(Error::Unexpected {
            src: self.named_source(),
            span: span.into(),
            token: token.into(),
        })
    }

    pub fn unterminated_conditional(
        &self,
        directive: impl Into<String>,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::UnterminatedConditional {
            src: self.named_source(),
            span: span.into(),
            directive: directive.into(),
        })
    }

    pub fn dangling_directive(
        &self,
        directive: impl Into<String>,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::DanglingDirective {
            src: self.named_source(),
            span: span.into(),
            directive: directive.into(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(
        code(bridgegen::cpp::io),
        help("check --ozwroot / --thriftroot and the [sources] section of bridge.toml")
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unterminated comment")]
    #[diagnostic(code(bridgegen::cpp::unterminated_comment))]
    UnterminatedComment {
        #[source_code]
        src: NamedSource<String>,
        #[label("comment starts here")]
        span: SourceSpan,
    },

    #[error("unterminated {what} literal")]
    #[diagnostic(code(bridgegen::cpp::unterminated_literal))]
    UnterminatedLiteral {
        #[source_code]
        src: NamedSource<String>,
        #[label("literal starts here")]
        span: SourceSpan,
        what: &'static str,
    },

    #[error("unbalanced '{delimiter}'")]
    #[diagnostic(code(bridgegen::cpp::unbalanced))]
    Unbalanced {
        #[source_code]
        src: NamedSource<String>,
        #[label("never closed")]
        span: SourceSpan,
        delimiter: String,
    },

    #[error("unexpected '{token}'")]
    #[diagnostic(code(bridgegen::cpp::unexpected))]
    Unexpected {
        #[source_code]
        src: NamedSource<String>,
        #[label("no matching opening delimiter")]
        span: SourceSpan,
        token: String,
    },

    #[error("unterminated #{directive}")]
    #[diagnostic(
        code(bridgegen::cpp::unterminated_conditional),
        help("every #if, #ifdef and #ifndef needs a matching #endif")
    )]
    UnterminatedConditional {
        #[source_code]
        src: NamedSource<String>,
        #[label("opened here")]
        span: SourceSpan,
        directive: String,
    },

    #[error("#{directive} without matching #if")]
    #[diagnostic(code(bridgegen::cpp::dangling_directive))]
    DanglingDirective {
        #[source_code]
        src: NamedSource<String>,
        #[label("no open conditional")]
        span: SourceSpan,
        directive: String,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Box<Self> {
        Box::new(Error::Io {
            path: path.into(),
            source,
        })
    }
}

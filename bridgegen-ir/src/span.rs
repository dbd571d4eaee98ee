//! Source locations.

use std::{ops::Range, path::PathBuf};

use serde::Serialize;

/// Index of a file inside a [`SymbolTable`](crate::SymbolTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(pub u32);

/// A parsed source file with its raw text.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    pub id: FileId,
    pub path: PathBuf,
    #[serde(skip)]
    pub text: String,
}

impl SourceFile {
    /// Byte offset of the first character of the given 1-based line.
    ///
    /// Lines past the end of the file map to the file length.
    pub fn line_start(&self, line: usize) -> usize {
        if line <= 1 {
            return 0;
        }
        self.text
            .match_indices('\n')
            .nth(line - 2)
            .map(|(idx, _)| idx + 1)
            .unwrap_or(self.text.len())
    }

    /// Byte offset of the start of the line containing `offset`.
    pub fn line_start_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.text.len());
        self.text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }
}

/// A byte range inside one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub file: FileId,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(file: FileId, start: usize, end: usize) -> Self {
        Self { file, start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The braces delimiting a function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BodySpan {
    /// The opening `{`.
    pub open: Span,
    /// The closing `}`.
    pub close: Span,
}

impl BodySpan {
    /// The text strictly between the two braces.
    pub fn inner(&self) -> Span {
        Span::new(self.open.file, self.open.end, self.close.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(text: &str) -> SourceFile {
        SourceFile {
            id: FileId(0),
            path: PathBuf::from("test.cpp"),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_line_start() {
        let f = file("one\ntwo\nthree\n");
        assert_eq!(f.line_start(1), 0);
        assert_eq!(f.line_start(2), 4);
        assert_eq!(f.line_start(3), 8);
        assert_eq!(f.line_start(10), f.text.len());
    }

    #[test]
    fn test_line_start_of() {
        let f = file("one\ntwo\nthree\n");
        assert_eq!(f.line_start_of(0), 0);
        assert_eq!(f.line_start_of(6), 4);
        assert_eq!(f.line_start_of(8), 8);
    }

    #[test]
    fn test_body_inner() {
        let body = BodySpan {
            open: Span::new(FileId(0), 10, 11),
            close: Span::new(FileId(0), 40, 41),
        };
        assert_eq!(body.inner().range(), 11..40);
    }
}

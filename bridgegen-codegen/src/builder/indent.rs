//! Indentation configuration for generated C++.

use bridgegen_manifest::{Emit, IndentStyle};

/// Indentation style for generated statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indent {
    /// Spaces with the specified width.
    Spaces(u8),
    /// Tab character, as the Thrift skeleton uses.
    #[default]
    Tab,
}

impl Indent {
    /// One indent level.
    pub fn unit(&self) -> String {
        match self {
            Self::Spaces(width) => " ".repeat(usize::from(*width)),
            Self::Tab => "\t".to_string(),
        }
    }
}

impl From<&Emit> for Indent {
    fn from(emit: &Emit) -> Self {
        match emit.indent {
            IndentStyle::Tab => Self::Tab,
            IndentStyle::Spaces => Self::Spaces(u8::try_from(emit.indent_width).unwrap_or(u8::MAX)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit() {
        assert_eq!(Indent::Spaces(2).unit(), "  ");
        assert_eq!(Indent::Tab.unit(), "\t");
        assert_eq!(Indent::default(), Indent::Tab);
    }

    #[test]
    fn test_from_emit() {
        let emit = Emit {
            indent: IndentStyle::Spaces,
            indent_width: 3,
            ..Emit::default()
        };
        assert_eq!(Indent::from(&emit), Indent::Spaces(3));
        assert_eq!(Indent::from(&Emit::default()), Indent::Tab);
    }
}

use std::fmt;

use berry_common::diagnostic::Category;
use berry_common::error::LexError;
use berry_common::span::Span;

/// A fatal error that stops parsing of the current file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Malformed token.
    Lexical,
    /// Well-formed tokens in an invalid arrangement, or a literal whose
    /// value cannot be represented.
    Syntax,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::Syntax,
            message: message.into(),
            span,
        }
    }

    pub fn category(&self) -> Category {
        match self.kind {
            ParseErrorKind::Lexical => Category::Lexical,
            ParseErrorKind::Syntax => Category::Syntax,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            kind: ParseErrorKind::Lexical,
            message: err.kind.to_string(),
            span: err.span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

use std::fmt;

use serde::Serialize;

use crate::span::Span;

/// A lexer error with location information.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The specific kind of lexer error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LexErrorKind {
    /// A character that starts no token.
    UnknownCharacter(char),
    /// A string literal was not closed before end of input.
    UnterminatedString,
    /// A string literal ran into a line break.
    NewlineInString,
    /// A rune literal was not closed before end of input.
    UnterminatedRune,
    /// `''`
    EmptyRune,
    /// More than one character between rune quotes.
    MultiCharRune,
    /// A backslash followed by an unsupported escape code.
    InvalidEscape(char),
    /// A backslash at end of input.
    MissingEscape,
    /// A number literal that ended where a digit was required.
    ExpectedDigit,
    /// A second `.` in a float literal.
    MultipleDecimalPoints,
    /// A second exponent in a float literal.
    MultipleExponents,
    /// A `.` after the exponent of a float literal.
    DecimalInExponent,
    /// `/*` with no closing `*/`.
    UnterminatedBlockComment,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCharacter(c) => write!(f, "unknown character: {c:?}"),
            Self::UnterminatedString => write!(f, "unclosed string literal"),
            Self::NewlineInString => write!(f, "string literal contains new line"),
            Self::UnterminatedRune => write!(f, "unclosed rune literal"),
            Self::EmptyRune => write!(f, "empty rune literal"),
            Self::MultiCharRune => write!(f, "rune literal contains multiple characters"),
            Self::InvalidEscape(c) => write!(f, "invalid escape code: \\{c}"),
            Self::MissingEscape => write!(f, "expected escape code"),
            Self::ExpectedDigit => write!(f, "expected digit"),
            Self::MultipleDecimalPoints => write!(f, "multiple decimals in float literal"),
            Self::MultipleExponents => write!(f, "multiple exponents in float literal"),
            Self::DecimalInExponent => write!(f, "decimal point in exponent"),
            Self::UnterminatedBlockComment => write!(f, "unclosed block comment"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LexError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = LexError::new(LexErrorKind::UnknownCharacter('$'), Span::new(0, 1));
        assert_eq!(err.to_string(), "unknown character: '$'");
    }

    #[test]
    fn rune_errors_display() {
        assert_eq!(LexErrorKind::EmptyRune.to_string(), "empty rune literal");
        assert_eq!(
            LexErrorKind::MultiCharRune.to_string(),
            "rune literal contains multiple characters"
        );
        assert_eq!(
            LexErrorKind::InvalidEscape('q').to_string(),
            "invalid escape code: \\q"
        );
    }
}

use std::fmt;

use serde::Serialize;

use crate::error::LexErrorKind;
use crate::span::Span;

/// A token produced by the Berry lexer. Token text is recovered by slicing
/// the source with `span`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

/// Every kind of token in the Berry language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    // ── Keywords ───────────────────────────────────────────────────────
    Func,
    Let,
    As,
    Null,
    Const,
    True,
    False,

    // ── Primitive type names ───────────────────────────────────────────
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Bool,

    // ── Operators ──────────────────────────────────────────────────────
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `=`
    Eq,

    // ── Delimiters ─────────────────────────────────────────────────────
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Semicolon,
    Colon,
    At,

    // ── Literals & identifiers ─────────────────────────────────────────
    Ident,
    IntLiteral,
    FloatLiteral,
    RuneLiteral,
    StringLiteral,

    // ── Special ────────────────────────────────────────────────────────
    /// Malformed input. The lexer stops after producing one of these.
    Error(LexErrorKind),
    Eof,
}

impl TokenKind {
    /// Human-readable description used in "unexpected token" messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Func => "'func'",
            TokenKind::Let => "'let'",
            TokenKind::As => "'as'",
            TokenKind::Null => "'null'",
            TokenKind::Const => "'const'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::I8 => "'i8'",
            TokenKind::U8 => "'u8'",
            TokenKind::I16 => "'i16'",
            TokenKind::U16 => "'u16'",
            TokenKind::I32 => "'i32'",
            TokenKind::U32 => "'u32'",
            TokenKind::I64 => "'i64'",
            TokenKind::U64 => "'u64'",
            TokenKind::F32 => "'f32'",
            TokenKind::F64 => "'f64'",
            TokenKind::Bool => "'bool'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::Eq => "'='",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::At => "'@'",
            TokenKind::Ident => "identifier",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::RuneLiteral => "rune literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Error(_) => "invalid token",
            TokenKind::Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Map an identifier-shaped word to its keyword token, if it is one.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s {
        "func" => Some(TokenKind::Func),
        "let" => Some(TokenKind::Let),
        "as" => Some(TokenKind::As),
        "null" => Some(TokenKind::Null),
        "const" => Some(TokenKind::Const),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "i8" => Some(TokenKind::I8),
        "u8" => Some(TokenKind::U8),
        "i16" => Some(TokenKind::I16),
        "u16" => Some(TokenKind::U16),
        "i32" => Some(TokenKind::I32),
        "u32" => Some(TokenKind::U32),
        "i64" => Some(TokenKind::I64),
        "u64" => Some(TokenKind::U64),
        "f32" => Some(TokenKind::F32),
        "f64" => Some(TokenKind::F64),
        "bool" => Some(TokenKind::Bool),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_resolve() {
        assert_eq!(keyword_from_str("func"), Some(TokenKind::Func));
        assert_eq!(keyword_from_str("u64"), Some(TokenKind::U64));
        assert_eq!(keyword_from_str("false"), Some(TokenKind::False));
    }

    #[test]
    fn non_keywords_are_none() {
        assert_eq!(keyword_from_str("fn"), None);
        assert_eq!(keyword_from_str("i128"), None);
        assert_eq!(keyword_from_str("Func"), None);
    }

    #[test]
    fn describe_quotes_punctuation() {
        assert_eq!(TokenKind::Semicolon.to_string(), "';'");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }
}

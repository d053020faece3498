//! Parser state and token-level helpers.
//!
//! The grammar itself lives in the submodules:
//! - [`items`]: definitions, metadata, blocks and statements
//! - [`types`]: type labels
//! - [`expressions`]: precedence-climbing expression parser

mod expressions;
mod items;
mod types;

use berry_common::diagnostic::{Category, Diagnostic, Reporter};
use berry_common::error::LexError;
use berry_common::source::SourceFile;
use berry_common::span::Span;
use berry_common::token::{Token, TokenKind};
use berry_common::ty::Ty;
use berry_lexer::Lexer;

use crate::error::ParseError;
use crate::module::Module;
use crate::symbol::{Symbol, SymbolId, SymbolKind};

pub(crate) type PResult<T> = Result<T, ParseError>;

pub(crate) struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    /// End offset of the most recently consumed token.
    prev_end: u32,
    file: &'a SourceFile,
    module: &'a mut Module,
    reporter: &'a Reporter,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(module: &'a mut Module, file: &'a SourceFile, reporter: &'a Reporter) -> Self {
        Self {
            tokens: Lexer::tokenize(&file.text),
            pos: 0,
            prev_end: 0,
            file,
            module,
            reporter,
        }
    }

    /// Parse every top-level definition in the file.
    pub(crate) fn parse_defs(mut self) -> PResult<()> {
        while !self.at(&TokenKind::Eof) {
            items::parse_def(&mut self)?;
        }
        Ok(())
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    fn token(&self) -> &Token {
        // The lexer always ends the stream with Eof; stay on it.
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    pub(crate) fn current(&self) -> &TokenKind {
        &self.token().kind
    }

    pub(crate) fn current_span(&self) -> Span {
        self.token().span
    }

    pub(crate) fn at(&self, kind: &TokenKind) -> bool {
        self.current() == kind
    }

    /// Source text of a span in this file.
    pub(crate) fn text(&self, span: Span) -> &'a str {
        self.file.slice(span)
    }

    // ── Consumption ────────────────────────────────────────────────────

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.token().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        self.prev_end = token.span.end;
        token
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of `kind` or fail with a syntax error.
    pub(crate) fn expect(&mut self, kind: &TokenKind) -> PResult<Token> {
        if self.at(kind) {
            return Ok(self.advance());
        }
        match self.current() {
            TokenKind::Error(_) | TokenKind::Eof => Err(self.unexpected()),
            _ => Err(ParseError::new(
                format!(
                    "expected {}, found '{}'",
                    kind.describe(),
                    self.text(self.current_span())
                ),
                self.current_span(),
            )),
        }
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: Span) -> Span {
        Span::new(start.start, self.prev_end.max(start.end))
    }

    // ── Errors ─────────────────────────────────────────────────────────

    /// Error for a token that cannot start or continue the current rule.
    pub(crate) fn unexpected(&self) -> ParseError {
        let span = self.current_span();
        match self.current() {
            TokenKind::Error(kind) => LexError::new(kind.clone(), span).into(),
            TokenKind::Eof => ParseError::new("unexpected end of file", span),
            _ => ParseError::new(format!("unexpected token: {}", self.text(span)), span),
        }
    }

    /// Report a non-fatal problem; parsing continues.
    pub(crate) fn report(&self, category: Category, message: impl Into<String>, span: Span) {
        self.reporter.report(Diagnostic::new(
            category,
            message,
            &self.module.name,
            self.file,
            span,
        ));
    }

    // ── Symbols ────────────────────────────────────────────────────────

    pub(crate) fn alloc_symbol(
        &mut self,
        name_tok: &Token,
        kind: SymbolKind,
        ty: Option<Ty>,
        mutable: bool,
    ) -> SymbolId {
        let name = self.text(name_tok.span).to_string();
        self.module.symbols.alloc(Symbol {
            name,
            file: self.file.id,
            span: name_tok.span,
            kind,
            ty,
            mutable,
        })
    }

    /// Bind a symbol in the global table. A clash is reported and leaves
    /// the existing binding in place.
    pub(crate) fn declare_global(&mut self, id: SymbolId) -> bool {
        let symbol = &self.module.symbols[id];
        let (name, span) = (symbol.name.clone(), symbol.span);
        match self.module.declare_global(&name, id) {
            Ok(()) => true,
            Err(_) => {
                self.report(
                    Category::Name,
                    format!("multiple symbols with name '{name}' defined in same scope"),
                    span,
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use berry_common::source::FileId;

    fn with_parser<R>(src: &str, f: impl FnOnce(&mut Parser) -> R) -> R {
        let mut module = Module::new("main");
        let file = SourceFile::new(FileId(0), "test.berry", src);
        let reporter = Reporter::new();
        let mut p = Parser::new(&mut module, &file, &reporter);
        f(&mut p)
    }

    #[test]
    fn advance_stops_at_eof() {
        with_parser("x", |p| {
            assert_eq!(p.advance().kind, TokenKind::Ident);
            assert_eq!(p.advance().kind, TokenKind::Eof);
            assert_eq!(p.advance().kind, TokenKind::Eof);
            assert!(p.at(&TokenKind::Eof));
        });
    }

    #[test]
    fn expect_reports_found_text() {
        with_parser("let x", |p| {
            let err = p.expect(&TokenKind::Func).unwrap_err();
            assert_eq!(err.message, "expected 'func', found 'let'");
            assert_eq!(err.span, Span::new(0, 3));
        });
    }

    #[test]
    fn unexpected_surfaces_lex_errors() {
        with_parser("$", |p| {
            let err = p.unexpected();
            assert_eq!(err.message, "unknown character: '$'");
            assert_eq!(err.category(), Category::Lexical);
        });
    }

    #[test]
    fn span_from_covers_consumed_tokens() {
        with_parser("a b c", |p| {
            let start = p.current_span();
            p.advance();
            p.advance();
            assert_eq!(p.span_from(start), Span::new(0, 3));
        });
    }
}

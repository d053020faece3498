// Berry lexer -- tokenizer for the Berry programming language.

mod cursor;

use berry_common::error::LexErrorKind;
use berry_common::token::{keyword_from_str, Token, TokenKind};
use cursor::Cursor;

/// The Berry lexer. Converts source text into a stream of tokens.
///
/// Whitespace and comments are skipped. Malformed input produces a single
/// `TokenKind::Error` token followed by `Eof`; nothing after the error is
/// lexed.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    /// Set once `Eof` (or an error) has been produced.
    finished: bool,
    /// Eof queued behind an error token.
    pending_eof: Option<Token>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            finished: false,
            pending_eof: None,
        }
    }

    /// Tokenize the whole source. The result always ends with `Eof`.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    fn next_token(&mut self) -> Token {
        if let Err(token) = self.skip_trivia() {
            return token;
        }

        let start = self.cursor.pos();
        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match c {
            // ── Single-character tokens ──────────────────────────────────
            '+' => self.single_char_token(TokenKind::Plus, start),
            '-' => self.single_char_token(TokenKind::Minus, start),
            '*' => self.single_char_token(TokenKind::Star, start),
            '/' => self.single_char_token(TokenKind::Slash, start),
            '%' => self.single_char_token(TokenKind::Percent, start),
            '&' => self.single_char_token(TokenKind::Amp, start),
            '|' => self.single_char_token(TokenKind::Pipe, start),
            '^' => self.single_char_token(TokenKind::Caret, start),
            '=' => self.single_char_token(TokenKind::Eq, start),
            '(' => self.single_char_token(TokenKind::LParen, start),
            ')' => self.single_char_token(TokenKind::RParen, start),
            '[' => self.single_char_token(TokenKind::LBracket, start),
            ']' => self.single_char_token(TokenKind::RBracket, start),
            '{' => self.single_char_token(TokenKind::LBrace, start),
            '}' => self.single_char_token(TokenKind::RBrace, start),
            ',' => self.single_char_token(TokenKind::Comma, start),
            '.' => self.single_char_token(TokenKind::Dot, start),
            ';' => self.single_char_token(TokenKind::Semicolon, start),
            ':' => self.single_char_token(TokenKind::Colon, start),
            '@' => self.single_char_token(TokenKind::At, start),

            // ── Literals ─────────────────────────────────────────────────
            '0'..='9' => self.lex_number(start),
            '\'' => self.lex_rune(start),
            '"' => self.lex_string(start),

            // ── Identifiers and keywords ─────────────────────────────────
            c if is_ident_start(c) => self.lex_ident(start),

            _ => {
                self.cursor.advance();
                self.error(LexErrorKind::UnknownCharacter(c), start)
            }
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    fn error(&self, kind: LexErrorKind, start: u32) -> Token {
        Token::new(TokenKind::Error(kind), start, self.cursor.pos())
    }

    /// Skip whitespace, `// line` comments and `/* block */` comments.
    fn skip_trivia(&mut self) -> Result<(), Token> {
        loop {
            self.cursor
                .eat_while(|c| c == ' ' || c == '\t' || c == '\r' || c == '\n');

            match (self.cursor.peek(), self.cursor.peek_next()) {
                (Some('/'), Some('/')) => self.cursor.eat_while(|c| c != '\n'),
                (Some('/'), Some('*')) => {
                    let start = self.cursor.pos();
                    if !self.cursor.skip_block_comment() {
                        return Err(self.error(LexErrorKind::UnterminatedBlockComment, start));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    // ── Number literals ──────────────────────────────────────────────────

    /// Lex an integer or float literal.
    ///
    /// Integers may be decimal or carry a `0b`, `0o`, or `0x` prefix. Floats
    /// are decimal with a fraction and/or an exponent. `_` separators are
    /// allowed anywhere after the first digit.
    fn lex_number(&mut self, start: u32) -> Token {
        if self.cursor.peek() == Some('0') {
            let radix = match self.cursor.peek_next() {
                Some('b') => Some(2),
                Some('o') => Some(8),
                Some('x') => Some(16),
                _ => None,
            };
            if let Some(radix) = radix {
                self.cursor.advance(); // '0'
                self.cursor.advance(); // prefix letter
                return self.lex_radix_digits(radix, start);
            }
        }

        let mut is_float = false;
        let mut has_exp = false;
        let mut expect_digit = false;

        while let Some(c) = self.cursor.peek() {
            match c {
                '0'..='9' => {
                    self.cursor.advance();
                    expect_digit = false;
                }
                '_' => {
                    self.cursor.advance();
                }
                '.' => {
                    if has_exp {
                        self.cursor.advance();
                        return self.error(LexErrorKind::DecimalInExponent, start);
                    }
                    if is_float {
                        self.cursor.advance();
                        return self.error(LexErrorKind::MultipleDecimalPoints, start);
                    }
                    is_float = true;
                    self.cursor.advance();
                }
                'e' | 'E' => {
                    if has_exp {
                        self.cursor.advance();
                        return self.error(LexErrorKind::MultipleExponents, start);
                    }
                    is_float = true;
                    has_exp = true;
                    expect_digit = true;
                    self.cursor.advance();
                    if matches!(self.cursor.peek(), Some('+' | '-')) {
                        self.cursor.advance();
                    }
                }
                _ => break,
            }
        }

        if expect_digit {
            return self.error(LexErrorKind::ExpectedDigit, start);
        }

        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        };
        Token::new(kind, start, self.cursor.pos())
    }

    /// Digits after a `0b`/`0o`/`0x` prefix. At least one digit is required.
    fn lex_radix_digits(&mut self, radix: u32, start: u32) -> Token {
        if !self.cursor.eat_digits(radix) {
            return self.error(LexErrorKind::ExpectedDigit, start);
        }
        Token::new(TokenKind::IntLiteral, start, self.cursor.pos())
    }

    // ── Rune and string literals ─────────────────────────────────────────

    fn lex_rune(&mut self, start: u32) -> Token {
        self.cursor.advance(); // opening '\''

        match self.cursor.peek() {
            None => return self.error(LexErrorKind::UnterminatedRune, start),
            Some('\'') => {
                self.cursor.advance();
                return self.error(LexErrorKind::EmptyRune, start);
            }
            Some('\\') => {
                if let Err(kind) = self.lex_escape() {
                    return self.error(kind, start);
                }
            }
            Some(_) => {
                self.cursor.advance();
            }
        }

        match self.cursor.peek() {
            None => self.error(LexErrorKind::UnterminatedRune, start),
            Some('\'') => {
                self.cursor.advance();
                Token::new(TokenKind::RuneLiteral, start, self.cursor.pos())
            }
            Some(_) => {
                self.cursor.advance();
                self.error(LexErrorKind::MultiCharRune, start)
            }
        }
    }

    fn lex_string(&mut self, start: u32) -> Token {
        self.cursor.advance(); // opening '"'

        loop {
            match self.cursor.peek() {
                None => return self.error(LexErrorKind::UnterminatedString, start),
                Some('\n') => return self.error(LexErrorKind::NewlineInString, start),
                Some('"') => {
                    self.cursor.advance();
                    return Token::new(TokenKind::StringLiteral, start, self.cursor.pos());
                }
                Some('\\') => {
                    if let Err(kind) = self.lex_escape() {
                        return self.error(kind, start);
                    }
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Consume a backslash escape and validate its code.
    fn lex_escape(&mut self) -> Result<(), LexErrorKind> {
        self.cursor.advance(); // '\\'
        let code = self.cursor.advance().ok_or(LexErrorKind::MissingEscape)?;
        if unescape(code).is_some() {
            Ok(())
        } else {
            Err(LexErrorKind::InvalidEscape(code))
        }
    }

    // ── Identifiers and keywords ─────────────────────────────────────────

    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = keyword_from_str(text).unwrap_or(TokenKind::Ident);
        Token::new(kind, start, self.cursor.pos())
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(eof) = self.pending_eof.take() {
            return Some(eof);
        }
        if self.finished {
            return None;
        }

        let token = self.next_token();
        match token.kind {
            TokenKind::Eof => self.finished = true,
            TokenKind::Error(_) => {
                self.finished = true;
                self.pending_eof = Some(Token::new(TokenKind::Eof, token.span.end, token.span.end));
            }
            _ => {}
        }
        Some(token)
    }
}

/// Value of the character following a backslash, if it is a valid escape.
pub fn unescape(code: char) -> Option<char> {
    match code {
        'a' => Some('\u{07}'),
        'b' => Some('\u{08}'),
        'f' => Some('\u{0C}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\u{0B}'),
        '0' => Some('\0'),
        '\'' => Some('\''),
        '"' => Some('"'),
        '\\' => Some('\\'),
        _ => None,
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

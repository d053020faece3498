/// Source iterator for the Berry lexer.
///
/// Hands out characters one at a time while tracking the byte offset of the
/// next one, so token boundaries can go straight into a
/// [`Span`](berry_common::span::Span). Besides the generic peek/advance
/// primitives it knows the two pieces of Berry's lexical grammar that are
/// pure character scans: digit runs with `_` separators and `/* */`
/// comments.
pub struct Cursor<'src> {
    source: &'src str,
    pos: u32,
    chars: std::str::Chars<'src>,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            chars: source.chars(),
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    pub fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next()
    }

    /// Consume the current character.
    ///
    /// Returns the consumed character, or `None` at end of input.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8() as u32;
        Some(c)
    }

    /// Consume the current character if it is `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        let matched = self.peek() == Some(expected);
        if matched {
            self.advance();
        }
        matched
    }

    /// Byte offset of the next character.
    pub fn pos(&self) -> u32 {
        self.pos
    }

    pub fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// Consume a run of `radix` digits and `_` separators.
    ///
    /// Returns whether the run held at least one real digit; `0x__` has
    /// none.
    pub fn eat_digits(&mut self, radix: u32) -> bool {
        let mut saw_digit = false;
        while let Some(c) = self.peek() {
            if c.is_digit(radix) {
                saw_digit = true;
            } else if c != '_' {
                break;
            }
            self.advance();
        }
        saw_digit
    }

    /// Skip a `/* ... */` comment whose opening `/*` is the current input.
    /// Block comments do not nest.
    ///
    /// Returns `false` if input ends before the closing `*/`.
    pub fn skip_block_comment(&mut self) -> bool {
        self.advance();
        self.advance();
        while let Some(c) = self.advance() {
            if c == '*' && self.eat('/') {
                return true;
            }
        }
        false
    }

    /// # Panics
    ///
    /// Panics if `start` or `end` is out of bounds or not on a UTF-8 boundary.
    pub fn slice(&self, start: u32, end: u32) -> &'src str {
        &self.source[start as usize..end as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_advance() {
        let cursor = Cursor::new("ab");
        assert_eq!(cursor.peek(), Some('a'));
        assert_eq!(cursor.peek_next(), Some('b'));
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn positions_are_byte_offsets() {
        let mut cursor = Cursor::new("\u{00E9}a");
        assert_eq!(cursor.advance(), Some('\u{00E9}'));
        assert_eq!(cursor.pos(), 2);
        assert_eq!(cursor.advance(), Some('a'));
        assert_eq!(cursor.pos(), 3);
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.advance(), None);
    }

    #[test]
    fn eat_only_matching() {
        let mut cursor = Cursor::new("*/");
        assert!(!cursor.eat('/'));
        assert!(cursor.eat('*'));
        assert!(cursor.eat('/'));
        assert_eq!(cursor.peek(), None);
    }

    #[test]
    fn digit_runs_with_separators() {
        let mut cursor = Cursor::new("1_000u");
        assert!(cursor.eat_digits(10));
        assert_eq!(cursor.slice(0, cursor.pos()), "1_000");

        let mut cursor = Cursor::new("__g");
        assert!(!cursor.eat_digits(16));
        assert_eq!(cursor.pos(), 2);

        let mut cursor = Cursor::new("1012");
        assert!(cursor.eat_digits(2));
        assert_eq!(cursor.peek(), Some('2'));
    }

    #[test]
    fn block_comments() {
        let mut cursor = Cursor::new("/* a * b **/x");
        assert!(cursor.skip_block_comment());
        assert_eq!(cursor.peek(), Some('x'));

        let mut cursor = Cursor::new("/* /* */ */");
        assert!(cursor.skip_block_comment());
        assert_eq!(cursor.peek(), Some(' '));

        let mut cursor = Cursor::new("/* open *");
        assert!(!cursor.skip_block_comment());
        assert_eq!(cursor.peek(), None);
    }
}

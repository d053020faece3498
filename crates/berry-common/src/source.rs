//! Source file bookkeeping: file identity, display path, text, and the
//! line index used to turn spans into line/column pairs.

use serde::Serialize;

use crate::span::{LineIndex, Span};

/// Identifies one source file within a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FileId(pub u32);

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: FileId,
    /// Path as shown to the user in diagnostics.
    pub display_path: String,
    pub text: String,
    line_index: LineIndex,
}

impl SourceFile {
    pub fn new(id: FileId, display_path: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_index = LineIndex::new(&text);
        Self {
            id,
            display_path: display_path.into(),
            text,
            line_index,
        }
    }

    /// 1-based line and column of the start of `span`.
    pub fn location(&self, span: Span) -> (u32, u32) {
        self.line_index.line_col(span.start)
    }

    /// Source text covered by `span`.
    pub fn slice(&self, span: Span) -> &str {
        &self.text[span.start as usize..span.end as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_and_slice() {
        let file = SourceFile::new(FileId(0), "main.berry", "let x: i32;\nlet y: bool;");
        let span = Span::new(16, 17);
        assert_eq!(file.location(span), (2, 5));
        assert_eq!(file.slice(span), "y");
    }
}

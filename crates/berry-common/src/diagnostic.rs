//! Diagnostics and the shared sink every compiler stage reports into.
//!
//! A [`Reporter`] is created once per compilation run by the driver and
//! passed by reference to the parser and the checker. Overall success is
//! exactly "no diagnostic was reported".

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::source::SourceFile;
use crate::span::Span;

/// Broad class of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Lexical,
    Syntax,
    Name,
    TypeMismatch,
    UnsupportedOperation,
    Cast,
    Arity,
    Inference,
    Metadata,
}

impl Category {
    /// Stable error code for this category.
    pub fn code(self) -> &'static str {
        match self {
            Category::Lexical => "E0001",
            Category::Syntax => "E0002",
            Category::Name => "E0003",
            Category::TypeMismatch => "E0004",
            Category::UnsupportedOperation => "E0005",
            Category::Cast => "E0006",
            Category::Arity => "E0007",
            Category::Inference => "E0008",
            Category::Metadata => "E0009",
        }
    }
}

/// One located error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub category: Category,
    pub message: String,
    /// Name of the module the file belongs to.
    pub module: String,
    pub path: String,
    pub span: Span,
    pub line: u32,
    pub col: u32,
}

impl Diagnostic {
    pub fn new(
        category: Category,
        message: impl Into<String>,
        module: &str,
        file: &SourceFile,
        span: Span,
    ) -> Self {
        let (line, col) = file.location(span);
        Self {
            category,
            message: message.into(),
            module: module.to_string(),
            path: file.display_path.clone(),
            span,
            line,
            col,
        }
    }

    pub fn code(&self) -> &'static str {
        self.category.code()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}:{}:{}: {}",
            self.module, self.path, self.line, self.col, self.message
        )
    }
}

/// Collects diagnostics from every stage of one compilation run.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Mutex<Vec<Diagnostic>>,
    count: AtomicUsize,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        tracing::debug!(code = diagnostic.code(), "{diagnostic}");
        let mut diagnostics = self
            .diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        diagnostics.push(diagnostic);
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn error_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Snapshot of everything reported so far, in report order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileId;

    fn file() -> SourceFile {
        SourceFile::new(FileId(0), "src/main.berry", "func f() {\n  x;\n}\n")
    }

    #[test]
    fn display_uses_module_path_line_col() {
        let d = Diagnostic::new(
            Category::Name,
            "undefined symbol: 'x'",
            "main",
            &file(),
            Span::new(13, 14),
        );
        assert_eq!(d.to_string(), "[main] src/main.berry:2:3: undefined symbol: 'x'");
        assert_eq!(d.code(), "E0003");
    }

    #[test]
    fn reporter_counts_and_keeps_order() {
        let reporter = Reporter::new();
        assert!(!reporter.has_errors());
        let f = file();
        reporter.report(Diagnostic::new(Category::Syntax, "first", "main", &f, Span::point(0)));
        reporter.report(Diagnostic::new(Category::Cast, "second", "main", &f, Span::point(1)));
        assert_eq!(reporter.error_count(), 2);
        let messages: Vec<_> = reporter
            .diagnostics()
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(messages, ["first", "second"]);
    }

    #[test]
    fn reporter_is_shareable_across_threads() {
        let reporter = Reporter::new();
        let f = file();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    reporter.report(Diagnostic::new(Category::Name, "dup", "main", &f, Span::point(0)));
                });
            }
        });
        assert_eq!(reporter.error_count(), 4);
    }
}

//! Rendering of diagnostics for humans and tools.
//!
//! Three formats are supported: ariadne reports with a labelled source
//! excerpt, the one-line `[module] path:line:col: message` form, and one
//! JSON object per diagnostic.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use berry_common::diagnostic::{Category, Diagnostic};

/// How diagnostics are rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiagnosticOptions {
    /// Emit ANSI colors in ariadne output.
    pub color: bool,
    /// Emit JSON instead of ariadne output.
    pub json: bool,
}

impl DiagnosticOptions {
    pub fn colorless() -> Self {
        DiagnosticOptions {
            color: false,
            json: false,
        }
    }

    pub fn json_mode() -> Self {
        DiagnosticOptions {
            color: false,
            json: true,
        }
    }
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        DiagnosticOptions {
            color: true,
            json: false,
        }
    }
}

fn label(category: Category) -> &'static str {
    match category {
        Category::Lexical => "malformed token",
        Category::Syntax => "unexpected here",
        Category::Name => "in this name",
        Category::TypeMismatch => "type does not match",
        Category::UnsupportedOperation => "operation not supported",
        Category::Cast => "cannot be cast",
        Category::Arity => "wrong number of arguments",
        Category::Inference => "type cannot be inferred",
        Category::Metadata => "invalid metadata",
    }
}

fn help(diag: &Diagnostic) -> Option<&'static str> {
    match diag.category {
        Category::Inference if diag.message.contains("untyped null") => {
            Some("cast the null to a concrete type with `as`")
        }
        Category::Inference => Some("add a type label"),
        Category::Cast => Some("only numbers, booleans and pointers to the same type can be cast"),
        _ => None,
    }
}

/// Render `diag` in the format selected by `opts`. `source` is the text of
/// the file the diagnostic points into.
pub fn render_diagnostic(diag: &Diagnostic, source: &str, opts: &DiagnosticOptions) -> String {
    if opts.json {
        return render_json(diag);
    }

    let range = clamp(diag.span.range(), source.len());
    let config = Config::default().with_color(opts.color);
    let mut builder = Report::<Range<usize>>::build(ReportKind::Error, range.clone())
        .with_code(diag.code())
        .with_message(&diag.message)
        .with_config(config)
        .with_label(
            Label::new(range)
                .with_message(label(diag.category))
                .with_color(Color::Red),
        );
    if let Some(help) = help(diag) {
        builder.set_help(help);
    }

    let mut buf = Vec::new();
    match builder.finish().write(Source::from(source), &mut buf) {
        Ok(()) => {
            let rendered = String::from_utf8_lossy(&buf).into_owned();
            format!("{}:{}:{}\n{rendered}", diag.path, diag.line, diag.col)
        }
        Err(err) => {
            tracing::warn!(%err, "ariadne rendering failed");
            render_plain(diag)
        }
    }
}

/// `[module] path:line:col: message`
pub fn render_plain(diag: &Diagnostic) -> String {
    diag.to_string()
}

/// One line of JSON.
pub fn render_json(diag: &Diagnostic) -> String {
    serde_json::json!({
        "code": diag.code(),
        "severity": "error",
        "category": diag.category,
        "message": diag.message,
        "module": diag.module,
        "file": diag.path,
        "line": diag.line,
        "column": diag.col,
        "spans": [{
            "start": diag.span.start,
            "end": diag.span.end,
            "label": label(diag.category),
        }],
    })
    .to_string()
}

/// Keep a range inside the source and at least one byte wide when the
/// source allows it.
fn clamp(range: Range<usize>, len: usize) -> Range<usize> {
    let start = range.start.min(len);
    let end = range.end.min(len).max(start);
    if start == end {
        start..(end + 1).min(len)
    } else {
        start..end
    }
}

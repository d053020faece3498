//! Semantic errors raised while walking a definition.
//!
//! Types are carried pre-rendered: a placeholder only means something while
//! the resolution table that owns it is alive, so the walker describes every
//! type at the moment the error is raised.

use std::fmt;

use berry_common::diagnostic::Category;
use berry_common::span::Span;
use berry_parser::ast::{BinOp, UnaryOp};

#[derive(Clone, Debug, PartialEq)]
pub enum TypeError {
    /// An identifier with no binding in any enclosing scope.
    UndefinedSymbol { name: String, span: Span },

    /// A local or parameter clashing with a name in the same scope.
    DuplicateSymbol { name: String, span: Span },

    /// Operands of a binary operator disagree.
    Mismatch {
        expected: String,
        found: String,
        span: Span,
    },

    /// A value used where another type is required.
    NotConvertible { from: String, to: String, span: Span },

    /// A binary operator applied to operands it does not support.
    BinaryOperator {
        op: BinOp,
        lhs: String,
        rhs: String,
        span: Span,
    },

    /// A unary operator applied to an operand it does not support.
    UnaryOperator {
        op: UnaryOp,
        operand: String,
        span: Span,
    },

    /// Dereference of something that is not a pointer.
    NotAPointer { span: Span },

    InvalidCast { from: String, to: String, span: Span },

    ArityMismatch {
        expected: usize,
        found: usize,
        span: Span,
    },

    /// A placeholder still unresolved at a barrier.
    CannotInfer { what: String, span: Span },

    MissingTypeLabel { span: Span },

    Metadata { message: String, span: Span },
}

impl TypeError {
    pub fn span(&self) -> Span {
        match self {
            TypeError::UndefinedSymbol { span, .. }
            | TypeError::DuplicateSymbol { span, .. }
            | TypeError::Mismatch { span, .. }
            | TypeError::NotConvertible { span, .. }
            | TypeError::BinaryOperator { span, .. }
            | TypeError::UnaryOperator { span, .. }
            | TypeError::NotAPointer { span }
            | TypeError::InvalidCast { span, .. }
            | TypeError::ArityMismatch { span, .. }
            | TypeError::CannotInfer { span, .. }
            | TypeError::MissingTypeLabel { span }
            | TypeError::Metadata { span, .. } => *span,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            TypeError::UndefinedSymbol { .. } | TypeError::DuplicateSymbol { .. } => {
                Category::Name
            }
            TypeError::Mismatch { .. } | TypeError::NotConvertible { .. } => {
                Category::TypeMismatch
            }
            TypeError::BinaryOperator { .. }
            | TypeError::UnaryOperator { .. }
            | TypeError::NotAPointer { .. } => Category::UnsupportedOperation,
            TypeError::InvalidCast { .. } => Category::Cast,
            TypeError::ArityMismatch { .. } => Category::Arity,
            TypeError::CannotInfer { .. } | TypeError::MissingTypeLabel { .. } => {
                Category::Inference
            }
            TypeError::Metadata { .. } => Category::Metadata,
        }
    }

    /// Whether this error ends the walk of the current definition. Operator
    /// errors are recovered from so the enclosing expression keeps a type.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            TypeError::Mismatch { .. }
                | TypeError::BinaryOperator { .. }
                | TypeError::UnaryOperator { .. }
        )
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::UndefinedSymbol { name, .. } => write!(f, "undefined symbol: '{name}'"),
            TypeError::DuplicateSymbol { name, .. } => {
                write!(f, "multiple symbols with name '{name}' defined in same scope")
            }
            TypeError::Mismatch {
                expected, found, ..
            } => write!(f, "type mismatch: {expected} v. {found}"),
            TypeError::NotConvertible { from, to, .. } => {
                write!(f, "{from} cannot be implicitly converted to {to}")
            }
            TypeError::BinaryOperator { op, lhs, rhs, .. } => {
                write!(f, "cannot apply '{op}' to {lhs} and {rhs}")
            }
            TypeError::UnaryOperator { op, operand, .. } => {
                write!(f, "cannot apply '{op}' to type {operand}")
            }
            TypeError::NotAPointer { .. } => write!(f, "expected a pointer"),
            TypeError::InvalidCast { from, to, .. } => {
                write!(f, "cannot cast '{from}' to '{to}'")
            }
            TypeError::ArityMismatch {
                expected, found, ..
            } => write!(f, "expected {expected} parameters, received {found}"),
            TypeError::CannotInfer { what, .. } => write!(f, "unable to infer type of '{what}'"),
            TypeError::MissingTypeLabel { .. } => write!(f, "global variable missing type label"),
            TypeError::Metadata { message, .. } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for TypeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let span = Span::new(0, 1);
        let cases = [
            (
                TypeError::Mismatch {
                    expected: "i32".into(),
                    found: "f64".into(),
                    span,
                },
                "type mismatch: i32 v. f64",
            ),
            (
                TypeError::BinaryOperator {
                    op: BinOp::Add,
                    lhs: "i32".into(),
                    rhs: "bool".into(),
                    span,
                },
                "cannot apply '+' to i32 and bool",
            ),
            (
                TypeError::UnaryOperator {
                    op: UnaryOp::Neg,
                    operand: "bool".into(),
                    span,
                },
                "cannot apply '-' to type bool",
            ),
            (
                TypeError::ArityMismatch {
                    expected: 2,
                    found: 3,
                    span,
                },
                "expected 2 parameters, received 3",
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn only_operator_errors_are_recoverable() {
        let span = Span::new(0, 1);
        assert!(!TypeError::UnaryOperator {
            op: UnaryOp::Neg,
            operand: "bool".into(),
            span,
        }
        .is_fatal());
        assert!(TypeError::NotAPointer { span }.is_fatal());
        assert_eq!(
            TypeError::CannotInfer {
                what: "untyped null".into(),
                span
            }
            .category(),
            Category::Inference
        );
    }
}

//! Typed AST for Berry.
//!
//! The parser builds these nodes with `ty: None` on most expressions; the
//! checker walks them mutably, filling in every expression type and every
//! identifier's symbol binding.

use std::fmt;

use berry_common::source::FileId;
use berry_common::span::Span;
use berry_common::ty::Ty;

use crate::symbol::{SymbolId, SymbolTable};

// ── Definitions ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Def {
    Func(FuncDef),
    GlobalVar(GlobalVar),
}

impl Def {
    pub fn span(&self) -> Span {
        match self {
            Def::Func(f) => f.span,
            Def::GlobalVar(g) => g.span,
        }
    }

    pub fn file(&self) -> FileId {
        match self {
            Def::Func(f) => f.file,
            Def::GlobalVar(g) => g.file,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            Def::Func(f) => &f.metadata,
            Def::GlobalVar(g) => &g.metadata,
        }
    }

    /// The symbol this definition declares.
    pub fn symbol(&self) -> SymbolId {
        match self {
            Def::Func(f) => f.symbol,
            Def::GlobalVar(g) => g.var.symbol,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub file: FileId,
    pub span: Span,
    pub metadata: Metadata,
    pub symbol: SymbolId,
    pub params: Vec<SymbolId>,
    /// `()` when the source omits a return type.
    pub return_ty: Ty,
    /// `None` for a declaration-only function (`func f();`).
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVar {
    pub file: FileId,
    pub span: Span,
    pub metadata: Metadata,
    pub var: LocalVar,
}

// ── Metadata ─────────────────────────────────────────────────────────────

/// A single `@tag` or `@tag("value")`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaTag {
    pub name: String,
    pub name_span: Span,
    pub value: Option<String>,
    pub value_span: Option<Span>,
}

/// Tags attached to a definition, in source order, unique by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    tags: Vec<MetaTag>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag. Returns the tag back when its name is already present.
    pub fn insert(&mut self, tag: MetaTag) -> Result<(), MetaTag> {
        if self.contains(&tag.name) {
            return Err(tag);
        }
        self.tags.push(tag);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&MetaTag> {
        self.tags.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetaTag> {
        self.tags.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

// ── Statements ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub span: Span,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let(LocalVar),
    Expr(Expr),
}

/// `let name (: ty)? (= init)?` -- used for locals and globals alike. The
/// annotation, when present, is already stored on the symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    pub span: Span,
    pub symbol: SymbolId,
    pub init: Option<Expr>,
}

// ── Expressions ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    /// Filled by the checker. `None` on a call through a non-function.
    pub ty: Option<Ty>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            ty: None,
        }
    }

    pub fn typed(kind: ExprKind, span: Span, ty: Ty) -> Self {
        Self {
            kind,
            span,
            ty: Some(ty),
        }
    }

    /// Whether this expression denotes a mutable location.
    ///
    /// A dereference is mutable when its pointer is not `const`; an
    /// identifier is mutable when its symbol is. Everything else is a value.
    /// Only meaningful after checking.
    pub fn is_mutable(&self, symbols: &SymbolTable) -> bool {
        match &self.kind {
            ExprKind::Deref(ptr) => matches!(ptr.ty, Some(Ty::Pointer { is_const: false, .. })),
            ExprKind::Ident {
                symbol: Some(id), ..
            } => symbols[*id].mutable,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    AddrOf(Box<Expr>),
    Deref(Box<Expr>),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Cast {
        expr: Box<Expr>,
        dest: Ty,
    },
    Ident {
        name: String,
        symbol: Option<SymbolId>,
    },
    IntLit(u64),
    FloatLit(f64),
    BoolLit(bool),
    RuneLit(char),
    NullLit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
}

impl BinOp {
    /// `+ - * / %` need numbers; `& | ^` need integers.
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => f.write_str("-"),
        }
    }
}

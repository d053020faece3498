//! The semantic walker.
//!
//! Definitions are walked one at a time: metadata is validated, the body is
//! walked with every expression receiving a type, and at each barrier the
//! pending literal placeholders are defaulted and read back into the AST.
//! The first fatal error ends the current definition; the driver moves on to
//! the next one with a fresh table and empty scopes.

use berry_common::diagnostic::{Diagnostic, Reporter};
use berry_common::source::{FileId, SourceFile};
use berry_common::span::Span;
use berry_common::ty::{Ty, UntypedId, UntypedKind};
use berry_parser::ast::{
    BinOp, Block, Def, Expr, ExprKind, FuncDef, GlobalVar, LocalVar, Stmt, UnaryOp,
};
use berry_parser::symbol::{SymbolId, SymbolTable};
use rustc_hash::FxHashMap;

use crate::compat::{must_cast, must_equal, must_int_type, must_number_type, must_subtype};
use crate::env::ScopeStack;
use crate::error::TypeError;
use crate::meta;
use crate::untyped::UntypedTable;

/// The current definition was abandoned. Its diagnostic is already recorded.
#[derive(Debug)]
pub(crate) struct Abort;

type WalkResult<T = ()> = Result<T, Abort>;

pub(crate) struct Walker<'m> {
    module: &'m str,
    files: &'m [SourceFile],
    symbols: &'m mut SymbolTable,
    scopes: ScopeStack<'m>,
    table: UntypedTable,
    /// Placeholders created since the last barrier, with their literal's span.
    pending: Vec<(UntypedId, Span)>,
    /// File of the definition being walked.
    file: FileId,
    reporter: &'m Reporter,
    errors: Vec<TypeError>,
}

impl<'m> Walker<'m> {
    pub(crate) fn new(
        module: &'m str,
        files: &'m [SourceFile],
        symbols: &'m mut SymbolTable,
        globals: &'m FxHashMap<String, SymbolId>,
        reporter: &'m Reporter,
    ) -> Self {
        Walker {
            module,
            files,
            symbols,
            scopes: ScopeStack::new(globals),
            table: UntypedTable::new(),
            pending: Vec::new(),
            file: FileId(0),
            reporter,
            errors: Vec::new(),
        }
    }

    pub(crate) fn into_errors(self) -> Vec<TypeError> {
        self.errors
    }

    // ── Definitions ────────────────────────────────────────────────────

    pub(crate) fn walk_def(&mut self, def: &mut Def) -> WalkResult {
        self.file = def.file();
        tracing::debug!(name = %self.symbols[def.symbol()].name, "walking definition");

        if let Err(err) = meta::validate(def) {
            return self.fail(err);
        }
        match def {
            Def::Func(func) => self.walk_func(func)?,
            Def::GlobalVar(global) => self.walk_global(global)?,
        }
        self.barrier(None)
    }

    /// Reset per-definition state. Runs after every definition, aborted or
    /// not.
    pub(crate) fn cleanup(&mut self) {
        tracing::trace!(open_frames = self.scopes.depth(), "cleanup");
        self.table.reset();
        self.pending.clear();
        self.scopes.clear();
    }

    fn walk_func(&mut self, func: &mut FuncDef) -> WalkResult {
        self.scopes.push();
        for &param in &func.params {
            self.declare_local(param)?;
        }
        if let Some(body) = &mut func.body {
            self.walk_block(body)?;
        }
        self.scopes.pop();
        Ok(())
    }

    fn walk_global(&mut self, global: &mut GlobalVar) -> WalkResult {
        let id = global.var.symbol;
        let Some(declared) = self.symbols[id].ty.clone() else {
            let span = self.symbols[id].span;
            return self.fail(TypeError::MissingTypeLabel { span });
        };
        if let Some(init) = &mut global.var.init {
            self.walk_expr(init)?;
            self.require_subtype(&declared, init)?;
            self.barrier(Some(init))?;
        }
        Ok(())
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn walk_block(&mut self, block: &mut Block) -> WalkResult {
        self.scopes.push();
        for stmt in &mut block.stmts {
            self.walk_stmt(stmt)?;
        }
        self.scopes.pop();
        Ok(())
    }

    fn walk_stmt(&mut self, stmt: &mut Stmt) -> WalkResult {
        match stmt {
            Stmt::Let(var) => self.walk_local(var),
            Stmt::Expr(expr) => {
                self.walk_expr(expr)?;
                self.barrier(Some(expr))
            }
        }
    }

    /// The binding is declared only after its initializer is walked, so the
    /// initializer cannot see it.
    fn walk_local(&mut self, var: &mut LocalVar) -> WalkResult {
        let id = var.symbol;
        match (self.symbols[id].ty.clone(), var.init.as_mut()) {
            (Some(declared), Some(init)) => {
                self.walk_expr(init)?;
                self.require_subtype(&declared, init)?;
                self.barrier(Some(init))?;
            }
            (Some(_), None) => {}
            (None, Some(init)) => {
                self.walk_expr(init)?;
                self.barrier(Some(&mut *init))?;
                match init.ty.clone() {
                    Some(ty) => {
                        tracing::trace!(name = %self.symbols[id].name, %ty, "inferred");
                        self.symbols[id].ty = Some(ty);
                    }
                    None => {
                        let what = self.symbols[id].name.clone();
                        return self.fail(TypeError::CannotInfer {
                            what,
                            span: init.span,
                        });
                    }
                }
            }
            (None, None) => {
                let symbol = &self.symbols[id];
                let err = TypeError::CannotInfer {
                    what: symbol.name.clone(),
                    span: symbol.span,
                };
                return self.fail(err);
            }
        }
        self.declare_local(id)
    }

    fn declare_local(&mut self, id: SymbolId) -> WalkResult {
        let symbol = &self.symbols[id];
        let (name, span) = (symbol.name.clone(), symbol.span);
        if self.scopes.declare(&name, id).is_err() {
            return self.fail(TypeError::DuplicateSymbol { name, span });
        }
        Ok(())
    }

    // ── Barrier ────────────────────────────────────────────────────────

    /// Default every open placeholder, reject any that is still open, write
    /// the resolved types back into `expr`, and start a fresh table.
    fn barrier(&mut self, expr: Option<&mut Expr>) -> WalkResult {
        self.table.default_all();
        for (id, span) in std::mem::take(&mut self.pending) {
            if self.table.resolve(id).is_none() {
                let what = self.table.describe(&Ty::Untyped(id));
                return self.fail(TypeError::CannotInfer { what, span });
            }
        }
        if let Some(expr) = expr {
            self.zonk_expr(expr);
        }
        tracing::trace!(placeholders = self.table.len(), "barrier");
        self.table.reset();
        Ok(())
    }

    fn zonk_expr(&mut self, expr: &mut Expr) {
        if let Some(ty) = expr.ty.take() {
            expr.ty = Some(self.table.zonk(&ty));
        }
        match &mut expr.kind {
            ExprKind::Binary { lhs, rhs, .. } => {
                self.zonk_expr(lhs);
                self.zonk_expr(rhs);
            }
            ExprKind::Unary { operand: inner, .. }
            | ExprKind::AddrOf(inner)
            | ExprKind::Deref(inner)
            | ExprKind::Cast { expr: inner, .. } => self.zonk_expr(inner),
            ExprKind::Call { callee, args } => {
                self.zonk_expr(callee);
                for arg in args {
                    self.zonk_expr(arg);
                }
            }
            ExprKind::Ident { .. }
            | ExprKind::IntLit(_)
            | ExprKind::FloatLit(_)
            | ExprKind::BoolLit(_)
            | ExprKind::RuneLit(_)
            | ExprKind::NullLit => {}
        }
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn walk_expr(&mut self, expr: &mut Expr) -> WalkResult {
        let span = expr.span;
        let ty = match &mut expr.kind {
            ExprKind::Binary { op, lhs, rhs } => {
                self.walk_expr(lhs)?;
                self.walk_expr(rhs)?;
                self.check_binary(*op, lhs, rhs, span)?
            }
            ExprKind::Unary { op, operand } => {
                self.walk_expr(operand)?;
                self.check_unary(*op, operand)?
            }
            ExprKind::AddrOf(inner) => {
                self.walk_expr(inner)?;
                inner.ty.clone().map(|ty| Ty::pointer(ty, false))
            }
            ExprKind::Deref(ptr) => {
                self.walk_expr(ptr)?;
                Some(self.check_deref(ptr)?)
            }
            ExprKind::Call { callee, args } => {
                self.walk_expr(callee)?;
                for arg in args.iter_mut() {
                    self.walk_expr(arg)?;
                }
                self.check_call(callee, args, span)?
            }
            ExprKind::Cast { expr: src, dest } => {
                self.walk_expr(src)?;
                self.check_cast(src, dest)?;
                Some(dest.clone())
            }
            ExprKind::Ident { name, symbol } => {
                let Some(id) = self.scopes.lookup(name) else {
                    let name = name.clone();
                    return self.fail(TypeError::UndefinedSymbol { name, span });
                };
                *symbol = Some(id);
                self.symbols[id].ty.clone()
            }
            ExprKind::IntLit(_) => Some(self.literal(expr.ty.take(), UntypedKind::Number, span)),
            ExprKind::FloatLit(_) => Some(self.literal(expr.ty.take(), UntypedKind::Float, span)),
            ExprKind::NullLit => Some(self.literal(expr.ty.take(), UntypedKind::Null, span)),
            ExprKind::RuneLit(_) => Some(expr.ty.take().unwrap_or_else(Ty::i32)),
            ExprKind::BoolLit(_) => Some(expr.ty.take().unwrap_or(Ty::Bool)),
        };
        expr.ty = ty;
        Ok(())
    }

    /// Type of a literal: its preassigned type, or a fresh placeholder.
    fn literal(&mut self, preassigned: Option<Ty>, kind: UntypedKind, span: Span) -> Ty {
        preassigned.unwrap_or_else(|| {
            let id = self.table.new_untyped(kind);
            self.pending.push((id, span));
            Ty::Untyped(id)
        })
    }

    /// Operands must agree, then support the operator. Either failure is
    /// reported and the expression takes the left operand's type.
    fn check_binary(
        &mut self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
    ) -> WalkResult<Option<Ty>> {
        let (Some(l), Some(r)) = (&lhs.ty, &rhs.ty) else {
            return Ok(lhs.ty.clone());
        };

        if !must_equal(&mut self.table, l, r) {
            let expected = self.table.describe(l);
            let found = self.table.describe(r);
            self.report(TypeError::Mismatch {
                expected,
                found,
                span,
            })?;
            return Ok(Some(l.clone()));
        }

        let supported = if op.is_arithmetic() {
            must_number_type(&mut self.table, l)
        } else {
            must_int_type(&mut self.table, l)
        };
        if !supported {
            let lhs = self.table.describe(l);
            let rhs = self.table.describe(r);
            self.report(TypeError::BinaryOperator { op, lhs, rhs, span })?;
        }
        Ok(Some(l.clone()))
    }

    /// Reported at the operand, which is what fails to support `op`.
    fn check_unary(&mut self, op: UnaryOp, operand: &Expr) -> WalkResult<Option<Ty>> {
        let Some(ty) = &operand.ty else {
            return Ok(None);
        };
        let supported = match op {
            UnaryOp::Neg => must_number_type(&mut self.table, ty),
        };
        if !supported {
            let describe = self.table.describe(ty);
            self.report(TypeError::UnaryOperator {
                op,
                operand: describe,
                span: operand.span,
            })?;
        }
        Ok(Some(ty.clone()))
    }

    fn check_deref(&mut self, ptr: &Expr) -> WalkResult<Ty> {
        let resolved = ptr.ty.as_ref().map(|ty| self.table.inner(ty));
        match resolved {
            Some(Ty::Pointer { elem, .. }) => Ok(*elem),
            _ => self.fail(TypeError::NotAPointer { span: ptr.span }),
        }
    }

    /// A callee that is not a function gives the call no type.
    fn check_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        span: Span,
    ) -> WalkResult<Option<Ty>> {
        let resolved = callee.ty.as_ref().map(|ty| self.table.inner(ty));
        let Some(Ty::Func { params, ret }) = resolved else {
            tracing::debug!(?span, "call through a non-function");
            return Ok(None);
        };
        if params.len() != args.len() {
            return self.fail(TypeError::ArityMismatch {
                expected: params.len(),
                found: args.len(),
                span,
            });
        }
        for (param, arg) in params.iter().zip(args) {
            self.require_subtype(param, arg)?;
        }
        Ok(Some(*ret))
    }

    fn check_cast(&mut self, src: &Expr, dest: &Ty) -> WalkResult {
        let Some(src_ty) = &src.ty else {
            return Ok(());
        };
        if !must_cast(&mut self.table, dest, src_ty) {
            let from = self.table.describe(src_ty);
            return self.fail(TypeError::InvalidCast {
                from,
                to: dest.to_string(),
                span: src.span,
            });
        }
        Ok(())
    }

    /// `expr` must be usable where `expected` is required. Untyped
    /// expressions are let through; their problem was reported already.
    fn require_subtype(&mut self, expected: &Ty, expr: &Expr) -> WalkResult {
        let Some(found) = &expr.ty else {
            return Ok(());
        };
        if !must_subtype(&mut self.table, expected, found) {
            let from = self.table.describe(found);
            let to = self.table.describe(expected);
            return self.fail(TypeError::NotConvertible {
                from,
                to,
                span: expr.span,
            });
        }
        Ok(())
    }

    // ── Errors ─────────────────────────────────────────────────────────

    /// Record `err`; abort the definition if it is fatal.
    fn report(&mut self, err: TypeError) -> WalkResult {
        let fatal = err.is_fatal();
        let file = &self.files[self.file.0 as usize];
        self.reporter.report(Diagnostic::new(
            err.category(),
            err.to_string(),
            self.module,
            file,
            err.span(),
        ));
        self.errors.push(err);
        if fatal {
            tracing::debug!("aborting definition");
            return Err(Abort);
        }
        Ok(())
    }

    fn fail<T>(&mut self, err: TypeError) -> WalkResult<T> {
        self.report(err)?;
        Err(Abort)
    }
}

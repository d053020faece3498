//! Berry semantic checker.
//!
//! Walks a parsed [`Module`] definition by definition, giving every
//! expression a concrete type. Untyped literals (`5`, `2.0`, `null`) start
//! as placeholders whose type is settled by the surrounding constraints or,
//! failing that, by a per-kind default at the end of each statement.
//!
//! # Architecture
//!
//! - [`untyped`]: union-find resolution table for literal placeholders
//! - [`compat`]: equality, implicit conversion and cast rules
//! - [`env`]: lexical scope stack
//! - [`meta`]: metadata tag validation
//! - [`error`]: semantic error type
//! - [`diagnostics`]: ariadne, plain and JSON rendering

pub mod compat;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod meta;
pub mod untyped;
mod walker;

use berry_common::diagnostic::Reporter;
use berry_parser::symbol::SymbolId;
use berry_parser::Module;

use crate::error::TypeError;
use crate::walker::Walker;

/// Outcome of checking a module.
#[derive(Debug, Default)]
pub struct TypeckResult {
    /// Every semantic error, in the order found. Each one was also reported.
    pub errors: Vec<TypeError>,
    /// Definitions abandoned after a fatal error, by declared symbol.
    pub aborted: Vec<SymbolId>,
}

impl TypeckResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check every definition of `module`, mutating its AST and symbols in
/// place. A fatal error abandons only the definition it occurs in.
pub fn check(module: &mut Module, reporter: &Reporter) -> TypeckResult {
    let Module {
        name,
        files,
        defs,
        symbols,
        globals,
    } = module;
    tracing::debug!(module = %name, defs = defs.len(), "checking module");

    let mut walker = Walker::new(name, files, symbols, globals, reporter);
    let mut aborted = Vec::new();
    for def in defs.iter_mut() {
        if walker.walk_def(def).is_err() {
            aborted.push(def.symbol());
        }
        walker.cleanup();
    }

    TypeckResult {
        errors: walker.into_errors(),
        aborted,
    }
}

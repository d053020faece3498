//! Top-level definitions, metadata, blocks and statements.

use berry_common::diagnostic::Category;
use berry_common::token::TokenKind;
use berry_common::ty::Ty;

use crate::ast::{Block, Def, FuncDef, GlobalVar, LocalVar, MetaTag, Metadata, Stmt};
use crate::symbol::{SymbolId, SymbolKind};

use super::expressions::parse_expr;
use super::types::parse_type_label;
use super::{PResult, Parser};

/// `metadata? (func_def | global_var)`
///
/// The definition is declared in the global table; it is only queued for
/// checking when both its name and its metadata tags were unique.
pub(super) fn parse_def(p: &mut Parser) -> PResult<()> {
    let (metadata, tags_unique) = if p.at(&TokenKind::At) {
        parse_metadata(p)?
    } else {
        (Metadata::new(), true)
    };

    let def = match p.current() {
        TokenKind::Func => parse_func_def(p, metadata)?,
        TokenKind::Let => parse_global_var(p, metadata)?,
        _ => return Err(p.unexpected()),
    };

    let declared = p.declare_global(def.symbol());
    if declared && tags_unique {
        p.module.defs.push(def);
    } else {
        tracing::debug!(symbol = ?def.symbol(), "dropping rejected definition");
    }
    Ok(())
}

// ── Metadata ─────────────────────────────────────────────────────────────

/// `'@' tag | '@' '[' tag (',' tag)* ']'`
///
/// Returns the tags and whether every tag name was unique.
fn parse_metadata(p: &mut Parser) -> PResult<(Metadata, bool)> {
    p.expect(&TokenKind::At)?;
    let mut meta = Metadata::new();
    let mut unique = true;

    if p.eat(&TokenKind::LBracket) {
        loop {
            unique &= parse_meta_tag(p, &mut meta)?;
            if !p.eat(&TokenKind::Comma) {
                break;
            }
        }
        p.expect(&TokenKind::RBracket)?;
    } else {
        unique &= parse_meta_tag(p, &mut meta)?;
    }

    Ok((meta, unique))
}

/// `IDENT ('(' STRING ')')?`
fn parse_meta_tag(p: &mut Parser, meta: &mut Metadata) -> PResult<bool> {
    let name_tok = p.expect(&TokenKind::Ident)?;
    let mut tag = MetaTag {
        name: p.text(name_tok.span).to_string(),
        name_span: name_tok.span,
        value: None,
        value_span: None,
    };

    if p.eat(&TokenKind::LParen) {
        let value_tok = p.expect(&TokenKind::StringLiteral)?;
        p.expect(&TokenKind::RParen)?;
        tag.value = Some(decode_string(p.text(value_tok.span)));
        tag.value_span = Some(value_tok.span);
    }

    match meta.insert(tag) {
        Ok(()) => Ok(true),
        Err(dup) => {
            p.report(
                Category::Metadata,
                "multiple meta tags with same name",
                dup.name_span,
            );
            Ok(false)
        }
    }
}

/// Strip the quotes of a lexed string literal and resolve its escapes.
fn decode_string(literal: &str) -> String {
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(esc) = chars.next().and_then(berry_lexer::unescape) {
                out.push(esc);
            }
        } else {
            out.push(c);
        }
    }
    out
}

// ── Functions ────────────────────────────────────────────────────────────

/// `'func' IDENT '(' params? ')' type? (block | ';')`
fn parse_func_def(p: &mut Parser, metadata: Metadata) -> PResult<Def> {
    let start = p.expect(&TokenKind::Func)?.span;
    let name_tok = p.expect(&TokenKind::Ident)?;

    p.expect(&TokenKind::LParen)?;
    let params = if p.at(&TokenKind::RParen) {
        Vec::new()
    } else {
        parse_params(p)?
    };
    p.expect(&TokenKind::RParen)?;

    let return_ty = if p.at(&TokenKind::Semicolon) || p.at(&TokenKind::LBrace) {
        Ty::Unit
    } else {
        parse_type_label(p)?
    };

    let body = match p.current() {
        TokenKind::Semicolon => {
            p.advance();
            None
        }
        TokenKind::LBrace => Some(parse_block(p)?),
        _ => return Err(p.unexpected()),
    };

    let func_ty = Ty::func(
        params.iter().map(|(_, ty)| ty.clone()).collect(),
        return_ty.clone(),
    );
    let symbol = p.alloc_symbol(&name_tok, SymbolKind::Function, Some(func_ty), false);

    Ok(Def::Func(FuncDef {
        file: p.file.id,
        span: p.span_from(start),
        metadata,
        symbol,
        params: params.into_iter().map(|(id, _)| id).collect(),
        return_ty,
        body,
    }))
}

/// Parameter groups: `a, b: i32, c: f64`. Every name in a group shares the
/// group's type.
fn parse_params(p: &mut Parser) -> PResult<Vec<(SymbolId, Ty)>> {
    let mut params = Vec::new();
    loop {
        let mut names = vec![p.expect(&TokenKind::Ident)?];
        while p.eat(&TokenKind::Comma) {
            names.push(p.expect(&TokenKind::Ident)?);
        }
        p.expect(&TokenKind::Colon)?;
        let ty = parse_type_label(p)?;

        for name in &names {
            let id = p.alloc_symbol(name, SymbolKind::Value, Some(ty.clone()), true);
            params.push((id, ty.clone()));
        }

        if !p.eat(&TokenKind::Comma) {
            break;
        }
    }
    Ok(params)
}

// ── Variables ────────────────────────────────────────────────────────────

/// `var_decl ';'` at file scope.
fn parse_global_var(p: &mut Parser, metadata: Metadata) -> PResult<Def> {
    let var = parse_var_decl(p)?;
    p.expect(&TokenKind::Semicolon)?;
    Ok(Def::GlobalVar(GlobalVar {
        file: p.file.id,
        span: var.span,
        metadata,
        var,
    }))
}

/// `'let' IDENT (':' type)? ('=' expr)?` -- the initializer is mandatory
/// when the type is omitted.
fn parse_var_decl(p: &mut Parser) -> PResult<LocalVar> {
    let start = p.expect(&TokenKind::Let)?.span;
    let name_tok = p.expect(&TokenKind::Ident)?;

    let ty = if p.eat(&TokenKind::Colon) {
        Some(parse_type_label(p)?)
    } else {
        None
    };

    let init = if ty.is_none() || p.at(&TokenKind::Eq) {
        p.expect(&TokenKind::Eq)?;
        Some(parse_expr(p)?)
    } else {
        None
    };

    let symbol = p.alloc_symbol(&name_tok, SymbolKind::Value, ty, true);
    Ok(LocalVar {
        span: p.span_from(start),
        symbol,
        init,
    })
}

// ── Blocks and statements ────────────────────────────────────────────────

/// `'{' stmt* '}'`
pub(super) fn parse_block(p: &mut Parser) -> PResult<Block> {
    let start = p.expect(&TokenKind::LBrace)?.span;
    let mut stmts = Vec::new();
    while !p.at(&TokenKind::RBrace) {
        stmts.push(parse_stmt(p)?);
    }
    p.expect(&TokenKind::RBrace)?;
    Ok(Block {
        span: p.span_from(start),
        stmts,
    })
}

/// `(var_decl | expr) ';'`
fn parse_stmt(p: &mut Parser) -> PResult<Stmt> {
    let stmt = if p.at(&TokenKind::Let) {
        Stmt::Let(parse_var_decl(p)?)
    } else {
        Stmt::Expr(parse_expr(p)?)
    };
    p.expect(&TokenKind::Semicolon)?;
    Ok(stmt)
}

//! Precedence-climbing expression parser.
//!
//! Loosest to tightest: `as` casts, `|`, `^`, `&`, `+ -`, `* / %`, prefix
//! `& * -`, postfix calls. All binary operators are left-associative.

use std::num::IntErrorKind;

use berry_common::span::Span;
use berry_common::token::TokenKind;
use berry_common::ty::Ty;

use crate::ast::{BinOp, Expr, ExprKind, UnaryOp};
use crate::error::ParseError;

use super::types::parse_type_label;
use super::{PResult, Parser};

// ── Binding Power Table ──────────────────────────────────────────────────

/// Operator and (left_bp, right_bp) for an infix token.
fn infix_binding_power(kind: &TokenKind) -> Option<(BinOp, u8, u8)> {
    match kind {
        TokenKind::Pipe => Some((BinOp::BitOr, 1, 2)),
        TokenKind::Caret => Some((BinOp::BitXor, 3, 4)),
        TokenKind::Amp => Some((BinOp::BitAnd, 5, 6)),
        TokenKind::Plus => Some((BinOp::Add, 7, 8)),
        TokenKind::Minus => Some((BinOp::Sub, 7, 8)),
        TokenKind::Star => Some((BinOp::Mul, 9, 10)),
        TokenKind::Slash => Some((BinOp::Div, 9, 10)),
        TokenKind::Percent => Some((BinOp::Mod, 9, 10)),
        _ => None,
    }
}

// ── Entry Point ──────────────────────────────────────────────────────────

/// `binary ('as' type)*`
pub(super) fn parse_expr(p: &mut Parser) -> PResult<Expr> {
    let mut expr = expr_bp(p, 0)?;
    while p.eat(&TokenKind::As) {
        let dest = parse_type_label(p)?;
        let span = p.span_from(expr.span);
        expr = Expr::new(
            ExprKind::Cast {
                expr: Box::new(expr),
                dest,
            },
            span,
        );
    }
    Ok(expr)
}

fn expr_bp(p: &mut Parser, min_bp: u8) -> PResult<Expr> {
    let mut lhs = prefix(p)?;

    while let Some((op, l_bp, r_bp)) = infix_binding_power(p.current()) {
        if l_bp < min_bp {
            break;
        }
        p.advance();
        let rhs = expr_bp(p, r_bp)?;
        let span = lhs.span.merge(rhs.span);
        lhs = Expr::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        );
    }

    Ok(lhs)
}

// ── Prefix / Postfix ─────────────────────────────────────────────────────

fn prefix(p: &mut Parser) -> PResult<Expr> {
    let start = p.current_span();
    let wrap: fn(Box<Expr>) -> ExprKind = match p.current() {
        TokenKind::Amp => ExprKind::AddrOf,
        TokenKind::Star => ExprKind::Deref,
        TokenKind::Minus => |operand| ExprKind::Unary {
            op: UnaryOp::Neg,
            operand,
        },
        _ => return postfix(p),
    };
    p.advance();
    let operand = prefix(p)?;
    Ok(Expr::new(wrap(Box::new(operand)), p.span_from(start)))
}

/// An atom followed by any number of call suffixes.
fn postfix(p: &mut Parser) -> PResult<Expr> {
    let mut expr = atom(p)?;
    while p.eat(&TokenKind::LParen) {
        let mut args = Vec::new();
        if !p.at(&TokenKind::RParen) {
            loop {
                args.push(parse_expr(p)?);
                if !p.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        p.expect(&TokenKind::RParen)?;
        let span = p.span_from(expr.span);
        expr = Expr::new(
            ExprKind::Call {
                callee: Box::new(expr),
                args,
            },
            span,
        );
    }
    Ok(expr)
}

// ── Atoms ────────────────────────────────────────────────────────────────

fn atom(p: &mut Parser) -> PResult<Expr> {
    let span = p.current_span();
    let text = p.text(span);

    let expr = match p.current() {
        TokenKind::Ident => Expr::new(
            ExprKind::Ident {
                name: text.to_string(),
                symbol: None,
            },
            span,
        ),
        TokenKind::IntLiteral => Expr::new(ExprKind::IntLit(decode_int(text, span)?), span),
        TokenKind::FloatLiteral => {
            Expr::new(ExprKind::FloatLit(decode_float(text, span)?), span)
        }
        TokenKind::RuneLiteral => {
            let value = decode_rune(text)
                .ok_or_else(|| ParseError::new("malformed rune literal", span))?;
            Expr::typed(ExprKind::RuneLit(value), span, Ty::i32())
        }
        TokenKind::True => Expr::typed(ExprKind::BoolLit(true), span, Ty::Bool),
        TokenKind::False => Expr::typed(ExprKind::BoolLit(false), span, Ty::Bool),
        TokenKind::Null => Expr::new(ExprKind::NullLit, span),
        TokenKind::LParen => {
            p.advance();
            let inner = parse_expr(p)?;
            p.expect(&TokenKind::RParen)?;
            return Ok(inner);
        }
        _ => return Err(p.unexpected()),
    };

    p.advance();
    Ok(expr)
}

// ── Literal decoding ─────────────────────────────────────────────────────

fn decode_int(text: &str, span: Span) -> PResult<u64> {
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    let (radix, body) = match digits.get(..2) {
        Some("0b") => (2, &digits[2..]),
        Some("0o") => (8, &digits[2..]),
        Some("0x") => (16, &digits[2..]),
        _ => (10, digits.as_str()),
    };
    u64::from_str_radix(body, radix).map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => ParseError::new("integer value too large", span),
        _ => ParseError::new(format!("malformed integer literal: {text}"), span),
    })
}

fn decode_float(text: &str, span: Span) -> PResult<f64> {
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(ParseError::new("float value out of range", span)),
        Err(_) => Err(ParseError::new(
            format!("malformed float literal: {text}"),
            span,
        )),
    }
}

/// Value of a lexed rune literal, quotes included.
fn decode_rune(literal: &str) -> Option<char> {
    let mut chars = literal.strip_prefix('\'')?.strip_suffix('\'')?.chars();
    match chars.next()? {
        '\\' => chars.next().and_then(berry_lexer::unescape),
        c => Some(c),
    }
}

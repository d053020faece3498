use berry_common::token::TokenKind;
use berry_common::ty::Ty;

use super::{PResult, Parser};

/// `prim | '*' 'const'? type`
pub(super) fn parse_type_label(p: &mut Parser) -> PResult<Ty> {
    let ty = match p.current() {
        TokenKind::I8 => Ty::i8(),
        TokenKind::U8 => Ty::u8(),
        TokenKind::I16 => Ty::i16(),
        TokenKind::U16 => Ty::u16(),
        TokenKind::I32 => Ty::i32(),
        TokenKind::U32 => Ty::u32(),
        TokenKind::I64 => Ty::i64(),
        TokenKind::U64 => Ty::u64(),
        TokenKind::F32 => Ty::f32(),
        TokenKind::F64 => Ty::f64(),
        TokenKind::Bool => Ty::Bool,
        TokenKind::Star => {
            p.advance();
            let is_const = p.eat(&TokenKind::Const);
            let elem = parse_type_label(p)?;
            return Ok(Ty::pointer(elem, is_const));
        }
        _ => return Err(p.unexpected()),
    };
    p.advance();
    Ok(ty)
}

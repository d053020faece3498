//! Compatibility operations between types.
//!
//! Each operation answers a yes/no question and may, as a side effect,
//! merge, commit or narrow placeholders in the resolution table. Callers
//! turn a `false` into the appropriate diagnostic.

use berry_common::ty::{Ty, UntypedKind};

use crate::untyped::UntypedTable;

/// Require `a` and `b` to be the same type.
///
/// Two placeholders merge; a placeholder against a concrete type commits to
/// it when its kind allows; concrete types compare structurally.
pub fn must_equal(table: &mut UntypedTable, a: &Ty, b: &Ty) -> bool {
    let a = table.inner(a);
    let b = table.inner(b);
    match (&a, &b) {
        (Ty::Untyped(x), Ty::Untyped(y)) => table.union(*x, *y),
        (Ty::Untyped(id), concrete) | (concrete, Ty::Untyped(id)) => {
            table.is_compatible(*id, concrete) && table.commit(*id, concrete.clone())
        }
        (
            Ty::Pointer {
                elem: ea,
                is_const: ca,
            },
            Ty::Pointer {
                elem: eb,
                is_const: cb,
            },
        ) => ca == cb && must_equal(table, ea, eb),
        (Ty::Func { params: pa, ret: ra }, Ty::Func { params: pb, ret: rb }) => {
            pa.len() == pb.len()
                && pa.iter().zip(pb).all(|(x, y)| must_equal(table, x, y))
                && must_equal(table, ra, rb)
        }
        _ => a == b,
    }
}

/// Require a value of type `sub` to be usable where `sup` is expected.
/// Berry has no implicit widening, so this is equality.
pub fn must_subtype(table: &mut UntypedTable, sup: &Ty, sub: &Ty) -> bool {
    must_equal(table, sup, sub)
}

/// Whether `src` may be explicitly cast to `dest`.
pub fn must_cast(table: &mut UntypedTable, dest: &Ty, src: &Ty) -> bool {
    let src = table.inner(src);
    let dest = table.inner(dest);

    if let Ty::Untyped(id) = src {
        let kind = table.kind(id);
        if kind == UntypedKind::Null || table.is_compatible(id, &dest) {
            return table.commit(id, dest);
        }
        if dest.is_numeric() {
            return true;
        }
        return match dest {
            Ty::Bool | Ty::Pointer { .. } => table.narrow(id, UntypedKind::Int),
            _ => false,
        };
    }

    match (&src, &dest) {
        (s, d) if s.is_numeric() && d.is_numeric() => true,
        (Ty::Int { .. }, Ty::Bool) | (Ty::Bool, Ty::Int { .. }) => true,
        (
            Ty::Pointer {
                elem: se,
                is_const: sc,
            },
            Ty::Pointer {
                elem: de,
                is_const: dc,
            },
        ) => (!sc || *dc) && must_equal(table, se, de),
        _ => must_equal(table, &dest, &src),
    }
}

/// Require `ty` to be a number, narrowing a null-kinded placeholder.
pub fn must_number_type(table: &mut UntypedTable, ty: &Ty) -> bool {
    match table.inner(ty) {
        Ty::Untyped(id) => table.narrow(id, UntypedKind::Number),
        other => other.is_numeric(),
    }
}

/// Require `ty` to be an integer, narrowing a placeholder to `Int`.
pub fn must_int_type(table: &mut UntypedTable, ty: &Ty) -> bool {
    match table.inner(ty) {
        Ty::Untyped(id) => table.narrow(id, UntypedKind::Int),
        other => matches!(other, Ty::Int { .. }),
    }
}

//! Type representation for the Berry type system.
//!
//! `Ty` is a closed sum of the concrete types plus `Untyped`, a placeholder
//! for a literal whose type has not been pinned down yet. A placeholder owns
//! no content: it is an index into the checker's resolution table and only
//! means something while that table is alive.

use std::fmt;

use serde::Serialize;

/// Identity of a deferred placeholder in the active resolution table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct UntypedId(pub u32);

/// Constraint carried by an equivalence class of placeholders.
///
/// Ordered by specificity: `Null ⊑ Number ⊑ {Int, Float}`. `Int` and
/// `Float` are incomparable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum UntypedKind {
    Null,
    Number,
    Int,
    Float,
}

impl UntypedKind {
    /// The more specific of two kinds, or `None` when they conflict.
    pub fn dominant(self, other: UntypedKind) -> Option<UntypedKind> {
        use UntypedKind::*;
        match (self, other) {
            (Null, k) | (k, Null) => Some(k),
            (Number, k) | (k, Number) => Some(k),
            (a, b) if a == b => Some(a),
            _ => None,
        }
    }

    /// Whether a class of this kind may commit to the concrete type `ty`.
    pub fn accepts(self, ty: &Ty) -> bool {
        match self {
            UntypedKind::Null => true,
            UntypedKind::Number => matches!(ty, Ty::Int { .. } | Ty::Float { .. }),
            UntypedKind::Int => matches!(ty, Ty::Int { .. }),
            UntypedKind::Float => matches!(ty, Ty::Float { .. }),
        }
    }
}

impl fmt::Display for UntypedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UntypedKind::Null => "untyped null",
            UntypedKind::Number => "untyped number",
            UntypedKind::Int => "untyped int",
            UntypedKind::Float => "untyped float",
        };
        f.write_str(name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FloatWidth {
    W32,
    W64,
}

impl FloatWidth {
    pub fn bits(self) -> u32 {
        match self {
            FloatWidth::W32 => 32,
            FloatWidth::W64 => 64,
        }
    }
}

/// A Berry type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Ty {
    Int { width: IntWidth, signed: bool },
    Float { width: FloatWidth },
    Bool,
    Unit,
    Pointer { elem: Box<Ty>, is_const: bool },
    Func { params: Vec<Ty>, ret: Box<Ty> },
    /// A deferred literal type; resolves through the resolution table.
    Untyped(UntypedId),
}

impl Ty {
    pub fn int(width: IntWidth, signed: bool) -> Ty {
        Ty::Int { width, signed }
    }

    pub fn i8() -> Ty {
        Ty::int(IntWidth::W8, true)
    }

    pub fn u8() -> Ty {
        Ty::int(IntWidth::W8, false)
    }

    pub fn i16() -> Ty {
        Ty::int(IntWidth::W16, true)
    }

    pub fn u16() -> Ty {
        Ty::int(IntWidth::W16, false)
    }

    pub fn i32() -> Ty {
        Ty::int(IntWidth::W32, true)
    }

    pub fn u32() -> Ty {
        Ty::int(IntWidth::W32, false)
    }

    pub fn i64() -> Ty {
        Ty::int(IntWidth::W64, true)
    }

    pub fn u64() -> Ty {
        Ty::int(IntWidth::W64, false)
    }

    pub fn f32() -> Ty {
        Ty::Float {
            width: FloatWidth::W32,
        }
    }

    pub fn f64() -> Ty {
        Ty::Float {
            width: FloatWidth::W64,
        }
    }

    pub fn pointer(elem: Ty, is_const: bool) -> Ty {
        Ty::Pointer {
            elem: Box::new(elem),
            is_const,
        }
    }

    pub fn func(params: Vec<Ty>, ret: Ty) -> Ty {
        Ty::Func {
            params,
            ret: Box::new(ret),
        }
    }

    /// Concrete integer or float.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Ty::Int { .. } | Ty::Float { .. })
    }

    /// True when no placeholder appears anywhere inside this type.
    pub fn is_concrete(&self) -> bool {
        match self {
            Ty::Untyped(_) => false,
            Ty::Pointer { elem, .. } => elem.is_concrete(),
            Ty::Func { params, ret } => params.iter().all(Ty::is_concrete) && ret.is_concrete(),
            _ => true,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Int { width, signed } => {
                let prefix = if *signed { 'i' } else { 'u' };
                write!(f, "{prefix}{}", width.bits())
            }
            Ty::Float { width } => write!(f, "f{}", width.bits()),
            Ty::Bool => write!(f, "bool"),
            Ty::Unit => write!(f, "()"),
            Ty::Pointer { elem, is_const } => {
                if *is_const {
                    write!(f, "*const {elem}")
                } else {
                    write!(f, "*{elem}")
                }
            }
            Ty::Func { params, ret } => {
                match params.as_slice() {
                    [] => write!(f, "()")?,
                    [only] => write!(f, "{only}")?,
                    many => {
                        write!(f, "(")?;
                        for (i, p) in many.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            write!(f, "{p}")?;
                        }
                        write!(f, ")")?;
                    }
                }
                write!(f, " -> {ret}")
            }
            Ty::Untyped(id) => write!(f, "?{}", id.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_primitives() {
        assert_eq!(Ty::i8().to_string(), "i8");
        assert_eq!(Ty::u64().to_string(), "u64");
        assert_eq!(Ty::f32().to_string(), "f32");
        assert_eq!(Ty::Bool.to_string(), "bool");
        assert_eq!(Ty::Unit.to_string(), "()");
    }

    #[test]
    fn display_pointers_and_functions() {
        assert_eq!(Ty::pointer(Ty::i32(), false).to_string(), "*i32");
        assert_eq!(Ty::pointer(Ty::u8(), true).to_string(), "*const u8");
        assert_eq!(Ty::func(vec![], Ty::Unit).to_string(), "() -> ()");
        assert_eq!(Ty::func(vec![Ty::i32()], Ty::Bool).to_string(), "i32 -> bool");
        assert_eq!(
            Ty::func(vec![Ty::i32(), Ty::f64()], Ty::Unit).to_string(),
            "(i32, f64) -> ()"
        );
    }

    #[test]
    fn dominant_kind_lattice() {
        use UntypedKind::*;
        assert_eq!(Null.dominant(Float), Some(Float));
        assert_eq!(Number.dominant(Int), Some(Int));
        assert_eq!(Float.dominant(Number), Some(Float));
        assert_eq!(Number.dominant(Number), Some(Number));
        assert_eq!(Int.dominant(Float), None);
        assert_eq!(Float.dominant(Int), None);
    }

    #[test]
    fn kind_accepts() {
        assert!(UntypedKind::Null.accepts(&Ty::pointer(Ty::i32(), false)));
        assert!(UntypedKind::Number.accepts(&Ty::f64()));
        assert!(UntypedKind::Number.accepts(&Ty::u8()));
        assert!(!UntypedKind::Int.accepts(&Ty::f32()));
        assert!(!UntypedKind::Float.accepts(&Ty::i32()));
        assert!(!UntypedKind::Number.accepts(&Ty::Bool));
    }

    #[test]
    fn concreteness_is_deep() {
        assert!(Ty::pointer(Ty::i32(), false).is_concrete());
        assert!(!Ty::pointer(Ty::Untyped(UntypedId(0)), false).is_concrete());
        assert!(!Ty::func(vec![Ty::Untyped(UntypedId(1))], Ty::Unit).is_concrete());
    }
}

//! Resolution table for untyped literal placeholders.
//!
//! Every integer, float and `null` literal without an obvious type gets a
//! placeholder here. Placeholders merge into equivalence classes through
//! `ena`'s union-find; each class carries the most specific kind seen so far
//! and, once known, the concrete type it committed to. A commit is final:
//! later attempts to commit a class again are ignored.
//!
//! The table is scoped to a single barrier. The walker defaults whatever is
//! left, reads the answers back into the AST, then resets it.

use ena::unify::{InPlaceUnificationTable, UnifyKey, UnifyValue};

use berry_common::ty::{Ty, UntypedId, UntypedKind};

// ── Keys and values ──────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct UntypedKey(u32);

impl UnifyKey for UntypedKey {
    type Value = UntypedValue;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        UntypedKey(u)
    }

    fn tag() -> &'static str {
        "UntypedKey"
    }
}

impl From<UntypedId> for UntypedKey {
    fn from(id: UntypedId) -> Self {
        UntypedKey(id.0)
    }
}

/// State of one equivalence class.
#[derive(Clone, Debug, PartialEq)]
struct UntypedValue {
    kind: UntypedKind,
    committed: Option<Ty>,
}

/// Classes whose constraints cannot be reconciled.
#[derive(Clone, Debug, PartialEq)]
struct Conflict;

impl UnifyValue for UntypedValue {
    type Error = Conflict;

    fn unify_values(a: &Self, b: &Self) -> Result<Self, Conflict> {
        let kind = a.kind.dominant(b.kind).ok_or(Conflict)?;
        let committed = match (&a.committed, &b.committed) {
            (Some(x), Some(y)) if x != y => return Err(Conflict),
            (Some(ty), _) | (None, Some(ty)) => Some(ty.clone()),
            (None, None) => None,
        };
        if let Some(ty) = &committed {
            if !kind.accepts(ty) {
                return Err(Conflict);
            }
        }
        Ok(UntypedValue { kind, committed })
    }
}

// ── Table ────────────────────────────────────────────────────────────────

pub struct UntypedTable {
    table: InPlaceUnificationTable<UntypedKey>,
}

impl Default for UntypedTable {
    fn default() -> Self {
        Self::new()
    }
}

impl UntypedTable {
    pub fn new() -> Self {
        UntypedTable {
            table: InPlaceUnificationTable::new(),
        }
    }

    /// Number of placeholders created since the last reset.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn new_untyped(&mut self, kind: UntypedKind) -> UntypedId {
        let key = self.table.new_key(UntypedValue {
            kind,
            committed: None,
        });
        tracing::trace!(id = key.0, %kind, "new placeholder");
        UntypedId(key.0)
    }

    /// Representative of the class `id` belongs to.
    pub fn find(&mut self, id: UntypedId) -> UntypedId {
        UntypedId(self.table.find(id).0)
    }

    pub fn kind(&mut self, id: UntypedId) -> UntypedKind {
        self.table.probe_value(id).kind
    }

    /// The committed type of the class, if any.
    pub fn resolve(&mut self, id: UntypedId) -> Option<Ty> {
        self.table.probe_value(id).committed
    }

    /// Merge two classes. Fails, leaving both untouched, when their kinds
    /// conflict or they committed to different types.
    pub fn union(&mut self, a: UntypedId, b: UntypedId) -> bool {
        let merged = self.table.unify_var_var(a, b).is_ok();
        tracing::trace!(a = a.0, b = b.0, merged, "union");
        merged
    }

    /// Commit the class to `ty`. A class commits at most once; a second
    /// commit is a no-op reported as failure.
    pub fn commit(&mut self, id: UntypedId, ty: Ty) -> bool {
        let current = self.table.probe_value(id);
        if current.committed.is_some() {
            return false;
        }
        tracing::trace!(id = id.0, %ty, "commit");
        self.table
            .unify_var_value(
                id,
                UntypedValue {
                    kind: current.kind,
                    committed: Some(ty),
                },
            )
            .is_ok()
    }

    /// Tighten the kind of an uncommitted class. Fails when `kind` conflicts
    /// with what the class already is.
    pub fn narrow(&mut self, id: UntypedId, kind: UntypedKind) -> bool {
        self.table
            .unify_var_value(
                id,
                UntypedValue {
                    kind,
                    committed: None,
                },
            )
            .is_ok()
    }

    /// Whether the class could commit to `ty`.
    pub fn is_compatible(&mut self, id: UntypedId, ty: &Ty) -> bool {
        let value = self.table.probe_value(id);
        match value.committed {
            Some(committed) => &committed == ty,
            None => value.kind.accepts(ty),
        }
    }

    /// Commit every open class to its kind's default: float literals to
    /// `f32`, other numbers to `i64`. Null classes stay open.
    pub fn default_all(&mut self) {
        for index in 0..self.table.len() as u32 {
            let id = UntypedId(index);
            let value = self.table.probe_value(id);
            if value.committed.is_some() {
                continue;
            }
            let ty = match value.kind {
                UntypedKind::Float => Ty::f32(),
                UntypedKind::Number | UntypedKind::Int => Ty::i64(),
                UntypedKind::Null => continue,
            };
            self.commit(id, ty);
        }
    }

    /// Forget every placeholder. Ids handed out before are meaningless
    /// afterwards.
    pub fn reset(&mut self) {
        tracing::trace!(placeholders = self.len(), "reset");
        self.table = InPlaceUnificationTable::new();
    }

    // ── Reading types back ─────────────────────────────────────────────

    /// Resolve the outermost placeholder of `ty`, following commits.
    pub fn inner(&mut self, ty: &Ty) -> Ty {
        match ty {
            Ty::Untyped(id) => match self.resolve(*id) {
                Some(committed) => self.inner(&committed),
                None => Ty::Untyped(self.find(*id)),
            },
            other => other.clone(),
        }
    }

    /// Replace every committed placeholder inside `ty` with its type.
    pub fn zonk(&mut self, ty: &Ty) -> Ty {
        match self.inner(ty) {
            Ty::Pointer { elem, is_const } => Ty::pointer(self.zonk(&elem), is_const),
            Ty::Func { params, ret } => {
                let params = params.iter().map(|p| self.zonk(p)).collect();
                Ty::func(params, self.zonk(&ret))
            }
            other => other,
        }
    }

    /// Human-readable form of `ty` for diagnostics. An open placeholder is
    /// named by its kind ("untyped number").
    pub fn describe(&mut self, ty: &Ty) -> String {
        match self.inner(ty) {
            Ty::Untyped(id) => self.kind(id).to_string(),
            Ty::Pointer { elem, is_const } => {
                let qualifier = if is_const { "const " } else { "" };
                format!("*{qualifier}{}", self.describe(&elem))
            }
            Ty::Func { params, ret } => {
                let params: Vec<String> = params.iter().map(|p| self.describe(p)).collect();
                let params = match params.as_slice() {
                    [only] => only.clone(),
                    _ => format!("({})", params.join(", ")),
                };
                format!("{params} -> {}", self.describe(&ret))
            }
            other => other.to_string(),
        }
    }
}

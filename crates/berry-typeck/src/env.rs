//! Lexical scopes for the walker.
//!
//! Locals and parameters live in a stack of frames, one per function body
//! and block. Lookups search from the innermost frame outward and fall back
//! to the module's global table. The stack is emptied between definitions.

use rustc_hash::FxHashMap;

use berry_parser::symbol::SymbolId;

pub struct ScopeStack<'g> {
    globals: &'g FxHashMap<String, SymbolId>,
    /// Innermost frame last.
    frames: Vec<FxHashMap<String, SymbolId>>,
}

impl<'g> ScopeStack<'g> {
    pub fn new(globals: &'g FxHashMap<String, SymbolId>) -> Self {
        ScopeStack {
            globals,
            frames: Vec::new(),
        }
    }

    pub fn push(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Bind `name` in the innermost frame. On a clash within that frame the
    /// existing binding is kept and returned. Shadowing an outer frame or a
    /// global is allowed.
    pub fn declare(&mut self, name: &str, id: SymbolId) -> Result<(), SymbolId> {
        if self.frames.is_empty() {
            self.push();
        }
        let frame = self.frames.len() - 1;
        let frame = &mut self.frames[frame];
        if let Some(&existing) = frame.get(name) {
            return Err(existing);
        }
        frame.insert(name.to_string(), id);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
            .or_else(|| self.globals.get(name).copied())
    }

    /// Drop every local frame.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Number of local frames on the stack.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn globals() -> FxHashMap<String, SymbolId> {
        let mut globals = FxHashMap::default();
        globals.insert("g".to_string(), SymbolId(0));
        globals
    }

    #[test]
    fn locals_shadow_globals() {
        let globals = globals();
        let mut scopes = ScopeStack::new(&globals);
        assert_eq!(scopes.lookup("g"), Some(SymbolId(0)));

        scopes.push();
        assert!(scopes.declare("g", SymbolId(1)).is_ok());
        assert_eq!(scopes.lookup("g"), Some(SymbolId(1)));

        scopes.pop();
        assert_eq!(scopes.lookup("g"), Some(SymbolId(0)));
    }

    #[test]
    fn nested_frames() {
        let globals = globals();
        let mut scopes = ScopeStack::new(&globals);
        scopes.push();
        scopes.declare("x", SymbolId(1)).unwrap();
        scopes.push();
        assert_eq!(scopes.lookup("x"), Some(SymbolId(1)));
        scopes.declare("x", SymbolId(2)).unwrap();
        assert_eq!(scopes.lookup("x"), Some(SymbolId(2)));
        scopes.pop();
        assert_eq!(scopes.lookup("x"), Some(SymbolId(1)));
        assert_eq!(scopes.depth(), 1);
    }

    #[test]
    fn duplicate_in_same_frame() {
        let globals = globals();
        let mut scopes = ScopeStack::new(&globals);
        scopes.push();
        scopes.declare("x", SymbolId(1)).unwrap();
        assert_eq!(scopes.declare("x", SymbolId(2)), Err(SymbolId(1)));
        assert_eq!(scopes.lookup("x"), Some(SymbolId(1)));
    }

    #[test]
    fn clear_forgets_locals() {
        let globals = globals();
        let mut scopes = ScopeStack::new(&globals);
        scopes.push();
        scopes.declare("x", SymbolId(1)).unwrap();
        scopes.clear();
        assert_eq!(scopes.depth(), 0);
        assert_eq!(scopes.lookup("x"), None);
        assert_eq!(scopes.lookup("missing"), None);
    }
}

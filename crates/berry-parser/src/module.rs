//! A module: the unit of compilation. Owns its source files, the definitions
//! parsed from them, every symbol, and the flat global name table.

use rustc_hash::FxHashMap;

use berry_common::source::{FileId, SourceFile};

use crate::ast::Def;
use crate::symbol::{SymbolId, SymbolTable};

#[derive(Debug)]
pub struct Module {
    pub name: String,
    pub files: Vec<SourceFile>,
    /// Top-level definitions in file order, then source order.
    pub defs: Vec<Def>,
    pub symbols: SymbolTable,
    pub globals: FxHashMap<String, SymbolId>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
            defs: Vec::new(),
            symbols: SymbolTable::new(),
            globals: FxHashMap::default(),
        }
    }

    /// Identity the next added source file will receive.
    pub fn next_file_id(&self) -> FileId {
        FileId(self.files.len() as u32)
    }

    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.0 as usize]
    }

    /// Insert a global binding. On a name clash the table is left untouched
    /// and the existing binding is returned.
    pub fn declare_global(&mut self, name: &str, id: SymbolId) -> Result<(), SymbolId> {
        if let Some(&existing) = self.globals.get(name) {
            return Err(existing);
        }
        self.globals.insert(name.to_string(), id);
        Ok(())
    }

    pub fn lookup_global(&self, name: &str) -> Option<SymbolId> {
        self.globals.get(name).copied()
    }
}

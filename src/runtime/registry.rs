//! The macro table: a write-once map from macro name to body.
//!
//! One table exists per run. Entries are added when a `MacroDef` node is
//! reduced and are never removed or replaced.

use std::collections::HashMap;

use crate::ast::Node;
use crate::errors::PoopError;

#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    macros: HashMap<String, Vec<Node>>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`. Defining a name twice is an error even when the
    /// bodies are identical.
    pub fn define(&mut self, name: &str, body: Vec<Node>) -> Result<(), PoopError> {
        if self.macros.contains_key(name) {
            return Err(PoopError::MacroRedefinition {
                name: name.to_string(),
            });
        }
        self.macros.insert(name.to_string(), body);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&[Node]> {
        self.macros.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Defined names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.macros.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

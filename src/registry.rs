//! Name-to-table registry used by a handler to resolve dispatch targets.

use indexmap::IndexMap;

use crate::error::HandlerError;
use crate::table::VirtualTable;

/// Registered tables, keyed by name in registration order.
///
/// Registering a name twice replaces the earlier table; the replacement is
/// logged but not an error, so a handler can re-register during
/// reconfiguration.
#[derive(Default)]
pub struct TableRegistry {
    tables: IndexMap<String, Box<dyn VirtualTable>>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, table: Box<dyn VirtualTable>) {
        let name = name.into();
        if self.tables.contains_key(&name) {
            tracing::warn!(table = %name, "replacing existing table registration");
        }
        self.tables.insert(name, table);
    }

    pub fn lookup(&self, name: &str) -> Result<&dyn VirtualTable, HandlerError> {
        self.tables
            .get(name)
            .map(|table| table.as_ref())
            .ok_or_else(|| HandlerError::TableNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Table names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

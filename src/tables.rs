//! Set of tables taking part in drag and drop

use crate::error::TreeError;
use crate::tree::{transfer, TransferReport, TreeTable};
use std::collections::HashMap;

/// Tables addressed by id
pub struct TableSet<C> {
    tables: HashMap<String, TreeTable<C>>,
}

impl<C> Default for TableSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TableSet<C> {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    pub fn insert(&mut self, table: TreeTable<C>) -> Result<(), TreeError> {
        if self.tables.contains_key(table.id()) {
            return Err(TreeError::DuplicateTable(table.id().to_string()));
        }
        self.tables.insert(table.id().to_string(), table);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&TreeTable<C>, TreeError> {
        self.tables
            .get(id)
            .ok_or_else(|| TreeError::TableNotFound(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut TreeTable<C>, TreeError> {
        self.tables
            .get_mut(id)
            .ok_or_else(|| TreeError::TableNotFound(id.to_string()))
    }

    pub fn remove(&mut self, id: &str) -> Option<TreeTable<C>> {
        self.tables.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tables.contains_key(id)
    }

    /// Table ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Take a table out so that it can be borrowed next to another one.
    /// Must be followed by [`TableSet::restore`].
    pub(crate) fn take(&mut self, id: &str) -> Result<TreeTable<C>, TreeError> {
        self.remove(id)
            .ok_or_else(|| TreeError::TableNotFound(id.to_string()))
    }

    pub(crate) fn restore(&mut self, table: TreeTable<C>) {
        self.tables.insert(table.id().to_string(), table);
    }

    /// Transfer rows between two tables of the set. See [`transfer`].
    pub fn transfer(
        &mut self,
        source_id: &str,
        dest_id: &str,
        ids: &[&str],
        new_parent: Option<&str>,
        after: Option<&str>,
    ) -> Result<Option<TransferReport>, TreeError> {
        if source_id == dest_id {
            return Err(TreeError::TransferUnsupported(dest_id.to_string()));
        }
        let mut source = self.take(source_id)?;
        let result = match self.get_mut(dest_id) {
            Ok(dest) => transfer(&mut source, dest, ids, new_parent, after),
            Err(e) => Err(e),
        };
        self.restore(source);
        result
    }
}

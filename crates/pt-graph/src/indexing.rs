//! Stable name indexing.
//!
//! Provides a bidirectional mapping between external string ids (as used in
//! layouts, topics and register maps) and compact arena ids.

use std::collections::HashMap;

use pt_core::Id;

/// Bidirectional `String <-> Id` map with ids assigned in insertion order.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    /// Contiguous list of names (index -> name).
    names: Vec<String>,
    /// Reverse lookup: name -> Id.
    by_name: HashMap<String, Id>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`, returning its new id, or the existing id if taken.
    pub fn insert(&mut self, name: &str) -> Result<Id, Id> {
        if let Some(&existing) = self.by_name.get(name) {
            return Err(existing);
        }
        let id = Id::from_index(self.names.len() as u32);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn get(&self, name: &str) -> Option<Id> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: Id) -> Option<&str> {
        self.names.get(id.slot()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        (0..self.names.len() as u32).map(Id::from_index)
    }
}

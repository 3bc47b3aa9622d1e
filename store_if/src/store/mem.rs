//! # In-memory store

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{collections::HashMap, sync::Mutex};

use super::{DocStore, StoreError};
use crate::doc::DocId;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A store which keeps documents in memory, used for dry runs and testing.
#[derive(Debug, Default)]
pub struct MemStore {
    docs: Mutex<HashMap<DocId, String>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a document from the store.
    pub fn remove(&self, id: DocId) -> Result<(), StoreError> {
        self.docs
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .remove(&id);

        Ok(())
    }
}

impl DocStore for MemStore {
    fn read(&self, id: DocId) -> Result<String, StoreError> {
        self.docs
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn write(&self, id: DocId, contents: &str) -> Result<(), StoreError> {
        self.docs
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .insert(id, contents.to_string());

        Ok(())
    }
}

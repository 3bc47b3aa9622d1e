//! # Document stores
//!
//! A store holds the text of each document. Stores make no transactional guarantees, every
//! reader performs its own read-modify-write cycle, so two writers of the same document can
//! clobber each other. The JSON file store at least guarantees a reader never sees a partially
//! written document.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod file;
mod mem;

pub use file::JsonFileStore;
pub use mem::MemStore;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use thiserror::Error;

use crate::doc::{DocId, Document};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A store of documents.
pub trait DocStore: Send + Sync {
    /// Read the contents of a document.
    fn read(&self, id: DocId) -> Result<String, StoreError>;

    /// Replace the contents of a document.
    fn write(&self, id: DocId, contents: &str) -> Result<(), StoreError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur when accessing a store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not access {0}: {1}")]
    IoError(DocId, std::io::Error),

    #[error("{0} does not exist in the store")]
    NotFound(DocId),

    #[error("Could not parse {0}: {1}")]
    ParseError(DocId, serde_json::Error),

    #[error("Could not serialize {0}: {1}")]
    SerializationError(DocId, serde_json::Error),

    #[error("The store's lock has been poisoned")]
    Poisoned,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Load and parse a document from the store.
pub fn load<D: Document>(store: &dyn DocStore) -> Result<D, StoreError> {
    let contents = store.read(D::ID)?;

    trace!("Loaded {} ({} bytes)", D::ID, contents.len());

    serde_json::from_str(&contents).map_err(|e| StoreError::ParseError(D::ID, e))
}

/// Serialize and save a document into the store.
pub fn save<D: Document>(store: &dyn DocStore, doc: &D) -> Result<(), StoreError> {
    let contents =
        serde_json::to_string(doc).map_err(|e| StoreError::SerializationError(D::ID, e))?;

    store.write(D::ID, &contents)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::doc::{RouteDoc, TelemetryDoc};

    #[test]
    fn test_load_save_through_trait_object() {
        let store = MemStore::new();
        let dyn_store: &dyn DocStore = &store;

        assert!(matches!(
            load::<RouteDoc>(dyn_store),
            Err(StoreError::NotFound(DocId::Route))
        ));

        save(dyn_store, &TelemetryDoc::new(57.0, 11.0, 90.0)).unwrap();
        let t: TelemetryDoc = load(dyn_store).unwrap();
        assert_eq!(t.gps.course, 90.0);
    }

    #[test]
    fn test_parse_error_names_document() {
        let store = MemStore::new();
        store.write(DocId::Route, "{ not json").unwrap();

        match load::<RouteDoc>(&store) {
            Err(StoreError::ParseError(id, _)) => assert_eq!(id, DocId::Route),
            r => panic!("Expected a parse error, got {:?}", r),
        }
    }
}

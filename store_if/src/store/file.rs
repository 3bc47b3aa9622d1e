//! # JSON file store
//!
//! Stores each document as a JSON file in a single directory.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use super::{DocStore, StoreError};
use crate::doc::DocId;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A store backed by JSON files in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JsonFileStore {
    /// Create a store over the given directory. The directory is not checked until the first
    /// read or write.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The directory containing the documents.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path to the given document.
    pub fn doc_path(&self, id: DocId) -> PathBuf {
        self.dir.join(id.file_name())
    }
}

impl DocStore for JsonFileStore {
    fn read(&self, id: DocId) -> Result<String, StoreError> {
        fs::read_to_string(self.doc_path(id)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(id),
            _ => StoreError::IoError(id, e),
        })
    }

    fn write(&self, id: DocId, contents: &str) -> Result<(), StoreError> {
        // Write to a temporary file first and then rename it over the document, the rename is
        // atomic so readers see either the old or the new document.
        let path = self.doc_path(id);
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, contents).map_err(|e| StoreError::IoError(id, e))?;
        fs::rename(&tmp_path, &path).map_err(|e| StoreError::IoError(id, e))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        doc::{ControllerType, SettingsDoc},
        load, save,
    };

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        fs::write(
            store.doc_path(DocId::Settings),
            r#"{
                "controller": {
                    "type": "route",
                    "refCourse": 10,
                    "reflocation": {"latitude": 0, "longitude": 0}
                },
                "rudder": {"darkMode": false, "ref": 512},
                "route": {"goalIndex": 0},
                "units": "metric"
            }"#,
        )
        .unwrap();

        let mut settings: SettingsDoc = load(&store).unwrap();
        assert_eq!(settings.controller.kind, ControllerType::Route);

        settings.set_goal(3, 57.0, 11.0);
        save(&store, &settings).unwrap();

        // No temporary file is left behind
        assert!(!dir.path().join("settings.json.tmp").exists());

        let reloaded: SettingsDoc = load(&store).unwrap();
        assert_eq!(reloaded, settings);
        assert_eq!(reloaded.extra["units"], "metric");
    }

    #[test]
    fn test_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        assert!(matches!(
            store.read(DocId::Telemetry),
            Err(StoreError::NotFound(DocId::Telemetry))
        ));
    }
}

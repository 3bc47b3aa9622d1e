//! # Document store interface crate.
//!
//! Provides the documents shared between the simulator and the external configuration/telemetry
//! façade, and the stores they are persisted in.
//!
//! The façade (the web API in front of the simulator) edits the settings and route documents and
//! reads the telemetry document. The simulator reads settings and route every control cycle,
//! writes route progress back into the settings document and writes its pose into the telemetry
//! document.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Document definitions
pub mod doc;

/// Stores that documents are read from and written to
pub mod store;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use doc::{DocId, Document};
pub use store::{load, save, DocStore, StoreError};

//! # Vehicle model module
//!
//! Kinematic bicycle model of the vehicle. The model integrates the vehicle's planar position,
//! speed and heading with a forward Euler step and converts the local position into geodetic
//! coordinates relative to a fixed reference origin.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;

use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Latest vehicle state, handed from the dynamics task to the telemetry task.
pub type SharedState = Arc<Mutex<Option<VehicleState>>>;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during VehicleModel operation.
#[derive(Debug, thiserror::Error)]
pub enum VehicleError {
    #[error("Integration produced a non-finite state: {0:?}")]
    NonFinite(VehicleState),

    #[error("Could not load the vehicle parameters: {0}")]
    ParamLoad(util::params::LoadError),

    #[error("Could not create the vehicle archive: {0}")]
    Archive(util::archive::ArchiveError),

    #[error("Invalid vehicle reference origin: {0}")]
    Reference(crate::geodesy::GeometryError),
}

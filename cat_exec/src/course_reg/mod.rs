//! # Course regulator module
//!
//! Computes the steering command which drives the vehicle toward the commanded course. The
//! commanded course comes from the active control mode: the bearing to the current route
//! waypoint, a fixed course, or the bearing to a fixed location. The signed error between the
//! commanded course and the vehicle's course is fed through a PID controller whose output is the
//! steering command.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod bearing;
mod controllers;
mod mode;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use bearing::*;
pub use controllers::*;
pub use mode::*;
pub use params::*;
pub use state::*;

use crate::geodesy::GeometryError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Problems with the control configuration or route.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("The route contains no waypoints")]
    EmptyRoute,

    #[error("Route waypoint {0} is not a valid position")]
    InvalidWaypoint(usize),

    #[error("Rudder reference {0} is outside the allowed range 0 to {1}")]
    InvalidRudderRef(u64, u64),

    #[error("Reference course {0} is not finite")]
    InvalidRefCourse(f64),

    #[error("Reference location ({0}, {1}) is not a valid position")]
    InvalidRefLocation(f64, f64),

    #[error("Route mode is selected but no route has been loaded")]
    NoRoute,
}

/// Possible errors that can occur during CourseReg operation.
#[derive(Debug, thiserror::Error)]
pub enum CourseRegError {
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not load the course regulator parameters: {0}")]
    ParamLoad(util::params::LoadError),

    #[error("Could not create the course regulator archive: {0}")]
    Archive(util::archive::ArchiveError),
}

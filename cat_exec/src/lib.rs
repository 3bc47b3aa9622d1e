//! # Cat library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to access items defined
//! inside the cat crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Course regulator - computes the steering command from the control mode and route
pub mod course_reg;

/// Data store - state shared between the steps of the dynamics task
pub mod data_store;

/// Dynamics task - runs the course regulator and vehicle model every cycle
pub mod dyn_task;

/// Geodesy - ENU/geodetic conversion and the ellipsoidal inverse problem
pub mod geodesy;

/// Executable parameters
pub mod params;

/// Telemetry task - writes the vehicle position to the telemetry document
pub mod tm_task;

/// Angle units
pub mod units;

/// Vehicle model - kinematic bicycle model of the vehicle
pub mod vehicle;

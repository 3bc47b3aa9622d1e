//! Parameters structure for the VehicleModel

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the vehicle model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    // ---- GEOMETRY ----
    /// Distance from the centre of mass to the rear axle.
    ///
    /// Units: meters
    pub lr_m: f64,

    /// Distance from the centre of mass to the front axle.
    ///
    /// Units: meters
    pub lf_m: f64,

    // ---- INITIAL STATE ----
    /// Initial position east of the reference origin.
    ///
    /// Units: meters
    pub init_x_m: f64,

    /// Initial position north of the reference origin.
    ///
    /// Units: meters
    pub init_y_m: f64,

    /// Initial speed.
    ///
    /// Units: meters/second
    pub init_speed_ms: f64,

    /// Initial heading, counter-clockwise from east.
    ///
    /// Units: radians
    pub init_heading_rad: f64,

    // ---- INPUTS ----
    /// Longitudinal acceleration applied every step.
    ///
    /// Units: meters/second^2
    pub acceleration_ms2: f64,

    /// Velocity of the water or air moving the vehicle, subtracted from its velocity.
    ///
    /// Units: meters/second, Frame: local ENU
    pub disturbance_ms: [f64; 2],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            lr_m: 10.0,
            lf_m: 10.0,
            init_x_m: 0.0,
            init_y_m: 0.0,
            init_speed_ms: 10.0,
            init_heading_rad: 0.0,
            acceleration_ms2: 0.0,
            disturbance_ms: [0.0, 0.0],
        }
    }
}

//! Parameters structure for CourseReg

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the course regulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    // ---- PID ----
    /// Proportional gain.
    ///
    /// Units: radians of steering per degree of course error
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Setpoint of the course error.
    ///
    /// Units: degrees
    pub setpoint_deg: f64,

    /// Minimum steering command produced by the PID.
    ///
    /// Units: radians
    pub output_min_rad: f64,

    /// Maximum steering command produced by the PID.
    ///
    /// Units: radians
    pub output_max_rad: f64,

    // ---- ROUTE ----
    /// Distance below which a waypoint counts as reached.
    ///
    /// Units: meters
    pub capture_radius_m: f64,

    // ---- MANUAL RUDDER ----
    /// Rudder reference which centres the rudder
    pub rudder_ref_centre: f64,

    /// Distance of the reference from the centre giving full deflection
    pub rudder_ref_half_span: f64,

    /// Largest accepted rudder reference
    pub rudder_ref_max: u64,

    /// Full manual rudder deflection.
    ///
    /// Units: radians
    pub rudder_max_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            k_p: 0.05,
            k_i: 0.0,
            k_d: 0.0,
            setpoint_deg: 0.0,
            output_min_rad: -0.9,
            output_max_rad: 0.9,
            capture_radius_m: 5.0,
            rudder_ref_centre: 512.0,
            rudder_ref_half_span: 512.0,
            rudder_ref_max: 1023,
            rudder_max_rad: std::f64::consts::FRAC_PI_4,
        }
    }
}

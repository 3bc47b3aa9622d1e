//! # Course controllers
//!
//! The PID controller used by the course regulator.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
///
/// The error is `setpoint - measurement`. The integral is accumulated with the integral gain
/// already applied so that it can be clamped to the output limits, preventing windup.
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Value the measurement is driven toward
    setpoint: f64,

    /// Lower and upper bound of the output
    output_limits: (f64, f64),

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains, a zero setpoint and no output limits.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            setpoint: 0f64,
            output_limits: (f64::NEG_INFINITY, f64::INFINITY),
            integral: 0f64,
            prev_error: None,
        }
    }

    /// Create the course controller from the regulator parameters.
    pub fn from_params(params: &Params) -> Self {
        Self::new(params.k_p, params.k_i, params.k_d)
            .with_setpoint(params.setpoint_deg)
            .with_output_limits(params.output_min_rad, params.output_max_rad)
    }

    pub fn with_setpoint(mut self, setpoint: f64) -> Self {
        self.setpoint = setpoint;
        self
    }

    pub fn with_output_limits(mut self, min: f64, max: f64) -> Self {
        self.output_limits = (min.min(max), max.max(min));
        self
    }

    /// Get the value of the controller for the given measurement, `dt` seconds after the
    /// previous call.
    ///
    /// With a non-positive `dt` neither the integral nor the derivative is updated.
    pub fn get(&mut self, measurement: f64, dt: f64) -> f64 {
        let (min, max) = self.output_limits;
        let error = self.setpoint - measurement;

        if dt > 0f64 {
            self.integral = (self.integral + self.k_i * error * dt).max(min).min(max);
        }

        // The first call has no previous error to differentiate against
        let deriv = match self.prev_error {
            Some(e) if dt > 0f64 => (error - e) / dt,
            _ => 0f64,
        };

        let out = self.k_p * error + self.integral + self.k_d * deriv;

        self.prev_error = Some(error);

        out.max(min).min(max)
    }
}

//! # Cat Executable Parameters
//!
//! This module provides parameters for the cat executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatExecParams {
    /// Period of the dynamics task, which is also the vehicle model's timestep.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Period of the telemetry task.
    ///
    /// Units: seconds
    pub tm_period_s: f64,

    /// Directory holding the settings, route and telemetry documents. Relative paths are taken
    /// from the software root.
    pub store_dir: PathBuf,

    /// Number of consecutive cycle overruns after which an error is reported
    pub max_consec_cycle_overruns: u64,

    /// Number of consecutive cycles with store errors after which an error is reported
    pub max_consec_store_errors: u64,

    /// Number of consecutive cycles in which the regulator could not produce a steering command
    /// after which an error is reported
    pub max_consec_reg_errors: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamsError {
    #[error("{0} must be a positive number of seconds, found {1}")]
    InvalidPeriod(&'static str, f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CatExecParams {
    /// Check the task periods can be used as durations.
    pub fn validate(&self) -> Result<(), ParamsError> {
        for (name, period) in [
            ("cycle_period_s", self.cycle_period_s),
            ("tm_period_s", self.tm_period_s),
        ]
        .iter()
        {
            if !period.is_finite() || *period <= 0.0 {
                return Err(ParamsError::InvalidPeriod(*name, *period));
            }
        }

        Ok(())
    }
}

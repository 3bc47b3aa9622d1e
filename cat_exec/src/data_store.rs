//! # Data Store

use log::info;
use store_if::doc::{RouteDoc, SettingsDoc};

use crate::{
    course_reg::{self, ControlConfig},
    units::Radians,
    vehicle,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the dynamics task.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    // Last known good documents
    /// Settings document as last successfully read
    pub settings: Option<SettingsDoc>,

    /// Control configuration built from `settings`
    pub control_config: Option<ControlConfig>,

    /// Route document as last successfully read
    pub route: Option<RouteDoc>,

    // CourseReg
    pub course_reg: course_reg::CourseReg,
    pub course_reg_status_rpt: Option<course_reg::StatusReport>,

    /// Steering command applied to the vehicle, held when the regulator can't produce a new one
    pub steering: Radians,

    // VehicleModel
    pub vehicle: vehicle::VehicleModel,
    pub vehicle_status_rpt: vehicle::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive cycles in which a document could not be read or written
    pub num_consec_store_errors: u64,

    /// Number of consecutive cycles in which the regulator did not produce a command
    pub num_consec_reg_errors: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Clear items that need wiping at the start of the cycle.
    pub fn cycle_start(&mut self) {
        self.course_reg_status_rpt = None;
        self.vehicle_status_rpt = vehicle::StatusReport::default();
    }

    /// Record the outcome of this cycle's store accesses.
    pub fn store_access(&mut self, ok: bool) {
        if ok {
            if self.num_consec_store_errors > 0 {
                info!(
                    "Store access recovered after {} cycles",
                    self.num_consec_store_errors
                );
            }
            self.num_consec_store_errors = 0;
        } else {
            self.num_consec_store_errors += 1;
        }
    }

    /// Increment the cycle counter.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}

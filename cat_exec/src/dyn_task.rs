//! # Dynamics task
//!
//! Each cycle of the dynamics task:
//!
//! 1. Reads the settings and route documents. On failure the last good values are held and the
//!    read retried next cycle.
//! 2. Runs the course regulator to get a steering command, unless dark mode is set in which case
//!    the previous command is held.
//! 3. Writes any change of the route goal back into the settings document.
//! 4. Integrates the vehicle model with the steering command and publishes the new state to the
//!    telemetry task.
//!
//! The settings write is a read-modify-write of the whole document. A change made by another
//! writer between this task's read and write is lost.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace, warn};
use store_if::{
    doc::{RouteDoc, SettingsDoc},
    load, save, DocStore, StoreError,
};
use util::module::State;

use crate::{
    course_reg::{self, ConfigError, ControlConfig, ControlMode},
    data_store::DataStore,
    vehicle::{self, SharedState, VehicleError},
};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DynTaskError {
    #[error("Could not load a document: {0}")]
    Store(StoreError),

    #[error("Invalid configuration: {0}")]
    Config(ConfigError),

    #[error("Vehicle integration failed: {0}")]
    Integration(VehicleError),

    #[error("The dynamics task has not been initialised")]
    NotInit,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Load the initial configuration and route.
///
/// Unlike during a cycle any problem with the documents is an error.
pub fn init(ds: &mut DataStore, store: &dyn DocStore) -> Result<(), DynTaskError> {
    let settings: SettingsDoc = load(store).map_err(DynTaskError::Store)?;
    let config = ControlConfig::from_settings(&settings, &ds.course_reg.params)
        .map_err(DynTaskError::Config)?;

    let route: RouteDoc = load(store).map_err(DynTaskError::Store)?;
    ds.course_reg
        .sync_route(&route.geometry.coordinates, config.goal_index)
        .map_err(DynTaskError::Config)?;

    ds.settings = Some(settings);
    ds.control_config = Some(config);
    ds.route = Some(route);

    // An out of range goal index will have been corrected
    persist_goal(ds, store);

    Ok(())
}

/// Execute one cycle of the dynamics task.
///
/// Only an integration failure is returned as an error, every other problem is logged and the
/// previous value held.
pub fn run_cycle(
    ds: &mut DataStore,
    store: &dyn DocStore,
    shared_state: &SharedState,
    dt_s: f64,
) -> Result<(), DynTaskError> {
    if ds.control_config.is_none() {
        return Err(DynTaskError::NotInit);
    }

    ds.cycle_start();

    // ---- DOCUMENT INPUT ----

    let mut store_ok = refresh_documents(ds, store);

    let config = ds.control_config.ok_or(DynTaskError::NotInit)?;

    // ---- COURSE REGULATION ----

    if config.dark_mode {
        trace!("Dark mode, holding steering at {}", ds.steering);
    } else {
        regulate(ds, config, dt_s);
    }

    store_ok &= persist_goal(ds, store);

    // ---- VEHICLE MODEL ----

    let (state, report) = ds
        .vehicle
        .proc(&vehicle::InputData {
            steering: ds.steering,
            dt_s,
        })
        .map_err(DynTaskError::Integration)?;
    ds.vehicle_status_rpt = report;

    *shared_state
        .lock()
        .expect("DynTask: shared vehicle state mutex poisoned") = Some(state);

    // ---- ARCHIVING ----

    if ds.course_reg_status_rpt.is_some() {
        ds.course_reg.archive();
    }
    ds.vehicle.archive();

    ds.store_access(store_ok);
    ds.cycle_end();

    Ok(())
}

/// Read the settings and route documents, keeping the previous values of anything that can't be
/// read or is invalid.
///
/// Returns false if a document could not be read.
fn refresh_documents(ds: &mut DataStore, store: &dyn DocStore) -> bool {
    let mut ok = true;

    match load::<SettingsDoc>(store) {
        Ok(settings) => {
            match ControlConfig::from_settings(&settings, &ds.course_reg.params) {
                Ok(c) => {
                    if ds.control_config.map(|p| p.mode) != Some(c.mode) {
                        debug!("Control mode is now {:?}", c.mode);
                    }
                    ds.control_config = Some(c);
                }
                Err(e) => warn!("Invalid settings, holding previous configuration: {}", e),
            }

            // The latest document is kept even if invalid, so that a goal write doesn't revert
            // the other changes made to it
            ds.settings = Some(settings);
        }
        Err(e) => {
            warn!("Could not read the settings, holding previous configuration: {}", e);
            ok = false;
        }
    }

    match load::<RouteDoc>(store) {
        Ok(route) => ds.route = Some(route),
        Err(e) => {
            warn!("Could not read the route, holding previous route: {}", e);
            ok = false;
        }
    }

    if let (Some(route), Some(config)) = (&ds.route, &ds.control_config) {
        if let Err(e) = ds
            .course_reg
            .sync_route(&route.geometry.coordinates, config.goal_index)
        {
            warn!("Invalid route, holding previous route: {}", e);
        }
    }

    ok
}

/// Run the course regulator, updating the steering command if it produces one.
fn regulate(ds: &mut DataStore, config: ControlConfig, dt_s: f64) {
    let position = match ds.vehicle.to_geodetic() {
        Ok(p) => p,
        Err(e) => {
            warn!("Could not get the vehicle position, holding steering: {}", e);
            ds.num_consec_reg_errors += 1;
            return;
        }
    };

    let input = course_reg::InputData {
        config,
        position,
        heading: ds.vehicle.state().heading,
        dt_s,
    };

    match ds.course_reg.proc(&input) {
        Ok((output, report)) => {
            ds.steering = output.steering;
            ds.course_reg_status_rpt = Some(report);
            ds.num_consec_reg_errors = 0;
        }
        Err(e) => {
            warn!("Course regulation failed, holding steering at {}: {}", ds.steering, e);
            ds.num_consec_reg_errors += 1;
        }
    }
}

/// Write a pending goal change into the settings document.
///
/// Returns false if the write failed, in which case it is retried next cycle.
fn persist_goal(ds: &mut DataStore, store: &dyn DocStore) -> bool {
    let goal = match ds.course_reg.pending_goal_update() {
        Some(g) => g,
        None => return true,
    };

    let settings = match ds.settings.as_mut() {
        Some(s) => s,
        None => return false,
    };

    // The reference location belongs to the user while the fixed location mode is active
    match ds.control_config.map(|c| c.mode) {
        Some(ControlMode::FixedLocation(_)) => settings.route.goal_index = goal.index as u64,
        _ => settings.set_goal(goal.index, goal.lat_deg, goal.lon_deg),
    }

    match save(store, &*settings) {
        Ok(()) => {
            ds.course_reg.goal_update_persisted(&goal);
            if let Some(c) = ds.control_config.as_mut() {
                c.goal_index = goal.index;
            }
            debug!("Goal {} written to the settings", goal.index);
            true
        }
        Err(e) => {
            warn!(
                "Could not write goal {} to the settings, retrying next cycle: {}",
                goal.index, e
            );
            false
        }
    }
}

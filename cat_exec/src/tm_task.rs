//! # Telemetry task
//!
//! The telemetry task runs on a background thread and periodically writes the latest vehicle
//! state, published by the dynamics task, into the telemetry document as a simulated GPS fix.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use store_if::{doc::TelemetryDoc, load, save, DocStore, StoreError};

use crate::{
    geodesy::{Geodetic, GeometryError},
    vehicle::{SharedState, VehicleState},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct TmTask {
    bg_jh: Option<JoinHandle<()>>,
    bg_run: Arc<AtomicBool>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TmTaskError {
    #[error("Could not start the background thread: {0}")]
    SpawnError(std::io::Error),

    #[error("The background thread panicked")]
    ThreadPanicked,

    #[error("Could not convert the vehicle position: {0}")]
    Geometry(GeometryError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmTask {
    /// Start the telemetry task.
    ///
    /// The telemetry document is updated every `period` with the latest state in `shared_state`,
    /// with positions relative to `reference`.
    pub fn start(
        store: Arc<dyn DocStore>,
        shared_state: SharedState,
        reference: Geodetic,
        period: Duration,
    ) -> Result<Self, TmTaskError> {
        let bg_run = Arc::new(AtomicBool::new(true));
        let bg_run_clone = bg_run.clone();

        let bg_jh = thread::Builder::new()
            .name("tm_task".into())
            .spawn(move || bg_thread(store, shared_state, reference, period, bg_run_clone))
            .map_err(TmTaskError::SpawnError)?;

        info!("Telemetry task started with a period of {:.2} s", period.as_secs_f64());

        Ok(Self {
            bg_jh: Some(bg_jh),
            bg_run,
        })
    }

    /// Stop the background thread and wait for it to finish.
    pub fn stop(&mut self) -> Result<(), TmTaskError> {
        self.bg_run.store(false, Ordering::Relaxed);

        match self.bg_jh.take() {
            Some(jh) => jh.join().map_err(|_| TmTaskError::ThreadPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for TmTask {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Error stopping the telemetry task: {}", e);
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Write the given vehicle state into the telemetry document.
///
/// Fields of the document other than the GPS location and course are preserved. A missing or
/// unreadable document is replaced.
pub fn publish(
    store: &dyn DocStore,
    state: &VehicleState,
    reference: &Geodetic,
) -> Result<TelemetryDoc, TmTaskError> {
    let position = crate::geodesy::enu_to_geodetic(state.x_m, state.y_m, 0.0, reference)
        .map_err(TmTaskError::Geometry)?;
    let course = state.heading.to_compass();

    let mut doc = match load::<TelemetryDoc>(store) {
        Ok(d) => d,
        Err(StoreError::NotFound(_)) => TelemetryDoc::new(position.lat.0, position.lon.0, course.0),
        Err(StoreError::ParseError(id, e)) => {
            warn!("Replacing unreadable {}: {}", id, e);
            TelemetryDoc::new(position.lat.0, position.lon.0, course.0)
        }
        Err(e) => return Err(TmTaskError::Store(e)),
    };

    doc.gps.location.latitude = position.lat.0;
    doc.gps.location.longitude = position.lon.0;
    doc.gps.course = course.0;

    save(store, &doc).map_err(TmTaskError::Store)?;

    Ok(doc)
}

/// Background thread, publishes the latest state every period.
fn bg_thread(
    store: Arc<dyn DocStore>,
    shared_state: SharedState,
    reference: Geodetic,
    period: Duration,
    run: Arc<AtomicBool>,
) {
    while run.load(Ordering::Relaxed) {
        let start = Instant::now();

        // Copy the state out so the lock isn't held during the write
        let state = *shared_state
            .lock()
            .expect("TmTask: shared vehicle state mutex poisoned");

        match state {
            Some(s) => match publish(store.as_ref(), &s, &reference) {
                Ok(doc) => debug!(
                    "Telemetry: ({:.6}, {:.6}) course {:.1}",
                    doc.gps.location.latitude, doc.gps.location.longitude, doc.gps.course
                ),
                Err(e) => warn!("Could not publish telemetry: {}", e),
            },
            None => debug!("No vehicle state to publish yet"),
        }

        if let Some(d) = period.checked_sub(start.elapsed()) {
            thread::sleep(d);
        }
    }
}

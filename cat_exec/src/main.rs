//! Main cat simulator executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Start the telemetry task on a background thread
//!     - Main loop (the dynamics task):
//!         - Settings and route acquisition
//!         - Course regulation
//!         - Route goal write back
//!         - Vehicle model integration
//!         - Vehicle state handoff to the telemetry task
//!
//! # Modules
//!
//! All modules (e.g. `course_reg`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{error, info, warn};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    thread,
    time::{Duration, Instant},
};
use structopt::StructOpt;

// Internal
use cat_lib::{
    course_reg::CourseReg,
    data_store::DataStore,
    dyn_task,
    geodesy::Geodetic,
    params::CatExecParams,
    tm_task::TmTask,
    vehicle::{self, SharedState, VehicleModel},
};
use store_if::{
    doc::TelemetryDoc,
    load,
    store::JsonFileStore,
    DocStore,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Simulates a steerable vehicle following a course or route.
#[derive(Debug, StructOpt)]
#[structopt(name = "cat_exec")]
struct Args {
    /// Directory holding the settings, route and telemetry documents. Overrides the directory
    /// given in the parameters.
    #[structopt(long, parse(from_os_str))]
    store_dir: Option<PathBuf>,

    /// Stop after this many cycles instead of running forever.
    #[structopt(long)]
    max_cycles: Option<u128>,

    /// Minimum log level, one of info, debug or trace.
    #[structopt(long, default_value = "debug")]
    log_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("cat_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(args.log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Cat Simulator Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: CatExecParams =
        util::params::load("cat_exec.toml").wrap_err("Could not load exec params")?;

    exec_params.validate().wrap_err("Invalid exec params")?;

    info!("Exec parameters loaded");

    // ---- OPEN THE STORE ----

    let store_dir = match args.store_dir {
        Some(d) => d,
        None if exec_params.store_dir.is_absolute() => exec_params.store_dir.clone(),
        None => host::get_cat_sw_root()
            .wrap_err("Could not resolve the store directory")?
            .join(&exec_params.store_dir),
    };
    info!("Using document store at {:?}", store_dir);

    let store: Arc<dyn DocStore> = Arc::new(JsonFileStore::new(&store_dir));

    // The vehicle starts at the position in the telemetry document, which is the origin of the
    // local frame for the whole run
    let telemetry: TelemetryDoc =
        load(store.as_ref()).wrap_err("Could not load the telemetry document")?;
    let reference = Geodetic::new(
        telemetry.gps.location.latitude,
        telemetry.gps.location.longitude,
        0.0,
    );
    info!(
        "Reference origin: ({:.6}, {:.6})",
        reference.lat.0, reference.lon.0
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    ds.course_reg
        .init("course_reg.toml", &session)
        .wrap_err_with(|| format!("Failed to initialise {}", CourseReg::NAME))?;
    info!("{} init complete", CourseReg::NAME);

    ds.vehicle
        .init(
            vehicle::InitData {
                params_path: "vehicle.toml",
                reference,
            },
            &session,
        )
        .wrap_err_with(|| format!("Failed to initialise {}", VehicleModel::NAME))?;
    info!("{} init complete", VehicleModel::NAME);

    dyn_task::init(&mut ds, store.as_ref())
        .wrap_err("Failed to load the initial settings and route")?;
    info!("Settings and route loaded");

    // ---- START TELEMETRY ----

    let shared_state: SharedState = Arc::new(Mutex::new(Some(ds.vehicle.state())));

    let mut tm_task = TmTask::start(
        store.clone(),
        shared_state.clone(),
        reference,
        Duration::from_secs_f64(exec_params.tm_period_s),
    )
    .wrap_err("Failed to start the telemetry task")?;

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- DYNAMICS ----

        if let Err(e) = dyn_task::run_cycle(
            &mut ds,
            store.as_ref(),
            &shared_state,
            exec_params.cycle_period_s,
        ) {
            error!("Dynamics task failed: {}", e);
            tm_task.stop().ok();
            return Err(e).wrap_err("Fatal error in the dynamics task");
        }

        if ds.num_consec_store_errors == exec_params.max_consec_store_errors {
            error!(
                "The document store has been unavailable for {} cycles",
                ds.num_consec_store_errors
            );
        }

        if ds.num_consec_reg_errors == exec_params.max_consec_reg_errors {
            error!(
                "No new steering command for {} cycles, the vehicle is holding {}",
                ds.num_consec_reg_errors, ds.steering
            );
        }

        if let Some(max) = args.max_cycles {
            if ds.num_cycles >= max {
                info!("Cycle limit of {} reached", max);
                break;
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;

                if ds.num_consec_cycle_overruns == exec_params.max_consec_cycle_overruns {
                    error!(
                        "More than {} consecutive cycle overruns, the simulation is running \
                        slower than real time",
                        exec_params.max_consec_cycle_overruns
                    );
                }
            }
        }
    }

    // ---- SHUTDOWN ----

    tm_task.stop().wrap_err("Failed to stop the telemetry task")?;

    info!("End of execution");

    Ok(())
}

//! Session logger
//!
//! Log records go to stdout with coloured level tags and to the session's log file as plain
//! text. Both carry the number of seconds elapsed since the session epoch.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{self, info, Level};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Most verbose level allowed for targets that log on every cycle.
///
/// The document store traces every load, several per dynamics cycle, and the dynamics task
/// traces every cycle spent in dark mode.
const TARGET_LEVEL_CAPS: [(&str, LevelFilter); 2] = [
    ("store_if", LevelFilter::Debug),
    ("cat_lib::dyn_task", LevelFilter::Debug),
];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this session.
///
/// `min_level` must be `Info` or more verbose, warnings and errors are never hidden.
///
/// Only the first call in a process can succeed.
pub fn logger_init(
    min_level: LevelFilter,
    session: &session::Session,
) -> Result<(), LoggerInitError> {
    check_min_level(min_level)?;

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let stdout = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:10.3} {}] {}",
                session::get_elapsed_seconds(),
                level_tag(record.level()),
                record_body(record.level(), record.target(), message)
            ))
        })
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{:.6} {:5} {}",
                session::get_elapsed_seconds(),
                record.level(),
                record_body(record.level(), record.target(), message)
            ))
        })
        .chain(log_file);

    let mut dispatch = fern::Dispatch::new().level(min_level);
    for (target, cap) in TARGET_LEVEL_CAPS.iter() {
        dispatch = dispatch.level_for(*target, target_level(min_level, *cap));
    }

    dispatch
        .chain(stdout)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("---- {} ----", session_name(session));
    info!("Session epoch: {}", session::get_epoch());
    info!("Log level: {:?}", min_level);
    for (target, cap) in TARGET_LEVEL_CAPS.iter() {
        if *cap < min_level {
            info!("    {} limited to {:?}", target, cap);
        }
    }
    info!("Log file: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_min_level(min_level: LevelFilter) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        Err(LoggerInitError::InvalidMinLogLevel(min_level))
    } else {
        Ok(())
    }
}

/// Level applied to a capped target.
fn target_level(min_level: LevelFilter, cap: LevelFilter) -> LevelFilter {
    min_level.min(cap)
}

/// Debug and trace records carry their target, info and above are shown bare.
fn record_body(level: Level, target: &str, message: &std::fmt::Arguments) -> String {
    if level > Level::Info {
        format!("{}: {}", target, message)
    } else {
        message.to_string()
    }
}

/// Name of the session directory, e.g. `cat_exec_20201010_101010`.
fn session_name(session: &session::Session) -> String {
    session
        .session_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("session"))
}

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info => "INF".normal(),
        Level::Warn => "WRN".yellow(),
        Level::Error => "ERR".red().bold(),
    }
}

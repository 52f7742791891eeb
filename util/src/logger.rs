//! Session logger
//!
//! Everything at or above the minimum level goes to the session log file.
//! The console gets the same stream, minus whatever the console filters
//! quieten (the target sampler logs every draw at `debug`, which swamps the
//! controller's output on a terminal).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{self, info};
use std::fmt::Display;
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A console only level override for one log target (a module path such as
/// `ik_lib::target_sampler`).
pub type ConsoleFilter = (&'static str, LevelFilter);

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Lines are prefixed by the seconds since the session epoch. `console_filters`
/// only apply to stdout, the log file always gets everything at or above
/// `min_level`.
///
/// # Notes
///
/// - `min_level` must be at least `log::Level::Info`, so that the start up
///   banner is never filtered out.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    min_level: LevelFilter,
    console_filters: &[ConsoleFilter],
    session: &session::Session,
) -> Result<(), LoggerInitError> {
    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(session.log_file_path.clone()).map_err(LoggerInitError::LogFileInitError)?;

    let console = console_filters
        .iter()
        .fold(fern::Dispatch::new().level(min_level), |d, (target, level)| {
            d.level_for(*target, *level)
        })
        .chain(std::io::stdout());

    let file = fern::Dispatch::new().level(min_level).chain(log_file);

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_line(
                    session::get_elapsed_seconds(),
                    record.level(),
                    record.target(),
                    message
                )
            ))
        })
        .chain(console)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    for (target, level) in console_filters {
        info!("    Console level for {}: {:?}", target, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Build one log line. Debug and trace lines carry their target.
fn format_line(elapsed_s: f64, level: log::Level, target: &str, message: impl Display) -> String {
    if level > log::Level::Info {
        format!(
            "[{:10.6} {}] {}: {}",
            elapsed_s,
            level_to_str(level),
            target,
            message
        )
    } else {
        format!("[{:10.6} {}] {}", elapsed_s, level_to_str(level), message)
    }
}

/// Get the string representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info => "INF".normal(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold(),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_format_line() {
        colored::control::set_override(false);

        assert_eq!(
            format_line(1.5, log::Level::Info, "ik_lib::ik_ctrl", "hello"),
            "[  1.500000 INF] hello"
        );
        assert_eq!(
            format_line(1.5, log::Level::Debug, "ik_lib::ik_ctrl", "hello"),
            "[  1.500000 DBG] ik_lib::ik_ctrl: hello"
        );
        assert_eq!(
            format_line(12.25, log::Level::Warn, "ik_exec", format_args!("{} s", 3)),
            "[ 12.250000 WRN] 3 s"
        );
    }
}

//! Initialisation and configuration of the program logger.
//!
//! The logger writes coloured, timestamped messages to the console and, when an output directory
//! is given, plain-text copies to an info log and a debug log in that directory.
use anyhow::{Context, Result};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record};
use std::env;
use std::fmt::{Arguments, Display};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::OnceLock;

/// The default log level for the program.
///
/// Used as a fallback if the user hasn't specified something else with the `DACPLAN_LOG_LEVEL`
/// environment variable or the settings file.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable which overrides the log level in the settings file
const LOG_LEVEL_ENV_VAR: &str = "DACPLAN_LOG_LEVEL";

/// The file name for the log file containing messages at info level and above
const LOG_INFO_FILE_NAME: &str = "dacplan_info.log";

/// The file name for the log file containing all messages
const LOG_DEBUG_FILE_NAME: &str = "dacplan_debug.log";

/// Used to ensure that the logger is only initialised once
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Parse a log level from a string, case-insensitively
fn parse_log_level(level: &str) -> Result<LevelFilter> {
    level
        .parse()
        .with_context(|| format!("Unknown log level: {level}"))
}

/// Initialise the program logger using the `fern` logging library.
///
/// The user can specify their preferred logging level via the settings file or the
/// `DACPLAN_LOG_LEVEL` environment variable (which takes precedence).
///
/// # Arguments
///
/// * `log_level_from_settings` - The log level specified in the settings file
/// * `log_file_path` - Folder in which to save log files. If `None`, no files are written.
pub fn init(log_level_from_settings: &str, log_file_path: Option<&Path>) -> Result<()> {
    // The logger can only be initialised once per process (relevant for tests)
    if is_logger_initialised() {
        return Ok(());
    }

    let log_level = env::var(LOG_LEVEL_ENV_VAR)
        .unwrap_or_else(|_| log_level_from_settings.to_string());
    let log_level = parse_log_level(&log_level)?;

    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);
    let use_colour = std::io::stdout().is_terminal();

    let console = Dispatch::new()
        .format(move |out, message, record| {
            if use_colour {
                write_log(out, colours.color(record.level()), record.target(), message);
            } else {
                write_log(out, record.level(), record.target(), message);
            }
        })
        .level(log_level)
        .chain(std::io::stdout());

    let mut dispatch = Dispatch::new().chain(console);

    if let Some(log_file_path) = log_file_path {
        let info_file = Dispatch::new()
            .format(write_plain_log)
            .level(log_level.min(LevelFilter::Info))
            .chain(fern::log_file(log_file_path.join(LOG_INFO_FILE_NAME))?);
        let debug_file = Dispatch::new()
            .format(write_plain_log)
            .level(LevelFilter::Debug)
            .chain(fern::log_file(log_file_path.join(LOG_DEBUG_FILE_NAME))?);
        dispatch = dispatch.chain(info_file).chain(debug_file);
    }

    dispatch.apply()?;
    LOGGER_INIT.set(()).ok();

    Ok(())
}

/// Write a log message without colour
fn write_plain_log(out: FormatCallback, message: &Arguments, record: &Record) {
    write_log(out, record.level(), record.target(), message);
}

/// Write a log message with a timestamp, level and target
fn write_log<T: Display>(out: FormatCallback, level: T, target: &str, message: &Arguments) {
    let timestamp = Local::now().format("%H:%M:%S");

    out.finish(format_args!("[{timestamp} {level} {target}] {message}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;

    #[rstest]
    #[case("off", LevelFilter::Off)]
    #[case("WARN", LevelFilter::Warn)]
    #[case("Info", LevelFilter::Info)]
    #[case("trace", LevelFilter::Trace)]
    #[case("DEBUG", LevelFilter::Debug)]
    fn parse_log_level_works(#[case] input: &str, #[case] expected: LevelFilter) {
        assert_eq!(parse_log_level(input).unwrap(), expected);
    }

    #[test]
    fn parse_log_level_unknown() {
        assert_error!(parse_log_level("loud"), "Unknown log level: loud");
    }
}

//! The solvers only talk to the `log` facade and never print. A host program that wants
//! to see the messages installs a logger once, e.g.
//! ```rust
//! use RustedLinSys::Utils::logger::{init_logger, parse_log_level};
//! let level = parse_log_level("warn").unwrap();
//! init_logger(level, None);
//! ```
use chrono::Local;
use log::warn;
use simplelog::*;
use std::fs::File;
use std::io;

/// "debug", "info", "warn", "error", "off"/"none"; anything else is None
pub fn parse_log_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "off" | "none" => Some(LevelFilter::Off),
        _ => None,
    }
}

/// timestamped name for a log file, like "gauss_2025-01-31_12-00-00.txt"
pub fn log_file_name(prefix: &str) -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("{}_{}.txt", prefix, date_and_time)
}

/// File logger writing to a freshly created `filename`
pub fn file_logger(level: LevelFilter, filename: &str) -> io::Result<Box<dyn SharedLogger>> {
    let file = File::create(filename)?;
    let logger: Box<dyn SharedLogger> = WriteLogger::new(level, Config::default(), file);
    Ok(logger)
}

/// Installs a terminal logger and, if `log_file` is given, a file logger.
/// A log file that cannot be created is reported through the installed terminal logger.
/// Returns false if no logger was installed (level off, or a logger already exists).
pub fn init_logger(level: LevelFilter, log_file: Option<&str>) -> bool {
    if level == LevelFilter::Off {
        return false;
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));
    let file_error = match log_file.map(|filename| file_logger(level, filename)) {
        Some(Ok(logger)) => {
            loggers.push(logger);
            None
        }
        Some(Err(e)) => Some(e),
        None => None,
    };
    let installed = CombinedLogger::init(loggers).is_ok();
    if let (Some(e), Some(filename)) = (file_error, log_file) {
        warn!("cannot create log file {}: {}", filename, e);
    }
    installed
}

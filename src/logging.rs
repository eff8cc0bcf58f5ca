//! Logging setup for applications embedding the project tree
//!
//! The engine itself only uses the `log` facade. Hosts that have no logger
//! of their own can call [`init_logging`], which logs to the terminal and
//! to a file at `<log dir>/disc-project-tree.log`.

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

const LOG_FILE: &str = "disc-project-tree.log";

/// Rotate the log once it grows past this size
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Get the log directory path
/// On macOS: ~/Library/Logs/Disc-Project-Tree/
pub fn get_log_directory() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Logs").join("Disc-Project-Tree"))
    } else {
        dirs::data_local_dir().map(|d| d.join("Disc-Project-Tree").join("logs"))
    }
}

/// Get the current log file path
pub fn get_log_file_path() -> Option<PathBuf> {
    get_log_directory().map(|d| d.join(LOG_FILE))
}

fn log_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .build()
}

/// Initialize terminal and file logging
///
/// `level` applies to the terminal; the file always captures debug and
/// above. Returns the path to the log file, or `None` if only terminal
/// logging could be set up.
pub fn init_logging(level: LevelFilter) -> Option<PathBuf> {
    let Some(log_dir) = get_log_directory() else {
        eprintln!("Warning: Could not determine log directory");
        init_terminal_logging(level);
        return None;
    };

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        init_terminal_logging(level);
        return None;
    }

    let log_path = log_dir.join(LOG_FILE);

    if let Ok(metadata) = fs::metadata(&log_path) {
        if metadata.len() > MAX_LOG_BYTES {
            let _ = fs::rename(&log_path, log_dir.join(format!("{}.old", LOG_FILE)));
        }
    }

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file: {}", e);
            init_terminal_logging(level);
            return None;
        }
    };

    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(level, log_config(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(LevelFilter::Debug, log_config(), log_file),
    ];

    if CombinedLogger::init(loggers).is_err() {
        eprintln!("Warning: Logger already initialized");
    }

    log::info!("Log file: {}", log_path.display());
    Some(log_path)
}

/// Initialize terminal-only logging
///
/// Does nothing if a logger is already installed, so tests can call it
/// repeatedly.
pub fn init_terminal_logging(level: LevelFilter) {
    let term_logger = TermLogger::new(level, log_config(), TerminalMode::Mixed, ColorChoice::Auto);
    let _ = CombinedLogger::init(vec![term_logger]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_log_directory_returns_path() {
        let dir = get_log_directory();
        assert!(dir.is_some(), "Should return a log directory path");

        let path = dir.unwrap();
        assert!(
            path.to_string_lossy().contains("Disc-Project-Tree"),
            "Path should contain crate name"
        );
    }

    #[test]
    fn test_log_file_path_is_inside_log_directory() {
        let dir = get_log_directory().unwrap();
        let file = get_log_file_path().unwrap();

        assert!(file.starts_with(&dir), "Log file should be inside log directory");
        assert!(file.to_string_lossy().ends_with(LOG_FILE));
    }

    #[test]
    fn test_init_terminal_logging_twice() {
        init_terminal_logging(LevelFilter::Warn);
        init_terminal_logging(LevelFilter::Warn);
        log::debug!("still fine");
    }
}

//! Log writer module
//!
//! Provides thread-safe log writing to files or stdout/stderr.
//! Log files can be reopened at runtime for rotation.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    /// Write to stdout
    Stdout,
    /// Write to stderr
    Stderr,
    /// Write to file
    File(Mutex<File>),
}

/// Thread-safe log writer
pub struct LogWriter {
    /// Access log target
    access: Mutex<LogTarget>,
    /// Error log target
    error: Mutex<LogTarget>,
}

impl LogWriter {
    /// Create a new log writer with optional file paths
    fn new(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        let access = open_target(access_log_file, LogTarget::Stdout)?;
        let error = open_target(error_log_file, LogTarget::Stderr)?;

        Ok(Self {
            access: Mutex::new(access),
            error: Mutex::new(error),
        })
    }

    /// Write to access log
    pub fn write_access(&self, message: &str) {
        if let Ok(target) = self.access.lock() {
            write_to_target(&target, message);
        }
    }

    /// Write to error log
    pub fn write_error(&self, message: &str) {
        if let Ok(target) = self.error.lock() {
            write_to_target(&target, message);
        }
    }

    /// Write info message (to access log target)
    pub fn write_info(&self, message: &str) {
        self.write_access(message);
    }

    /// Reopen the access log target (after rotation moved the old file)
    pub fn set_access_log_file(&self, path: Option<&str>) -> io::Result<()> {
        let next = open_target(path, LogTarget::Stdout)?;
        replace_target(&self.access, next);
        Ok(())
    }

    /// Reopen the error log target (after rotation moved the old file)
    pub fn set_error_log_file(&self, path: Option<&str>) -> io::Result<()> {
        let next = open_target(path, LogTarget::Stderr)?;
        replace_target(&self.error, next);
        Ok(())
    }
}

/// Open `path` as a file target, or use `fallback` when unset
fn open_target(path: Option<&str>, fallback: LogTarget) -> io::Result<LogTarget> {
    match path {
        Some(p) => Ok(LogTarget::File(Mutex::new(open_log_file(p)?))),
        None => Ok(fallback),
    }
}

fn replace_target(slot: &Mutex<LogTarget>, next: LogTarget) {
    match slot.lock() {
        Ok(mut target) => *target = next,
        Err(poisoned) => *poisoned.into_inner() = next,
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Write message to log target
fn write_to_target(target: &LogTarget, message: &str) {
    match target {
        LogTarget::Stdout => {
            println!("{message}");
        }
        LogTarget::Stderr => {
            eprintln!("{message}");
        }
        LogTarget::File(file) => {
            if let Ok(mut f) = file.lock() {
                let _ = writeln!(f, "{message}");
            }
        }
    }
}

/// Initialize the global log writer
///
/// This should be called once at application startup.
/// Returns error if log files cannot be opened.
pub fn init(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, `None` before `init()`
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

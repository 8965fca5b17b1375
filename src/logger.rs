//! Session logger. One log file in the platform data directory, truncated
//! at each launch so it only holds the most recent session. Use the
//! `log_info!` / `log_warn!` / `log_err!` macros anywhere in the crate; a
//! panic hook mirrors panic messages into the file before the default
//! handler runs.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

static LOG_FILE: OnceLock<Mutex<File>> = OnceLock::new();
static ECHO_STDERR: OnceLock<bool> = OnceLock::new();

/// Write a timestamped, level-tagged line. I/O errors are swallowed so
/// logging can never take the editor down.
pub fn write(level: &str, msg: &str) {
    let line = format!("[{}] [{}] {}", timestamp(), level, msg);
    if ECHO_STDERR.get().copied().unwrap_or(false) {
        eprintln!("{}", line);
    }
    if let Some(mutex) = LOG_FILE.get()
        && let Ok(mut file) = mutex.lock()
    {
        let _ = writeln!(file, "{}", line);
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write("INFO", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write("WARN", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write("ERROR", &format!($($arg)*));
    };
}

/// Initialise the session logger: truncate the log file and install the
/// panic hook. Call once, before anything logs. With `echo_stderr` set,
/// every line is also printed to stderr.
pub fn init(echo_stderr: bool) {
    let _ = ECHO_STDERR.set(echo_stderr);

    let path = log_file_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).write(true).truncate(true).open(&path) {
        Ok(file) => {
            let _ = LOG_FILE.set(Mutex::new(file));
        }
        Err(e) => {
            // Not fatal, the editor just runs without a log file.
            eprintln!("[logger] couldn't open {}: {}", path.display(), e);
            return;
        }
    }

    write("INFO", &format!("pixed session log, {}", path.display()));

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write("PANIC", &info.to_string());
        prev(info);
    }));
}

fn log_file_path() -> PathBuf {
    crate::config::data_dir().join("pixed").join("pixed.log")
}

/// HH:MM:SS within the current day; plenty for a per-session log.
fn timestamp() -> String {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => {
            let secs = d.as_secs();
            format!(
                "{:02}:{:02}:{:02}",
                (secs % 86400) / 3600,
                (secs % 3600) / 60,
                secs % 60
            )
        }
        Err(_) => "??:??:??".to_string(),
    }
}

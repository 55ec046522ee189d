//! Activity log.
//!
//! An optional append-only file recording what changed the snippet store
//! (saves, drafts, imports, deletions), one timestamped line per event.
//! Diagnostics go through the `log` facade instead.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};

use chrono::{SecondsFormat, Utc};

/// Thread-safe handle to an append-only log file.
pub type LogHandle = Arc<Mutex<Option<File>>>;

/// Current UTC time as ISO 8601 with milliseconds (e.g. 2026-02-04T10:15:30.123Z).
fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Write a timestamped line to the log file (if present).
pub fn log_line(handle: &LogHandle, action: &str, detail: &str) {
    if let Ok(mut guard) = handle.lock() {
        if let Some(ref mut file) = *guard {
            let _ = writeln!(file, "[{}] {}: {}", utc_timestamp(), action, detail);
            let _ = file.flush();
        }
    }
}

/// Open (or create) `{log_dir}/{log_id}.log`. Without a directory, or if the
/// file cannot be opened, the handle is inert.
pub fn open_log_file(log_dir: Option<&Path>, log_id: &str) -> LogHandle {
    let file = log_dir.and_then(|dir| {
        std::fs::create_dir_all(dir).ok()?;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("{log_id}.log")))
        {
            Ok(file) => Some(file),
            Err(e) => {
                log::warn!("Failed to open activity log in {}: {}", dir.display(), e);
                None
            }
        }
    });
    Arc::new(Mutex::new(file))
}

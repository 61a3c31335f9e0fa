//! Per-query trace files.
//!
//! Every client-originated recursive query gets its own trace file,
//! `log-<client id>.txt`, created on demand and appended to as the query
//! walks the delegation chain. Stale files from previous runs are removed
//! at startup. Trace I/O never fails a query; write errors are reported on
//! the server log and swallowed.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Writer for per-query trace files.
#[derive(Debug, Clone)]
pub struct QueryLog {
    /// Directory the trace files live in.
    dir: PathBuf,
}

impl QueryLog {
    /// Creates a query log writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Removes `log-*.txt` files left over from a previous run.
    pub fn clean(&self) {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "cannot scan query log directory");
                return;
            }
        };

        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };

            if file_name.starts_with("log-") && file_name.ends_with(".txt") {
                if let Err(e) = std::fs::remove_file(entry.path()) {
                    warn!(file = file_name, error = %e, "cannot remove stale query log");
                }
            }
        }
    }

    /// Appends a timestamped line to the trace file for `client_id`.
    pub fn append(&self, client_id: u16, line: impl AsRef<str>) {
        let path = self.path_for(client_id);
        let stamp = Local::now().format("[%H:%M:%S%.3f] ");

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| writeln!(file, "{stamp}{}", line.as_ref()));

        if let Err(e) = result {
            warn!(file = %path.display(), error = %e, "cannot write query log");
        }
    }

    /// Returns the trace file path for a client id.
    pub fn path_for(&self, client_id: u16) -> PathBuf {
        self.dir.join(format!("log-{client_id}.txt"))
    }

    /// Returns the trace directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

//! # Corpus Read Progress
//!
//! Event-driven progress signalling for one corpus read. The record is a
//! scoped resource owned by the driver; producers hold a borrow and update
//! it as chunks land and files complete. The driver blocks on the condition
//! variable rather than polling.

use parking_lot::{Condvar, Mutex};

/// A point-in-time copy of the progress record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Total bytes across all input files, measured up front.
    pub total_bytes: u64,

    /// Bytes pushed through the work queue so far.
    pub bytes_read: u64,

    /// Number of files fully processed (skipped files included).
    pub files_completed: usize,

    /// Name of the most recently completed file.
    pub last_file_completed: Option<String>,
}

impl ProgressSnapshot {
    /// Bytes read as a percentage of the total; zero for an empty corpus.
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.bytes_read as f64 / self.total_bytes as f64 * 100.0
        }
    }
}

#[derive(Debug, Default)]
struct ProgressState {
    bytes_read: u64,
    files_completed: usize,
    last_file_completed: Option<String>,
}

/// Shared progress record for one corpus read.
#[derive(Debug)]
pub struct ProgressTracker {
    total_bytes: u64,
    state: Mutex<ProgressState>,
    cond: Condvar,
}

impl ProgressTracker {
    /// Create a tracker for a corpus totalling `total_bytes`.
    pub fn new(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            state: Mutex::new(ProgressState::default()),
            cond: Condvar::new(),
        }
    }

    /// Record bytes pushed to the work queue. Does not wake the driver;
    /// only file completion does.
    pub fn add_bytes(
        &self,
        bytes: u64,
    ) {
        self.state.lock().bytes_read += bytes;
    }

    /// Record one completed file and wake the driver.
    pub fn file_completed(
        &self,
        name: &str,
    ) {
        let mut state = self.state.lock();
        state.files_completed += 1;
        state.last_file_completed = Some(name.to_owned());
        self.cond.notify_all();
    }

    /// Block until more than `seen` files have completed.
    ///
    /// ## Returns
    /// A snapshot taken after the wakeup.
    pub fn wait_newer(
        &self,
        seen: usize,
    ) -> ProgressSnapshot {
        let mut state = self.state.lock();
        while state.files_completed <= seen {
            self.cond.wait(&mut state);
        }
        ProgressSnapshot {
            total_bytes: self.total_bytes,
            bytes_read: state.bytes_read,
            files_completed: state.files_completed,
            last_file_completed: state.last_file_completed.clone(),
        }
    }

    /// Take a snapshot without waiting.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.state.lock();
        ProgressSnapshot {
            total_bytes: self.total_bytes,
            bytes_read: state.bytes_read,
            files_completed: state.files_completed,
            last_file_completed: state.last_file_completed.clone(),
        }
    }
}

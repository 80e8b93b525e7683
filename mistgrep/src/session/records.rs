//! Collected session results: per-file records and the final report.

use std::fmt;
use std::time::Duration;

/// One discovered candidate log file and its match bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileRecord {
    /// Remote path, unique within the session.
    pub path: String,

    /// Line count reported by the remote counting command. Stays at zero
    /// when the count output could not be parsed.
    pub device_count: u64,

    /// Lines actually extracted locally.
    pub extracted_count: u64,

    /// Set once the extraction step has processed this file. Never unset;
    /// a flagged record is skipped on re-entry.
    pub done: bool,
}

impl LogFileRecord {
    /// Fresh record for a just-discovered path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            device_count: 0,
            extracted_count: 0,
            done: false,
        }
    }

    /// Whether extraction recovered fewer lines than the device reported.
    pub fn shortfall(&self) -> bool {
        self.done && self.extracted_count < self.device_count
    }
}

impl fmt::Display for LogFileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, extracted {}, done: {}",
            self.path, self.device_count, self.extracted_count, self.done
        )
    }
}

/// Everything a completed session collected.
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    /// File inventory in discovery order.
    pub files: Vec<LogFileRecord>,

    /// Matched log lines in order of appearance.
    pub lines: Vec<String>,

    /// Wall-clock time the script took.
    pub elapsed: Duration,
}

impl SessionReport {
    /// Records whose extraction under-delivered.
    pub fn shortfalls(&self) -> impl Iterator<Item = &LogFileRecord> {
        self.files.iter().filter(|record| record.shortfall())
    }

    /// Sum of the device-reported counts.
    pub fn expected_total(&self) -> u64 {
        self.files.iter().map(|record| record.device_count).sum()
    }
}

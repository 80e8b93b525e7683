//! Session orchestration.
//!
//! A [`Session`] owns a transport for its whole lifetime and drives a
//! fixed script against the remote shell: wait for the initial prompt,
//! list the log files, count the matches in each, pull the matching
//! lines from each, then exit. The outcome is a [`SessionReport`] with
//! one [`LogFileRecord`] per discovered file plus every matched line in
//! order of appearance.

mod machine;
mod records;
mod script;

pub use machine::{
    DEFAULT_DIR_PREFIX, DEFAULT_FILE_PATTERN, DEFAULT_READ_TIMEOUT, DEFAULT_SESSION_TIMEOUT,
    Session, SessionOptions,
};
pub use records::{LogFileRecord, SessionReport};
pub use script::SessionState;

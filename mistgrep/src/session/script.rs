//! Session states and the fixed command script.

use std::fmt;

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the remote shell to present its first prompt.
    AwaitingInitialPrompt,

    /// Listing candidate log files.
    ListingFiles,

    /// Fetching the authoritative match count, file by file.
    CountingPerFile,

    /// Fetching and filtering matching lines, file by file.
    ExtractingPerFile,

    /// Sending `exit` and closing the transport.
    Closing,

    /// Terminal state; reached exactly once.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::AwaitingInitialPrompt => "awaiting initial prompt",
            SessionState::ListingFiles => "listing files",
            SessionState::CountingPerFile => "counting per file",
            SessionState::ExtractingPerFile => "extracting per file",
            SessionState::Closing => "closing",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// One step of the fixed script.
///
/// `SCRIPT` is the execution order; each step maps to the state the machine
/// holds while running it. Adding a step means one new variant, one entry
/// in the table, and one handler arm in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScriptStep {
    AwaitPrompt,
    ListFiles,
    CountMatches,
    CollectMatches,
    Exit,
}

impl ScriptStep {
    /// The full script, in order.
    pub(crate) const SCRIPT: [ScriptStep; 5] = [
        ScriptStep::AwaitPrompt,
        ScriptStep::ListFiles,
        ScriptStep::CountMatches,
        ScriptStep::CollectMatches,
        ScriptStep::Exit,
    ];

    /// The state the machine holds while running this step.
    pub(crate) fn state(self) -> SessionState {
        match self {
            ScriptStep::AwaitPrompt => SessionState::AwaitingInitialPrompt,
            ScriptStep::ListFiles => SessionState::ListingFiles,
            ScriptStep::CountMatches => SessionState::CountingPerFile,
            ScriptStep::CollectMatches => SessionState::ExtractingPerFile,
            ScriptStep::Exit => SessionState::Closing,
        }
    }
}

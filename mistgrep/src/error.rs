//! Error types for mistgrep.

use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::session::SessionState;

/// Main error type for mistgrep operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration/environment errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Shell-endpoint API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// WebSocket transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Session-level errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// I/O error (report writing)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration layer errors (environment resolution).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required setting is absent or empty
    #[error("Missing required setting '{0}'")]
    Missing(&'static str),

    /// A setting is present but unparseable
    #[error("Invalid value for '{name}': {value:?}")]
    Invalid { name: &'static str, value: String },

    /// The console host has no known API mapping
    #[error("Host {0:?} must start with 'api.' or 'manage.'")]
    UnsupportedHost(String),
}

/// Shell-endpoint API errors (the one-shot HTTPS call).
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request construction or transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("Shell endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Transport layer errors (WebSocket connection).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to complete the WebSocket handshake
    #[error("Connection failed: {source}")]
    ConnectionFailed {
        #[source]
        source: tungstenite::Error,
    },

    /// Connect did not finish in time
    #[error("Connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// WebSocket protocol error while sending or receiving
    #[error("WebSocket error: {0}")]
    Ws(#[from] tungstenite::Error),

    /// Peer closed the connection
    #[error("Connection closed by peer")]
    Closed,
}

/// Channel layer errors (prompt waiting, dispatch).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Underlying transport failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// No prompt within the per-read timeout
    #[error("Prompt not seen within {0:?}")]
    PromptTimeout(Duration),

    /// The overall session deadline elapsed mid-read
    #[error("Session deadline exceeded")]
    DeadlineExceeded,

    /// Channel used after close
    #[error("Channel closed")]
    Closed,

    /// Invalid regex pattern
    #[error("Invalid prompt pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Session layer errors, carrying the state (and file) where the script died.
#[derive(Error, Debug)]
pub enum SessionError {
    /// A read or the whole session ran out of time
    #[error("Timed out during {} after {limit:?}", location(.state, .file))]
    Timeout {
        state: SessionState,
        file: Option<String>,
        limit: Duration,
    },

    /// A read or write failed mid-script
    #[error("Failed during {}: {source}", location(.state, .file))]
    Protocol {
        state: SessionState,
        file: Option<String>,
        source: ChannelError,
    },
}

fn location(state: &SessionState, file: &Option<String>) -> String {
    match file {
        Some(path) => format!("{state} ({path})"),
        None => state.to_string(),
    }
}

/// Result type alias using mistgrep's Error.
pub type Result<T> = std::result::Result<T, Error>;

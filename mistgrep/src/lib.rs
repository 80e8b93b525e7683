//! # mistgrep
//!
//! Async WebSocket CLI scraper that pulls filtered log excerpts out of
//! Mist-managed Junos device shells.
//!
//! mistgrep drives a fixed script against a device shell reached through
//! the Mist cloud: it asks the REST API for a shell endpoint, attaches to
//! the returned WebSocket, waits for the Junos prompt, lists the syslog
//! files, counts the lines matching a pattern in each, extracts those
//! lines, and exits cleanly.
//!
//! ## Features
//!
//! - Shell-endpoint provisioning against the Mist REST API via reqwest
//! - WebSocket shell transport via tokio-tungstenite
//! - Prompt detection over an unbounded, arbitrarily-chunked byte stream
//! - Per-read timeouts plus an overall session deadline
//! - Structured per-file results with device-side counts to check
//!   extraction completeness against
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mistgrep::{ApiClient, Session, SessionOptions, WsTransport};
//! use secrecy::SecretString;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mistgrep::Error> {
//!     let api = ApiClient::new(
//!         "https://api.mist.com",
//!         SecretString::from("api-token".to_owned()),
//!     )?;
//!     let endpoint = api.shell_endpoint("site-id", "device-id").await?;
//!
//!     let transport = WsTransport::connect(&endpoint.url, Duration::from_secs(30)).await?;
//!     let report = Session::new(transport, SessionOptions::new("ERROR"))
//!         .run()
//!         .await?;
//!
//!     for line in &report.lines {
//!         println!("{line}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod channel;
pub mod config;
pub mod error;
pub mod extract;
pub mod report;
pub mod session;
pub mod transport;

// Re-export main types for convenience
pub use api::{ApiClient, ShellEndpoint};
pub use channel::{ShellChannel, ShellPrompt};
pub use config::Config;
pub use error::{Error, Result};
pub use session::{LogFileRecord, Session, SessionOptions, SessionReport, SessionState};
pub use transport::{CloseStatus, Transport, WsTransport};

//! Transport layer: the byte channel the session drives.
//!
//! The session never touches the wire directly; it sends framed commands,
//! receives chunks, and closes with a status. The production implementation
//! is the Mist cloud WebSocket ([`WsTransport`]); tests substitute scripted
//! in-memory transports through the [`Transport`] trait.

mod ws;

pub use ws::WsTransport;

use std::future::Future;

use bytes::Bytes;

use crate::error::TransportError;

/// Close status signalled to the peer at session end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseStatus {
    /// Orderly shutdown after the script completed.
    Normal,

    /// Abort after a fatal session error.
    Error,
}

/// Trait for bidirectional byte-stream transports.
pub trait Transport: Send {
    /// Write one framed message to the peer.
    fn send(&mut self, frame: Bytes) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receive the next available chunk.
    ///
    /// An empty chunk means "nothing usable yet" (keepalive traffic); the
    /// reader skips it. A peer close surfaces [`TransportError::Closed`].
    fn recv(&mut self) -> impl Future<Output = Result<Bytes, TransportError>> + Send;

    /// Close the connection with the given status.
    fn close(
        &mut self,
        status: CloseStatus,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

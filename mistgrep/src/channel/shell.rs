//! Shell channel: command dispatch and read-until-prompt over a transport.
//!
//! The channel is half-duplex by construction. Callers dispatch one framed
//! command, then read until a prompt predicate confirms the output is
//! complete. Every receive is bounded by the per-read timeout, and an
//! optional session deadline caps the whole exchange; a stalled remote
//! surfaces an error instead of spinning.

use std::time::{Duration, Instant};

use log::{debug, warn};

use super::buffer::OutputBuffer;
use super::frame::CommandFrame;
use crate::error::ChannelError;
use crate::transport::{CloseStatus, Transport};

/// Bidirectional shell channel over a [`Transport`].
///
/// Owns the transport exclusively; the transport is closed exactly once,
/// either by [`close`](Self::close) or never (dropping an open channel logs
/// a warning, since the remote end is left dangling).
pub struct ShellChannel<T> {
    /// The underlying transport.
    transport: T,

    /// Accumulates decoded output between dispatches.
    buffer: OutputBuffer,

    /// Upper bound for each individual receive.
    read_timeout: Duration,

    /// Set once `close` has run; all further operations fail fast.
    closed: bool,
}

impl<T: Transport> ShellChannel<T> {
    /// Create a channel with the given per-read timeout.
    pub fn new(transport: T, read_timeout: Duration) -> Self {
        Self {
            transport,
            buffer: OutputBuffer::new(),
            read_timeout,
            closed: false,
        }
    }

    /// Frame and send one command. No response is awaited here.
    pub async fn dispatch(&mut self, command: &str) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }

        debug!("sending: {command}");
        let frame = CommandFrame::new(command);
        self.transport.send(frame.into_bytes()).await?;
        Ok(())
    }

    /// Read chunks until `predicate` holds on the accumulated text, then
    /// return the full buffer.
    ///
    /// Empty chunks (keepalives) are skipped. Each receive is bounded by
    /// the per-read timeout; `deadline`, when given, caps the whole read.
    pub async fn read_until<P>(
        &mut self,
        predicate: P,
        deadline: Option<Instant>,
    ) -> Result<String, ChannelError>
    where
        P: Fn(&str) -> bool,
    {
        if self.closed {
            return Err(ChannelError::Closed);
        }

        self.buffer.clear();

        loop {
            let (wait, clamped) = self.next_wait(deadline)?;

            let chunk = match tokio::time::timeout(wait, self.transport.recv()).await {
                Ok(received) => received?,
                Err(_) if clamped => return Err(ChannelError::DeadlineExceeded),
                Err(_) => return Err(ChannelError::PromptTimeout(self.read_timeout)),
            };

            // Keepalive traffic, not stream termination
            if chunk.is_empty() {
                continue;
            }

            self.buffer.extend(&chunk);

            if predicate(self.buffer.as_str()) {
                return Ok(self.buffer.take());
            }
        }
    }

    /// Close the transport with `status`. Idempotent; only the first call
    /// reaches the wire.
    pub async fn close(&mut self, status: CloseStatus) -> Result<(), ChannelError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.transport.close(status).await?;
        Ok(())
    }

    /// Whether the channel has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Next receive bound: the read timeout, or the time left until the
    /// deadline if that is shorter. The flag marks a deadline-clamped wait.
    fn next_wait(&self, deadline: Option<Instant>) -> Result<(Duration, bool), ChannelError> {
        let Some(deadline) = deadline else {
            return Ok((self.read_timeout, false));
        };

        let remaining = deadline
            .checked_duration_since(Instant::now())
            .ok_or(ChannelError::DeadlineExceeded)?;

        if remaining < self.read_timeout {
            Ok((remaining, true))
        } else {
            Ok((self.read_timeout, false))
        }
    }
}

impl<T> Drop for ShellChannel<T> {
    fn drop(&mut self) {
        if !self.closed {
            warn!("shell channel dropped without close");
        }
    }
}

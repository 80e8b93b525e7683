//! WebSocket transport implementation using tokio-tungstenite.
//!
//! The Mist cloud hands out a per-session WebSocket URL that proxies the
//! device shell. The URL embeds a short-lived session credential, so it is
//! treated as a secret and never logged.

use std::time::Duration;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use log::{debug, trace};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{CloseStatus, Transport};
use crate::error::{Result, TransportError};

impl From<CloseStatus> for CloseCode {
    fn from(status: CloseStatus) -> Self {
        match status {
            CloseStatus::Normal => CloseCode::Normal,
            CloseStatus::Error => CloseCode::Error,
        }
    }
}

/// WebSocket transport to the Mist shell proxy.
pub struct WsTransport {
    /// The underlying WebSocket stream (TLS for `wss://` URLs).
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTransport {
    /// Connect to the session endpoint, bounded by `timeout`.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let (ws, _response) = tokio::time::timeout(timeout, connect_async(url))
            .await
            .map_err(|_| TransportError::ConnectTimeout(timeout))?
            .map_err(|source| TransportError::ConnectionFailed { source })?;

        debug!("WebSocket session established");

        Ok(Self { ws })
    }
}

impl Transport for WsTransport {
    async fn send(&mut self, frame: Bytes) -> std::result::Result<(), TransportError> {
        self.ws.send(Message::Binary(frame.to_vec())).await?;
        Ok(())
    }

    async fn recv(&mut self) -> std::result::Result<Bytes, TransportError> {
        match self.ws.next().await {
            None => Err(TransportError::Closed),
            Some(Err(e)) => Err(TransportError::Ws(e)),
            Some(Ok(message)) => match message {
                Message::Binary(data) => {
                    trace!("received binary chunk: {} bytes", data.len());
                    Ok(Bytes::from(data))
                }
                Message::Text(text) => {
                    trace!("received text chunk: {} bytes", text.len());
                    Ok(Bytes::from(text.into_bytes()))
                }
                Message::Close(_) => Err(TransportError::Closed),
                // Keepalive and raw frames carry no shell output
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Ok(Bytes::new()),
            },
        }
    }

    async fn close(&mut self, status: CloseStatus) -> std::result::Result<(), TransportError> {
        let frame = CloseFrame {
            code: status.into(),
            reason: "".into(),
        };

        match self.ws.close(Some(frame)).await {
            Ok(()) => Ok(()),
            // A repeat close, or one racing the peer's, is not a failure
            Err(WsError::ConnectionClosed)
            | Err(WsError::AlreadyClosed)
            | Err(WsError::Protocol(ProtocolError::SendAfterClosing)) => Ok(()),
            Err(e) => Err(TransportError::Ws(e)),
        }
    }
}

//! Wire framing for outbound shell commands.
//!
//! The proxied shell expects each command as a single binary message:
//! one NUL control byte, the command text, a newline terminator.

use bytes::{BufMut, Bytes, BytesMut};

/// Control byte prefixing every command frame.
pub const CONTROL_PREFIX: u8 = 0x00;

/// A framed shell command: `0x00` + command text + `\n`.
///
/// Constructed per dispatch and not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    bytes: Bytes,
}

impl CommandFrame {
    /// Frame a command string for the wire.
    pub fn new(command: &str) -> Self {
        let mut buf = BytesMut::with_capacity(command.len() + 2);
        buf.put_u8(CONTROL_PREFIX);
        buf.put_slice(command.as_bytes());
        buf.put_u8(b'\n');
        Self {
            bytes: buf.freeze(),
        }
    }

    /// The framed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the frame, yielding the wire bytes.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_layout() {
        let frame = CommandFrame::new("exit");
        assert_eq!(frame.as_bytes(), b"\x00exit\n");
    }

    #[test]
    fn test_frame_preserves_command_text() {
        let frame = CommandFrame::new("file show /var/log/messages | match ERROR | count");
        let bytes = frame.as_bytes();
        assert_eq!(bytes[0], CONTROL_PREFIX);
        assert_eq!(bytes[bytes.len() - 1], b'\n');
        assert_eq!(
            &bytes[1..bytes.len() - 1],
            b"file show /var/log/messages | match ERROR | count"
        );
    }

    #[test]
    fn test_empty_command() {
        let frame = CommandFrame::new("");
        assert_eq!(frame.into_bytes().as_ref(), b"\x00\n");
    }
}

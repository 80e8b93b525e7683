//! Accumulation buffer for streamed shell output.
//!
//! The proxy interleaves NUL bytes into the stream (the same marker the
//! command framing uses), so chunks are scrubbed of `0x00` as they arrive.
//! Prompt predicates and extraction then operate on clean text.

use std::borrow::Cow;

/// Buffer that accumulates decoded output text across reads.
#[derive(Debug)]
pub struct OutputBuffer {
    /// The accumulated, scrubbed output.
    text: String,
}

impl OutputBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            text: String::with_capacity(4096),
        }
    }

    /// Append a raw chunk: decode as UTF-8 (lossy) and drop NUL bytes.
    pub fn extend(&mut self, chunk: &[u8]) {
        let decoded: Cow<'_, str> = String::from_utf8_lossy(chunk);
        // memchr on the raw bytes: clean chunks append without a char walk
        if memchr::memchr(0, chunk).is_none() {
            self.text.push_str(&decoded);
        } else {
            self.text.extend(decoded.chars().filter(|&c| c != '\0'));
        }
    }

    /// Get the current buffer contents.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }

    /// Get the current buffer length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.text.clear();
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extend() {
        let mut buffer = OutputBuffer::new();
        buffer.extend(b"Hello, world!");
        assert_eq!(buffer.as_str(), "Hello, world!");
    }

    #[test]
    fn test_nul_scrubbing() {
        let mut buffer = OutputBuffer::new();
        buffer.extend(b"\x00mist@device> ");
        buffer.extend(b"Count: 42\x00 lines");
        assert_eq!(buffer.as_str(), "mist@device> Count: 42 lines");
    }

    #[test]
    fn test_lossy_decode() {
        let mut buffer = OutputBuffer::new();
        // 0xFF is not valid UTF-8; it decodes to the replacement character
        buffer.extend(b"ok\xFFok");
        assert_eq!(buffer.as_str(), "ok\u{FFFD}ok");
    }

    #[test]
    fn test_accumulates_across_chunks() {
        let mut buffer = OutputBuffer::new();
        buffer.extend(b"mist@dev");
        buffer.extend(b"ice> ");
        assert_eq!(buffer.as_str(), "mist@device> ");
        assert_eq!(buffer.len(), 13);
    }

    #[test]
    fn test_take_clears_buffer() {
        let mut buffer = OutputBuffer::new();
        buffer.extend(b"test data");
        assert_eq!(buffer.take(), "test data");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut buffer = OutputBuffer::new();
        buffer.extend(b"stale");
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.as_str(), "");
    }
}

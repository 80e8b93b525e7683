//! Prompt detection for the Mist-proxied Junos shell.
//!
//! The proxied shell always runs as the `mist` user, so the prompt is
//! `mist@<hostname>> ` (trailing space included). Two patterns cover the two
//! situations the session cares about:
//!
//! - **start**: the prompt at the beginning of a line, used to spot the
//!   *initial* prompt after the login banner and to recognize echoed command
//!   lines when filtering output.
//! - **end**: the prompt anchored at the very end of the accumulated buffer,
//!   used as the command-completion signal.
//!
//! # Stream Examples
//!
//! ```text
//! Welcome\r\n
//! mist@ap41-office>              <- initial prompt (start pattern, line 2)
//! mist@ap41-office> file list …  <- echoed command (start pattern)
//! Count: 42 lines\r\n
//! mist@ap41-office>              <- completion (end pattern, buffer tail)
//! ```

use regex::Regex;

use crate::error::ChannelError;

/// Prompt at the start of a line: initial prompt and echoed commands.
pub const MIST_PROMPT_START: &str = r"(?m)^mist@\S+> ";

/// Prompt anchored at the end of the buffer: command completion.
pub const MIST_PROMPT_END: &str = r"mist@\S+> $";

/// A compiled start/end prompt pattern pair.
#[derive(Debug, Clone)]
pub struct ShellPrompt {
    /// Matches the prompt at a line start, anywhere in the buffer.
    start: Regex,

    /// Matches the prompt only when it anchors the buffer tail.
    end: Regex,
}

impl ShellPrompt {
    /// Create a prompt pair from custom patterns.
    ///
    /// The start pattern should be line-anchored (`(?m)^…`), the end pattern
    /// buffer-tail-anchored (`…$` without `(?m)`), or completion detection
    /// will fire on prompt tokens echoed mid-output.
    pub fn new(start: &str, end: &str) -> Result<Self, ChannelError> {
        Ok(Self {
            start: Regex::new(start)?,
            end: Regex::new(end)?,
        })
    }

    /// The Mist-proxied Junos shell prompt (`mist@<host>> `).
    pub fn mist() -> Self {
        Self {
            start: Regex::new(MIST_PROMPT_START).unwrap(),
            end: Regex::new(MIST_PROMPT_END).unwrap(),
        }
    }

    /// True once the initial prompt has appeared anywhere in the stream.
    pub fn is_initial(&self, text: &str) -> bool {
        self.start.is_match(text)
    }

    /// True when the completion prompt anchors the tail of the buffer.
    ///
    /// A prompt token mid-buffer (an echoed command line, a prompt quoted
    /// inside log output) does not count.
    pub fn is_complete(&self, text: &str) -> bool {
        self.end.is_match(text)
    }

    /// Whether a single output line is the shell echoing the prompt.
    pub fn is_echo_line(&self, line: &str) -> bool {
        self.start.is_match(line)
    }

    /// Strip the trailing completion prompt, if present.
    pub fn strip_complete<'a>(&self, text: &'a str) -> &'a str {
        match self.end.find(text) {
            Some(m) => &text[..m.start()],
            None => text,
        }
    }
}

impl Default for ShellPrompt {
    fn default() -> Self {
        Self::mist()
    }
}

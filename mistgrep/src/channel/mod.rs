//! Channel layer for prompt detection and shell interaction.
//!
//! This module handles the interactive exchange with the proxied shell:
//! wire framing for outbound commands, NUL-scrubbed accumulation of the
//! inbound stream, and prompt-bounded reads.

mod buffer;
mod frame;
mod prompt;
mod shell;

pub use buffer::OutputBuffer;
pub use frame::{CommandFrame, CONTROL_PREFIX};
pub use prompt::{ShellPrompt, MIST_PROMPT_END, MIST_PROMPT_START};
pub use shell::ShellChannel;

//! The session state machine: one end-to-end run of the fixed script.

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use log::{debug, info, warn};

use super::records::{LogFileRecord, SessionReport};
use super::script::{ScriptStep, SessionState};
use crate::channel::{ShellChannel, ShellPrompt};
use crate::error::{ChannelError, Error, Result, SessionError};
use crate::extract;
use crate::transport::{CloseStatus, Transport};

/// Default glob passed to the listing command.
pub const DEFAULT_FILE_PATTERN: &str = "/var/log/messages*";

/// Default prefix a listing line must carry to count as a file path.
pub const DEFAULT_DIR_PREFIX: &str = "/var/log/";

/// Default per-read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Default overall session deadline.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(300);

const EXIT_COMMAND: &str = "exit";

/// Options for one session run.
///
/// Everything defaults except the match string, which the caller must
/// supply (it drives both the remote filter and local line selection).
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Substring filtered for remotely and matched locally.
    match_string: String,

    /// Glob passed to `file list`.
    file_pattern: String,

    /// Prefix that identifies path lines in the listing output.
    dir_prefix: String,

    /// Upper bound for each individual receive.
    read_timeout: Duration,

    /// Overall deadline for the whole script; `None` disables it.
    session_timeout: Option<Duration>,

    /// Prompt patterns for the remote shell.
    prompt: ShellPrompt,
}

impl SessionOptions {
    /// Options with defaults for everything except the match string.
    pub fn new(match_string: impl Into<String>) -> Self {
        Self {
            match_string: match_string.into(),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            dir_prefix: DEFAULT_DIR_PREFIX.to_string(),
            read_timeout: DEFAULT_READ_TIMEOUT,
            session_timeout: Some(DEFAULT_SESSION_TIMEOUT),
            prompt: ShellPrompt::mist(),
        }
    }

    /// Set the glob passed to the listing command.
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }

    /// Set the prefix that identifies path lines in the listing output.
    pub fn with_dir_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.dir_prefix = prefix.into();
        self
    }

    /// Set the per-read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set or clear the overall session deadline.
    pub fn with_session_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.session_timeout = timeout.into();
        self
    }

    /// Override the prompt patterns.
    pub fn with_prompt(mut self, prompt: ShellPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    /// The configured match string.
    pub fn match_string(&self) -> &str {
        &self.match_string
    }

    // Command templates for the script steps.

    pub(crate) fn list_command(&self) -> String {
        format!("file list {}", self.file_pattern)
    }

    pub(crate) fn count_command(&self, path: &str) -> String {
        format!("file show {} | match {} | count", path, self.match_string)
    }

    pub(crate) fn collect_command(&self, path: &str) -> String {
        format!("file show {} | match {} | no-more", path, self.match_string)
    }
}

/// One end-to-end run of the fixed script over one transport.
///
/// The session owns the transport exclusively and closes it exactly once:
/// normally after the `exit` step, or best-effort when a fatal error
/// unwinds the script. Soft failures (an unparseable count, an extraction
/// shortfall) are logged and the run continues.
pub struct Session<T: Transport> {
    /// The shell channel wrapping the owned transport.
    channel: ShellChannel<T>,

    /// Run parameters.
    options: SessionOptions,

    /// Current lifecycle state.
    state: SessionState,

    /// File inventory, keyed by path, in discovery order.
    files: IndexMap<String, LogFileRecord>,

    /// Matched log lines in order of appearance.
    matched_lines: Vec<String>,

    /// Path being counted/extracted right now, for error context.
    current_file: Option<String>,

    /// When the run started.
    started: Instant,
}

impl<T: Transport> Session<T> {
    /// Create a session over `transport`.
    pub fn new(transport: T, options: SessionOptions) -> Self {
        let channel = ShellChannel::new(transport, options.read_timeout);
        Self {
            channel,
            options,
            state: SessionState::AwaitingInitialPrompt,
            files: IndexMap::new(),
            matched_lines: Vec::new(),
            current_file: None,
            started: Instant::now(),
        }
    }

    /// The state the machine currently holds.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the whole script and return the collected report.
    ///
    /// A fatal error aborts the remaining steps, attempts a best-effort
    /// transport close, and carries the state (and file, where applicable)
    /// in which the script died.
    pub async fn run(mut self) -> Result<SessionReport> {
        self.started = Instant::now();
        let deadline = self
            .options
            .session_timeout
            .map(|limit| Instant::now() + limit);

        for step in ScriptStep::SCRIPT {
            self.state = step.state();
            debug!("state: {}", self.state);

            if let Err(err) = self.run_step(step, deadline).await {
                let failure = self.failure(err);
                if let Err(close_err) = self.channel.close(CloseStatus::Error).await {
                    warn!("best-effort close failed: {close_err}");
                }
                self.state = SessionState::Closed;
                return Err(failure);
            }
        }

        self.state = SessionState::Closed;
        info!(
            "session complete: {} files, {} matched lines",
            self.files.len(),
            self.matched_lines.len()
        );
        Ok(self.into_report())
    }

    async fn run_step(
        &mut self,
        step: ScriptStep,
        deadline: Option<Instant>,
    ) -> std::result::Result<(), ChannelError> {
        match step {
            ScriptStep::AwaitPrompt => self.await_initial_prompt(deadline).await,
            ScriptStep::ListFiles => self.list_files(deadline).await,
            ScriptStep::CountMatches => self.count_matches(deadline).await,
            ScriptStep::CollectMatches => self.collect_matches(deadline).await,
            ScriptStep::Exit => self.exit_shell().await,
        }
    }

    /// The shell emits a banner then a prompt on connect; no command is
    /// sent before it shows up.
    async fn await_initial_prompt(
        &mut self,
        deadline: Option<Instant>,
    ) -> std::result::Result<(), ChannelError> {
        info!("waiting for the remote shell prompt");
        let prompt = &self.options.prompt;
        let banner = self
            .channel
            .read_until(|text| prompt.is_initial(text), deadline)
            .await?;
        debug!("received:\n{}", banner.trim_end());
        Ok(())
    }

    async fn list_files(
        &mut self,
        deadline: Option<Instant>,
    ) -> std::result::Result<(), ChannelError> {
        let command = self.options.list_command();
        self.channel.dispatch(&command).await?;

        let prompt = &self.options.prompt;
        let text = self
            .channel
            .read_until(|t| prompt.is_complete(t), deadline)
            .await?;
        debug!("received:\n{}", text.trim_end());

        let body = prompt.strip_complete(&text);
        let paths = extract::file_paths(body, &self.options.dir_prefix);
        if paths.is_empty() {
            warn!("no files matched {}", self.options.file_pattern);
        } else {
            info!("log files: {}", paths.join(", "));
        }

        for path in paths {
            self.files
                .entry(path.clone())
                .or_insert_with(|| LogFileRecord::new(path));
        }
        Ok(())
    }

    async fn count_matches(
        &mut self,
        deadline: Option<Instant>,
    ) -> std::result::Result<(), ChannelError> {
        let paths: Vec<String> = self.files.keys().cloned().collect();
        for path in paths {
            self.current_file = Some(path.clone());

            let command = self.options.count_command(&path);
            self.channel.dispatch(&command).await?;

            let prompt = &self.options.prompt;
            let text = self
                .channel
                .read_until(|t| prompt.is_complete(t), deadline)
                .await?;
            debug!("{path} count output:\n{}", text.trim_end());

            let body = prompt.strip_complete(&text);
            match extract::match_count(body) {
                Some(count) => {
                    info!("{path}: {count} matching lines on device");
                    if let Some(record) = self.files.get_mut(&path) {
                        record.device_count = count;
                    }
                }
                // Soft failure: the record keeps its zero count
                None => warn!("{path}: could not parse count output"),
            }
        }
        self.current_file = None;
        Ok(())
    }

    async fn collect_matches(
        &mut self,
        deadline: Option<Instant>,
    ) -> std::result::Result<(), ChannelError> {
        let paths: Vec<String> = self.files.keys().cloned().collect();
        for path in paths {
            let Some(record) = self.files.get(&path) else {
                continue;
            };
            if record.done {
                debug!("{path}: already collected, skipping");
                continue;
            }
            self.current_file = Some(path.clone());

            let command = self.options.collect_command(&path);
            self.channel.dispatch(&command).await?;

            let prompt = &self.options.prompt;
            let text = self
                .channel
                .read_until(|t| prompt.is_complete(t), deadline)
                .await?;
            debug!("{path} matches:\n{}", text.trim_end());

            let body = prompt.strip_complete(&text);
            let lines = extract::matching_lines(body, &self.options.match_string, prompt);

            if let Some(record) = self.files.get_mut(&path) {
                record.extracted_count = lines.len() as u64;
                record.done = true;
                if record.shortfall() {
                    warn!(
                        "{path}: extracted {} lines, device reported {}",
                        record.extracted_count, record.device_count
                    );
                } else {
                    debug!(
                        "{path}: extracted {} lines, device reported {}",
                        record.extracted_count, record.device_count
                    );
                }
            }

            self.matched_lines.extend(lines);
        }
        self.current_file = None;
        Ok(())
    }

    /// Exit uses the same framing as any command, then the transport is
    /// closed with a normal status instead of waiting for a prompt.
    async fn exit_shell(&mut self) -> std::result::Result<(), ChannelError> {
        info!("exiting remote shell");
        self.channel.dispatch(EXIT_COMMAND).await?;
        self.channel.close(CloseStatus::Normal).await?;
        Ok(())
    }

    /// Wrap a channel failure with the state and file it happened in.
    fn failure(&self, err: ChannelError) -> Error {
        let state = self.state;
        let file = self.current_file.clone();
        match err {
            ChannelError::PromptTimeout(limit) => SessionError::Timeout { state, file, limit }.into(),
            ChannelError::DeadlineExceeded => SessionError::Timeout {
                state,
                file,
                limit: self.options.session_timeout.unwrap_or_default(),
            }
            .into(),
            source => SessionError::Protocol {
                state,
                file,
                source,
            }
            .into(),
        }
    }

    fn into_report(self) -> SessionReport {
        SessionReport {
            files: self.files.into_values().collect(),
            lines: self.matched_lines,
            elapsed: self.started.elapsed(),
        }
    }
}

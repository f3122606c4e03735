use crate::error::SshError;
use crate::transport::{ExecOutput, Transport};

/// Output of one remote command.
///
/// Built by running the command; the raw bytes never change afterwards and
/// the trimmed accessors are derived from them on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    command: String,
    raw_stdout: Vec<u8>,
    raw_stderr: Vec<u8>,
    exit_status: Option<u32>,
    exit_signal: Option<String>,
}

impl CommandResult {
    /// Execute `command` over `transport`, blocking until both output
    /// streams are drained and the channel closes.
    pub(crate) fn execute(transport: &mut dyn Transport, command: &str) -> Result<Self, SshError> {
        tracing::debug!("Executing remote command: {}", command);

        let output = transport.exec(command)?;

        if let Some(status) = output.exit_status.filter(|status| *status != 0) {
            tracing::debug!("{} exited with status {}", command, status);
        }

        Ok(Self::from_output(command, output))
    }

    pub fn from_output(command: &str, output: ExecOutput) -> Self {
        Self {
            command: command.to_string(),
            raw_stdout: output.stdout,
            raw_stderr: output.stderr,
            exit_status: output.exit_status,
            exit_signal: output.exit_signal,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn stdout_bytes(&self) -> &[u8] {
        &self.raw_stdout
    }

    pub fn stderr_bytes(&self) -> &[u8] {
        &self.raw_stderr
    }

    /// Untrimmed stdout, lossily decoded as UTF-8
    pub fn raw_output(&self) -> String {
        String::from_utf8_lossy(&self.raw_stdout).into_owned()
    }

    /// Untrimmed stderr, lossily decoded as UTF-8
    pub fn raw_error(&self) -> String {
        String::from_utf8_lossy(&self.raw_stderr).into_owned()
    }

    /// Stdout with leading and trailing whitespace removed
    pub fn output(&self) -> String {
        self.raw_output().trim().to_string()
    }

    /// Stderr with leading and trailing whitespace removed
    pub fn error(&self) -> String {
        self.raw_error().trim().to_string()
    }

    pub fn exit_status(&self) -> Option<u32> {
        self.exit_status
    }

    pub fn exit_signal(&self) -> Option<&str> {
        self.exit_signal.as_deref()
    }

    /// True when the remote process reported exit status 0
    pub fn success(&self) -> bool {
        self.exit_status == Some(0)
    }
}

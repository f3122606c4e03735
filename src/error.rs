use std::path::PathBuf;
use thiserror::Error;

/// Profile file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Broad failure classes callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid settings, unsupported fingerprint algorithm, wrong key type
    Configuration,
    /// Socket could not be opened or the handshake did not complete
    Connection,
    /// Credential rejected by the server
    Authentication,
    /// Operation attempted in the wrong lifecycle state
    State,
    /// Required local or remote file absent
    NotFound,
    /// Channel or transfer failure on an established connection
    Transfer,
}

/// SSH and SFTP errors
#[derive(Error, Debug)]
pub enum SshError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Connection failed to {host}:{port}: {reason}")]
    ConnectionFailed {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("Timeout connecting to {0}")]
    Timeout(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Not connected: {0}")]
    NotConnected(String),

    #[error("Already connected to {0}")]
    AlreadyConnected(String),

    #[error("Local file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Remote file not found: {0}")]
    RemoteNotFound(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("Local I/O error on '{}': {source}", path.display())]
    LocalIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("russh error: {0}")]
    Russh(String),
}

impl From<russh::Error> for SshError {
    fn from(err: russh::Error) -> Self {
        SshError::Russh(err.to_string())
    }
}

impl SshError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SshError::Configuration(_) => ErrorKind::Configuration,
            SshError::ConnectionFailed { .. } | SshError::Timeout(_) => ErrorKind::Connection,
            SshError::AuthenticationFailed(_) => ErrorKind::Authentication,
            SshError::NotConnected(_) | SshError::AlreadyConnected(_) => ErrorKind::State,
            SshError::NotFound(_) | SshError::RemoteNotFound(_) => ErrorKind::NotFound,
            SshError::Channel(_)
            | SshError::Transfer(_)
            | SshError::LocalIo { .. }
            | SshError::Russh(_) => ErrorKind::Transfer,
        }
    }
}

//! Blocking SSH client with a fluent connection builder.
//!
//! [`ConnectionBuilder`] collects host, port, user, credential and timeout,
//! validates them, and opens either a [`Session`] for running commands and
//! reading the server fingerprint, or an [`SftpSession`] for file transfer.
//! The protocol engine sits behind the [`transport`] traits.

pub mod builder;
pub mod config;
pub mod error;
pub mod logging;
pub mod security_log;
pub mod sftp;
pub mod ssh;
pub mod transport;

pub use builder::ConnectionBuilder;
pub use config::{ConnectionConfig, ConnectionProfile, Credential};
pub use error::{ConfigError, ErrorKind, SshError};
pub use sftp::{SftpSession, TransferOutcome};
pub use ssh::{CommandResult, FingerprintAlgorithm, Session, SessionState};

//! Transport boundary
//!
//! The SSH protocol engine (key exchange, ciphers, channel multiplexing, SFTP
//! packet framing) lives behind these traits. [`RusshConnector`] is the
//! production implementation; tests plug in their own.

mod handler;
pub mod russh_transport;

use std::io::{Read, Write};
use std::time::Duration;

use crate::error::SshError;
use crate::ssh::auth::ResolvedAuth;

pub use russh_transport::RusshConnector;

/// Chunk size used when copying file contents over SFTP
pub const TRANSFER_CHUNK_SIZE: usize = 32 * 1024;

/// Raw result of one exec channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the server closed the channel without reporting a status
    pub exit_status: Option<u32>,
    /// Signal name when the remote process was killed by a signal
    pub exit_signal: Option<String>,
}

/// Opens transports to remote hosts.
pub trait Connector: Send + Sync {
    /// Open a socket to `host:port` and complete the SSH handshake.
    ///
    /// `timeout` bounds the whole connect phase; `None` waits indefinitely.
    fn open(
        &self,
        host: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> Result<Box<dyn Transport>, SshError>;
}

/// One encrypted connection to a server.
pub trait Transport: Send {
    /// Try to log in. `Ok(false)` means the server rejected the credential.
    fn authenticate(&mut self, username: &str, auth: &ResolvedAuth) -> Result<bool, SshError>;

    /// Run `command` on a new exec channel without a PTY and wait for it to finish.
    fn exec(&mut self, command: &str) -> Result<ExecOutput, SshError>;

    /// Server host public key in SSH wire encoding, as seen during key exchange.
    fn server_host_key(&self) -> Result<Vec<u8>, SshError>;

    /// Open a channel running the `sftp` subsystem.
    fn open_sftp(&mut self) -> Result<Box<dyn SftpChannel>, SshError>;

    /// Send a disconnect and release the socket.
    fn close(&mut self) -> Result<(), SshError>;
}

/// File get/put primitives on an SFTP channel.
pub trait SftpChannel: Send {
    /// Create or truncate `remote_path` and copy `source` into it. Returns bytes written.
    fn put(&mut self, remote_path: &str, source: &mut dyn Read) -> Result<u64, SshError>;

    /// Copy `remote_path` into `sink`. Returns bytes read.
    fn get(&mut self, remote_path: &str, sink: &mut dyn Write) -> Result<u64, SshError>;

    /// Size of `remote_path`, or `None` if it does not exist.
    fn remote_size(&mut self, remote_path: &str) -> Result<Option<u64>, SshError>;

    /// Close the SFTP channel.
    fn close(&mut self) -> Result<(), SshError>;
}

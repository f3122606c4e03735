use std::sync::Arc;

use crate::config::ConnectionConfig;
use crate::error::SshError;
use crate::security_log;
use crate::transport::{Connector, Transport};

use super::client::open_authenticated;
use super::command::CommandResult;
use super::fingerprint::FingerprintAlgorithm;

/// Lifecycle of a session or SFTP session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, no transport yet
    Disconnected,
    /// Authenticated transport available
    Connected,
    /// Explicitly disconnected
    Closed,
}

/// Authenticated SSH connection used to run commands.
///
/// Not safe to share between concurrent callers; every method blocks until
/// the server answers.
pub struct Session {
    config: ConnectionConfig,
    connector: Arc<dyn Connector>,
    state: SessionState,
    transport: Option<Box<dyn Transport>>,
    host_key: Option<Vec<u8>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("transport", &self.transport.as_ref().map(|_| "<transport>"))
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session in the `Disconnected` state. No I/O happens here.
    pub fn new(config: ConnectionConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            state: SessionState::Disconnected,
            transport: None,
            host_key: None,
        }
    }

    /// Open the socket and authenticate. Allowed from `Disconnected` and `Closed`.
    pub fn connect(&mut self) -> Result<(), SshError> {
        if self.state == SessionState::Connected {
            return Err(SshError::AlreadyConnected(self.config.address()));
        }

        let transport = open_authenticated(&self.config, self.connector.as_ref())?;

        self.transport = Some(transport);
        self.host_key = None;
        self.state = SessionState::Connected;

        tracing::info!(
            "SSH session established to {} as {}",
            self.config.address(),
            self.config.username
        );
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn ensure_connected(&self, action: &str) -> Result<(), SshError> {
        if self.state == SessionState::Connected && self.transport.is_some() {
            Ok(())
        } else {
            Err(SshError::NotConnected(format!(
                "Unable to {} when not connected",
                action
            )))
        }
    }

    fn transport_mut(&mut self, action: &str) -> Result<&mut Box<dyn Transport>, SshError> {
        self.ensure_connected(action)?;
        self.transport
            .as_mut()
            .ok_or_else(|| SshError::NotConnected(format!("Unable to {}", action)))
    }

    /// Run one command and wait for it to finish.
    pub fn run(&mut self, command: &str) -> Result<CommandResult, SshError> {
        let transport = self.transport_mut("run commands")?;
        CommandResult::execute(transport.as_mut(), command)
    }

    /// Uppercase hex digest of the server host key.
    ///
    /// The key blob is fetched once per connection; repeated calls return the same value.
    pub fn fingerprint(&mut self, algorithm: FingerprintAlgorithm) -> Result<String, SshError> {
        self.ensure_connected("get fingerprint")?;

        if self.host_key.is_none() {
            let host_key = self.transport_mut("get fingerprint")?.server_host_key()?;
            self.host_key = Some(host_key);
        }
        let fingerprint = algorithm.fingerprint(self.host_key.as_deref().unwrap_or_default());

        security_log::log_host_key_fingerprint(
            &self.config.hostname,
            self.config.port,
            algorithm.name(),
            &fingerprint,
        );
        Ok(fingerprint)
    }

    /// Like [`Session::fingerprint`], with the algorithm given by name (`md5`, `sha1`).
    pub fn fingerprint_str(&mut self, algorithm: &str) -> Result<String, SshError> {
        self.ensure_connected("get fingerprint")?;
        let algorithm: FingerprintAlgorithm = algorithm.parse()?;
        self.fingerprint(algorithm)
    }

    /// Close the connection. Fails unless currently connected.
    pub fn disconnect(&mut self) -> Result<(), SshError> {
        match self.state {
            SessionState::Disconnected => {
                return Err(SshError::NotConnected(
                    "Unable to disconnect. Not yet connected.".to_string(),
                ));
            }
            SessionState::Closed => {
                return Err(SshError::NotConnected(
                    "Unable to disconnect. Already disconnected.".to_string(),
                ));
            }
            SessionState::Connected => {}
        }

        if let Some(mut transport) = self.transport.take() {
            // The socket is released when the transport drops, even if the
            // disconnect message could not be sent.
            if let Err(e) = transport.close() {
                tracing::warn!(
                    "Disconnect from {} was not clean: {}",
                    self.config.address(),
                    e
                );
            }
        }

        self.host_key = None;
        self.state = SessionState::Closed;
        security_log::log_disconnect(
            &self.config.hostname,
            self.config.port,
            &self.config.username,
            "ssh",
        );
        Ok(())
    }
}

//! SFTP session for file transfer

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use crate::config::ConnectionConfig;
use crate::error::SshError;
use crate::security_log;
use crate::ssh::SessionState;
use crate::ssh::client::open_authenticated;
use crate::transport::{Connector, SftpChannel, Transport};

use super::types::{TransferOutcome, format_size};

/// Authenticated connection running the SFTP subsystem.
///
/// Independent of [`crate::Session`]: it owns its own transport.
pub struct SftpSession {
    config: ConnectionConfig,
    connector: Arc<dyn Connector>,
    state: SessionState,
    transport: Option<Box<dyn Transport>>,
    channel: Option<Box<dyn SftpChannel>>,
}

impl std::fmt::Debug for SftpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SftpSession")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SftpSession {
    /// Create an SFTP session in the `Disconnected` state. No I/O happens here.
    pub fn new(config: ConnectionConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            state: SessionState::Disconnected,
            transport: None,
            channel: None,
        }
    }

    /// Open the socket, authenticate and start the SFTP subsystem.
    pub fn connect(&mut self) -> Result<(), SshError> {
        if self.state == SessionState::Connected {
            return Err(SshError::AlreadyConnected(self.config.address()));
        }

        let mut transport = open_authenticated(&self.config, self.connector.as_ref())?;

        let channel = match transport.open_sftp() {
            Ok(channel) => channel,
            Err(e) => {
                if let Err(close_err) = transport.close() {
                    tracing::debug!("Close after failed SFTP start: {}", close_err);
                }
                return Err(e);
            }
        };

        self.transport = Some(transport);
        self.channel = Some(channel);
        self.state = SessionState::Connected;

        security_log::log_sftp_connect(
            &self.config.hostname,
            self.config.port,
            &self.config.username,
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

    fn channel_mut(&mut self, action: &str) -> Result<&mut Box<dyn SftpChannel>, SshError> {
        match (self.state, self.channel.as_mut()) {
            (SessionState::Connected, Some(channel)) => Ok(channel),
            _ => Err(SshError::NotConnected(format!(
                "Unable to {} when not connected",
                action
            ))),
        }
    }

    /// Copy a local file to `remote_path`, replacing any existing file.
    ///
    /// Not atomic: a failed upload can leave a partial remote file.
    pub fn upload(
        &mut self,
        local_path: impl AsRef<Path>,
        remote_path: &str,
    ) -> Result<TransferOutcome, SshError> {
        let local_path = local_path.as_ref();
        let channel = self.channel_mut("upload file")?;

        let metadata = std::fs::metadata(local_path).map_err(|e| local_error(local_path, e))?;
        if !metadata.is_file() {
            return Err(SshError::LocalIo {
                path: local_path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        let mut local = File::open(local_path).map_err(|e| local_error(local_path, e))?;
        let bytes = channel.put(remote_path, &mut local)?;
        let outcome = TransferOutcome::new(bytes, metadata.len());

        if outcome.success {
            tracing::info!(
                "Uploaded {} to {} ({})",
                local_path.display(),
                remote_path,
                format_size(bytes)
            );
        } else {
            tracing::warn!(
                "Upload of {} to {} wrote {} of {} bytes",
                local_path.display(),
                remote_path,
                bytes,
                metadata.len()
            );
        }
        Ok(outcome)
    }

    /// Copy `remote_path` to a local file, creating parent directories.
    ///
    /// Data lands in a sibling `.part` file that replaces `local_path` only
    /// once the copy completes, so a failed download leaves any existing
    /// local file untouched. A missing remote file yields
    /// [`SshError::RemoteNotFound`].
    pub fn download(
        &mut self,
        remote_path: &str,
        local_path: impl AsRef<Path>,
    ) -> Result<TransferOutcome, SshError> {
        let local_path = local_path.as_ref();
        let channel = self.channel_mut("download file")?;

        let expected = channel
            .remote_size(remote_path)?
            .ok_or_else(|| SshError::RemoteNotFound(remote_path.to_string()))?;

        if let Some(parent) = local_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SshError::LocalIo {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let part_path = partial_path(local_path);
        let mut part = {
            let mut options = OpenOptions::new();
            options.create(true).write(true).truncate(true);
            #[cfg(unix)]
            {
                options.mode(0o600);
            }
            options.open(&part_path).map_err(|e| SshError::LocalIo {
                path: part_path.clone(),
                source: e,
            })?
        };

        let bytes = match channel.get(remote_path, &mut part) {
            Ok(bytes) => bytes,
            Err(e) => {
                drop(part);
                if let Err(remove_err) = std::fs::remove_file(&part_path) {
                    tracing::debug!("Failed to remove {}: {}", part_path.display(), remove_err);
                }
                return Err(e);
            }
        };
        drop(part);

        std::fs::rename(&part_path, local_path).map_err(|e| SshError::LocalIo {
            path: local_path.to_path_buf(),
            source: e,
        })?;

        let outcome = TransferOutcome::new(bytes, expected);

        if outcome.success {
            tracing::info!(
                "Downloaded {} to {} ({})",
                remote_path,
                local_path.display(),
                format_size(bytes)
            );
        } else {
            tracing::warn!(
                "Download of {} to {} read {} of {} bytes",
                remote_path,
                local_path.display(),
                bytes,
                expected
            );
        }
        Ok(outcome)
    }

    /// Close the SFTP channel and its connection. Fails unless currently connected.
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

        if let Some(mut channel) = self.channel.take() {
            if let Err(e) = channel.close() {
                tracing::debug!("SFTP channel close failed: {}", e);
            }
        }
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close() {
                tracing::warn!(
                    "Disconnect from {} was not clean: {}",
                    self.config.address(),
                    e
                );
            }
        }

        self.state = SessionState::Closed;
        security_log::log_disconnect(
            &self.config.hostname,
            self.config.port,
            &self.config.username,
            "sftp",
        );
        Ok(())
    }
}

/// `dir/.name.part` next to the download target
fn partial_path(local_path: &Path) -> PathBuf {
    let name = local_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    local_path.with_file_name(format!(".{}.part", name))
}

fn local_error(path: &Path, err: std::io::Error) -> SshError {
    match err.kind() {
        std::io::ErrorKind::NotFound => SshError::NotFound(path.to_path_buf()),
        _ => SshError::LocalIo {
            path: path.to_path_buf(),
            source: err,
        },
    }
}

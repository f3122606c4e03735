//! Transport backed by `russh` and `russh-sftp`.
//!
//! Each transport owns a single-threaded Tokio runtime and drives every
//! async call to completion with `block_on`, so callers see plain blocking
//! methods. Do not call these from inside another async runtime.

use std::io::{ErrorKind, Read, Write};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use russh::client::{self, Config, Handle};
use russh::keys::PrivateKeyWithHashAlg;
use russh::{ChannelMsg, Disconnect, Sig};
use russh_sftp::client::SftpSession as RusshSftpSession;
use russh_sftp::client::error::Error as SftpClientError;
use russh_sftp::protocol::{OpenFlags, StatusCode};
use secrecy::ExposeSecret;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::time::timeout;

use crate::error::SshError;
use crate::ssh::auth::ResolvedAuth;

use super::handler::{ClientHandler, HostKeySlot};
use super::{Connector, ExecOutput, SftpChannel, TRANSFER_CHUNK_SIZE, Transport};

/// Opens `russh` transports over TCP
pub struct RusshConnector {
    config: Arc<Config>,
}

impl RusshConnector {
    pub fn new() -> Self {
        // Timers only advance while a call is in flight, so idle keepalives are off.
        let config = Config {
            inactivity_timeout: None,
            keepalive_interval: None,
            ..Default::default()
        };

        Self {
            config: Arc::new(config),
        }
    }
}

impl Default for RusshConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RusshConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RusshConnector").finish_non_exhaustive()
    }
}

impl Connector for RusshConnector {
    fn open(
        &self,
        host: &str,
        port: u16,
        connect_timeout: Option<Duration>,
    ) -> Result<Box<dyn Transport>, SshError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SshError::ConnectionFailed {
                host: host.to_string(),
                port,
                reason: format!("Failed to start I/O runtime: {}", e),
            })?;

        let host_key: HostKeySlot = Arc::new(Mutex::new(None));
        let handler = ClientHandler::new(host.to_string(), port, host_key.clone());

        let handle = runtime.block_on(connect_handle(
            self.config.clone(),
            host,
            port,
            connect_timeout,
            handler,
        ))?;

        tracing::info!("SSH handshake completed with {}:{}", host, port);

        Ok(Box::new(RusshTransport {
            runtime: Arc::new(runtime),
            handle,
            host_key,
        }))
    }
}

async fn connect_handle(
    config: Arc<Config>,
    host: &str,
    port: u16,
    connect_timeout: Option<Duration>,
    handler: ClientHandler,
) -> Result<Handle<ClientHandler>, SshError> {
    let addr = format!("{}:{}", host, port);

    let connecting = async {
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|e| SshError::ConnectionFailed {
                host: host.to_string(),
                port,
                reason: e.to_string(),
            })?;

        client::connect_stream(config, stream, handler)
            .await
            .map_err(|e| SshError::ConnectionFailed {
                host: host.to_string(),
                port,
                reason: e.to_string(),
            })
    };

    match connect_timeout {
        Some(limit) => timeout(limit, connecting)
            .await
            .map_err(|_| SshError::Timeout(addr.clone()))?,
        None => connecting.await,
    }
}

/// Authenticated or authenticating `russh` connection
pub struct RusshTransport {
    runtime: Arc<Runtime>,
    handle: Handle<ClientHandler>,
    host_key: HostKeySlot,
}

impl std::fmt::Debug for RusshTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RusshTransport")
            .field("handle", &"<handle>")
            .finish_non_exhaustive()
    }
}

impl Transport for RusshTransport {
    fn authenticate(&mut self, username: &str, auth: &ResolvedAuth) -> Result<bool, SshError> {
        let Self {
            runtime, handle, ..
        } = self;

        let result = runtime.block_on(async {
            match auth {
                ResolvedAuth::Password(password) => {
                    // Use expose_secret() only at the point of authentication
                    handle
                        .authenticate_password(username, password.expose_secret())
                        .await
                }
                ResolvedAuth::PublicKey { key, hash_alg } => {
                    handle
                        .authenticate_publickey(
                            username,
                            PrivateKeyWithHashAlg::new(key.clone(), *hash_alg),
                        )
                        .await
                }
            }
        })?;

        Ok(result.success())
    }

    fn exec(&mut self, command: &str) -> Result<ExecOutput, SshError> {
        let Self {
            runtime, handle, ..
        } = self;

        runtime.block_on(async {
            let mut channel = handle
                .channel_open_session()
                .await
                .map_err(|e| SshError::Channel(format!("Failed to open channel: {}", e)))?;

            // No PTY request: quiet, non-interactive execution
            channel
                .exec(true, command)
                .await
                .map_err(|e| SshError::Channel(format!("Failed to exec '{}': {}", command, e)))?;

            // Nothing is written to stdin; commands reading it see end of input
            channel
                .eof()
                .await
                .map_err(|e| SshError::Channel(format!("Failed to send EOF: {}", e)))?;

            let mut output = ExecOutput::default();

            // Exit status may arrive after EOF, so drain until the channel closes
            loop {
                match channel.wait().await {
                    Some(ChannelMsg::Data { data }) => {
                        output.stdout.extend_from_slice(&data);
                    }
                    Some(ChannelMsg::ExtendedData { data, ext }) => {
                        if ext == 1 {
                            output.stderr.extend_from_slice(&data);
                        } else {
                            tracing::debug!("Ignoring extended data stream {}", ext);
                        }
                    }
                    Some(ChannelMsg::ExitStatus { exit_status }) => {
                        output.exit_status = Some(exit_status);
                    }
                    Some(ChannelMsg::ExitSignal { signal_name, .. }) => {
                        output.exit_signal = Some(signal_label(&signal_name));
                    }
                    Some(ChannelMsg::Failure) => {
                        return Err(SshError::Channel(format!(
                            "Server refused to exec '{}'",
                            command
                        )));
                    }
                    Some(ChannelMsg::Close) | None => break,
                    Some(_) => {}
                }
            }

            Ok(output)
        })
    }

    fn server_host_key(&self) -> Result<Vec<u8>, SshError> {
        let slot = self.host_key.lock();
        let key = slot.as_ref().ok_or_else(|| {
            SshError::Channel("Server host key was not recorded during handshake".to_string())
        })?;

        key.to_bytes()
            .map_err(|e| SshError::Channel(format!("Failed to encode host key: {}", e)))
    }

    fn open_sftp(&mut self) -> Result<Box<dyn SftpChannel>, SshError> {
        let Self {
            runtime, handle, ..
        } = self;

        let sftp = runtime.block_on(async {
            let channel = handle
                .channel_open_session()
                .await
                .map_err(|e| SshError::Channel(format!("Failed to open channel: {}", e)))?;

            channel
                .request_subsystem(true, "sftp")
                .await
                .map_err(|e| {
                    SshError::Channel(format!("Failed to request SFTP subsystem: {}", e))
                })?;

            RusshSftpSession::new(channel.into_stream())
                .await
                .map_err(|e| {
                    SshError::Channel(format!("Failed to initialize SFTP session: {}", e))
                })
        })?;

        Ok(Box::new(RusshSftpChannel {
            runtime: runtime.clone(),
            sftp,
        }))
    }

    fn close(&mut self) -> Result<(), SshError> {
        let Self {
            runtime, handle, ..
        } = self;

        runtime.block_on(handle.disconnect(Disconnect::ByApplication, "", "English"))?;
        Ok(())
    }
}

/// Signal name as sent on the wire, without the `SIG` prefix
fn signal_label(signal: &Sig) -> String {
    match signal {
        Sig::Custom(name) => name.clone(),
        other => format!("{:?}", other),
    }
}

fn is_no_such_file(err: &SftpClientError) -> bool {
    matches!(
        err,
        SftpClientError::Status(status) if matches!(status.status_code, StatusCode::NoSuchFile)
    )
}

/// SFTP subsystem channel on a [`RusshTransport`]
pub struct RusshSftpChannel {
    runtime: Arc<Runtime>,
    sftp: RusshSftpSession,
}

impl std::fmt::Debug for RusshSftpChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RusshSftpChannel").finish_non_exhaustive()
    }
}

impl SftpChannel for RusshSftpChannel {
    fn put(&mut self, remote_path: &str, source: &mut dyn Read) -> Result<u64, SshError> {
        let Self { runtime, sftp } = self;

        runtime.block_on(async {
            let mut remote = sftp
                .open_with_flags(
                    remote_path,
                    OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE,
                )
                .await
                .map_err(|e| {
                    SshError::Transfer(format!("Failed to open remote file {}: {}", remote_path, e))
                })?;

            let mut buf = vec![0u8; TRANSFER_CHUNK_SIZE];
            let mut total: u64 = 0;

            loop {
                let n = match source.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        return Err(SshError::Transfer(format!(
                            "Failed to read local data for {}: {}",
                            remote_path, e
                        )));
                    }
                };

                remote.write_all(&buf[..n]).await.map_err(|e| {
                    SshError::Transfer(format!("Failed to write {}: {}", remote_path, e))
                })?;
                total += n as u64;
            }

            remote.shutdown().await.map_err(|e| {
                SshError::Transfer(format!("Failed to close remote file {}: {}", remote_path, e))
            })?;

            Ok(total)
        })
    }

    fn get(&mut self, remote_path: &str, sink: &mut dyn Write) -> Result<u64, SshError> {
        let Self { runtime, sftp } = self;

        runtime.block_on(async {
            let mut remote = sftp.open(remote_path).await.map_err(|e| {
                if is_no_such_file(&e) {
                    SshError::RemoteNotFound(remote_path.to_string())
                } else {
                    SshError::Transfer(format!("Failed to open remote file {}: {}", remote_path, e))
                }
            })?;

            let mut buf = vec![0u8; TRANSFER_CHUNK_SIZE];
            let mut total: u64 = 0;

            loop {
                let n = remote.read(&mut buf).await.map_err(|e| {
                    SshError::Transfer(format!("Failed to read {}: {}", remote_path, e))
                })?;
                if n == 0 {
                    break;
                }

                sink.write_all(&buf[..n]).map_err(|e| {
                    SshError::Transfer(format!(
                        "Failed to write local data for {}: {}",
                        remote_path, e
                    ))
                })?;
                total += n as u64;
            }

            sink.flush().map_err(|e| {
                SshError::Transfer(format!("Failed to flush local data for {}: {}", remote_path, e))
            })?;

            Ok(total)
        })
    }

    fn remote_size(&mut self, remote_path: &str) -> Result<Option<u64>, SshError> {
        let Self { runtime, sftp } = self;

        match runtime.block_on(sftp.metadata(remote_path)) {
            Ok(metadata) => Ok(Some(metadata.size.unwrap_or(0))),
            Err(e) if is_no_such_file(&e) => Ok(None),
            Err(e) => Err(SshError::Transfer(format!(
                "Failed to get metadata for {}: {}",
                remote_path, e
            ))),
        }
    }

    fn close(&mut self) -> Result<(), SshError> {
        let Self { runtime, sftp } = self;

        runtime
            .block_on(sftp.close())
            .map_err(|e| SshError::Channel(format!("Failed to close SFTP session: {}", e)))
    }
}

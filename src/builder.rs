use std::path::PathBuf;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::config::{ConnectionConfig, ConnectionProfile, Credential, DEFAULT_PORT};
use crate::error::SshError;
use crate::sftp::SftpSession;
use crate::ssh::Session;
use crate::transport::{Connector, RusshConnector};

/// Fluent connection settings.
///
/// Setters only record values; everything is validated by [`build`](Self::build),
/// which [`connect`](Self::connect) and [`connect_sftp`](Self::connect_sftp) call first.
///
/// ```no_run
/// use sshconnect::ConnectionBuilder;
///
/// let mut session = ConnectionBuilder::new()
///     .to("example.com")
///     .on_port(22)
///     .as_user("bob")
///     .with_password("secret")
///     .timeout(15)
///     .connect()?;
///
/// println!("{}", session.run("uname -a")?.output());
/// session.disconnect()?;
/// # Ok::<(), sshconnect::SshError>(())
/// ```
#[derive(Clone)]
pub struct ConnectionBuilder {
    hostname: String,
    port: u16,
    username: String,
    password: Option<SecretString>,
    private_key: Option<PathBuf>,
    key_passphrase: Option<SecretString>,
    timeout_secs: Option<u64>,
    connector: Arc<dyn Connector>,
}

impl std::fmt::Debug for ConnectionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionBuilder")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("private_key", &self.private_key)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl Default for ConnectionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionBuilder {
    /// Empty builder on port 22 using the `russh` transport
    pub fn new() -> Self {
        Self {
            hostname: String::new(),
            port: DEFAULT_PORT,
            username: String::new(),
            password: None,
            private_key: None,
            key_passphrase: None,
            timeout_secs: None,
            connector: Arc::new(RusshConnector::new()),
        }
    }

    /// Seed a builder from a profile file entry. A private key wins over a password.
    pub fn from_profile(profile: &ConnectionProfile) -> Self {
        let mut builder = Self::new()
            .to(profile.hostname.clone())
            .on_port(profile.port)
            .as_user(profile.username.clone());

        if let Some(password) = &profile.password {
            builder = builder.with_password(password.clone());
        }
        if let Some(key) = &profile.private_key {
            builder = builder.with_private_key(key.clone());
        }
        builder.key_passphrase = profile.key_passphrase.clone();
        builder.timeout_secs = profile.timeout;
        builder
    }

    pub fn to(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn on_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn as_user(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Log in with a password. Replaces any private key set earlier.
    pub fn with_password(mut self, password: impl Into<SecretString>) -> Self {
        self.password = Some(password.into());
        self.private_key = None;
        self
    }

    /// Log in with the private key stored at `path`. Replaces any password set earlier.
    pub fn with_private_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_key = Some(path.into());
        self.password = None;
        self
    }

    /// Passphrase for an encrypted private key
    pub fn with_key_passphrase(mut self, passphrase: impl Into<SecretString>) -> Self {
        self.key_passphrase = Some(passphrase.into());
        self
    }

    /// Connect-phase timeout in seconds; `0` waits indefinitely
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = Some(seconds);
        self
    }

    /// Use a different transport implementation
    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Arc::new(connector);
        self
    }

    fn credential(&self) -> Option<Credential> {
        let password = self
            .password
            .clone()
            .map(Credential::Password)
            .filter(|c| !c.is_empty());

        password.or_else(|| {
            self.private_key
                .clone()
                .map(|path| Credential::PrivateKey {
                    path,
                    passphrase: self
                        .key_passphrase
                        .clone()
                        .filter(|p| !p.expose_secret().is_empty()),
                })
                .filter(|c| !c.is_empty())
        })
    }

    /// Validate and snapshot the current settings
    pub fn build(&self) -> Result<ConnectionConfig, SshError> {
        if self.hostname.trim().is_empty() {
            return Err(SshError::Configuration(
                "Hostname not specified.".to_string(),
            ));
        }

        if self.username.trim().is_empty() {
            return Err(SshError::Configuration(
                "Username not specified.".to_string(),
            ));
        }

        let credential = self.credential().ok_or_else(|| {
            SshError::Configuration("No password or private key path specified.".to_string())
        })?;

        Ok(ConnectionConfig {
            hostname: self.hostname.clone(),
            port: self.port,
            username: self.username.clone(),
            credential,
            timeout_secs: self.timeout_secs,
        })
    }

    /// Validate, open an SSH connection and authenticate.
    pub fn connect(&self) -> Result<Session, SshError> {
        let mut session = Session::new(self.build()?, self.connector.clone());
        session.connect()?;
        Ok(session)
    }

    /// Validate, open a separate connection and start SFTP on it.
    pub fn connect_sftp(&self) -> Result<SftpSession, SshError> {
        let mut sftp = SftpSession::new(self.build()?, self.connector.clone());
        sftp.connect()?;
        Ok(sftp)
    }
}

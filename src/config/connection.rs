use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

/// Standard SSH port
pub const DEFAULT_PORT: u16 = 22;

/// Connect-phase timeout used when none is configured
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// The single credential used to log in
#[derive(Clone)]
pub enum Credential {
    /// Plaintext password, exposed only at authentication time
    Password(SecretString),
    /// Path to a private key file, optionally encrypted
    PrivateKey {
        path: PathBuf,
        passphrase: Option<SecretString>,
    },
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Password(_) => f.debug_tuple("Password").field(&"[REDACTED]").finish(),
            Credential::PrivateKey { path, passphrase } => f
                .debug_struct("PrivateKey")
                .field("path", path)
                .field("passphrase", &passphrase.as_ref().map(|_| "[REDACTED]"))
                .finish(),
        }
    }
}

impl Credential {
    /// A credential with no usable content counts as unset.
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Credential::Password(password) => password.expose_secret().is_empty(),
            Credential::PrivateKey { path, .. } => path.as_os_str().is_empty(),
        }
    }
}

/// Validated connection settings.
///
/// Produced by [`crate::ConnectionBuilder::build`]; hostname and username are
/// non-empty and exactly one credential is present.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub credential: Credential,
    pub timeout_secs: Option<u64>,
}

impl ConnectionConfig {
    /// Timeout applied once while opening the socket and completing the handshake.
    /// `Some(0)` disables it.
    pub fn connect_timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            None => Some(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)),
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        }
    }

    /// `host:port` form used in logs and error messages
    pub fn address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

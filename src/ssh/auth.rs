use std::path::Path;
use std::sync::Arc;

use russh::keys::{HashAlg, PrivateKey};
use secrecy::{ExposeSecret, SecretString};

use crate::config::{Credential, paths};
use crate::error::SshError;

/// Credential ready to hand to a transport
#[derive(Clone)]
pub enum ResolvedAuth {
    /// Password authentication with zeroized secret string
    Password(SecretString),
    /// Public key authentication with a decoded private key
    PublicKey {
        key: Arc<PrivateKey>,
        hash_alg: Option<HashAlg>,
    },
}

impl std::fmt::Debug for ResolvedAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedAuth::Password(_) => f.debug_tuple("Password").field(&"[REDACTED]").finish(),
            ResolvedAuth::PublicKey { hash_alg, .. } => f
                .debug_struct("PublicKey")
                .field("key", &"[KEY]")
                .field("hash_alg", hash_alg)
                .finish(),
        }
    }
}

impl ResolvedAuth {
    /// Resolve a configured credential, loading key material from disk.
    ///
    /// Runs before any socket is opened so key problems surface without network I/O.
    pub fn resolve(credential: &Credential) -> Result<Self, SshError> {
        match credential {
            Credential::Password(password) => Ok(ResolvedAuth::Password(password.clone())),
            Credential::PrivateKey { path, passphrase } => {
                let expanded_path = paths::expand_tilde(&path.to_string_lossy());
                let passphrase = passphrase.as_ref().map(|p| p.expose_secret());
                load_key_file(&expanded_path, passphrase)
            }
        }
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            ResolvedAuth::Password(_) => "password",
            ResolvedAuth::PublicKey { .. } => "publickey",
        }
    }
}

/// Name of the public key type if `first_line` holds public key material.
fn public_key_type(first_line: &str) -> Option<String> {
    if let Ok(key) = ssh_key::PublicKey::from_openssh(first_line) {
        return Some(key.algorithm().as_str().to_string());
    }

    if first_line.starts_with("ssh-") || first_line.starts_with("ecdsa-") {
        return first_line.split_whitespace().next().map(str::to_string);
    }

    // PKCS#8 / SSH2 public key armor
    if first_line.contains("PUBLIC KEY") {
        return Some("PEM".to_string());
    }

    None
}

/// Load an SSH private key from file
fn load_key_file(path: &Path, passphrase: Option<&str>) -> Result<ResolvedAuth, SshError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SshError::NotFound(path.to_path_buf()),
        _ => SshError::LocalIo {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let first_line = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    if let Some(key_type) = public_key_type(first_line) {
        return Err(SshError::Configuration(format!(
            "key must be private: {} contains a public {} key",
            path.display(),
            key_type
        )));
    }

    if !first_line.starts_with("-----BEGIN") {
        return Err(SshError::Configuration(format!(
            "{} does not appear to be a valid SSH private key",
            path.display()
        )));
    }

    let key = russh::keys::decode_secret_key(&content, passphrase).map_err(|e| {
        let normalized = e.to_string().to_lowercase();
        let is_passphrase_error = normalized.contains("encrypted")
            || normalized.contains("passphrase")
            || normalized.contains("cryptographic");
        if is_passphrase_error {
            if passphrase.is_some() {
                SshError::Configuration(format!(
                    "Invalid passphrase for key {}",
                    path.display()
                ))
            } else {
                SshError::Configuration(format!(
                    "Key {} is encrypted and needs a passphrase",
                    path.display()
                ))
            }
        } else {
            SshError::Configuration(format!("Failed to load key {}: {}", path.display(), e))
        }
    })?;

    // ED25519 and ECDSA keys use their native signing algorithms
    let hash_alg = if key.algorithm().is_rsa() {
        Some(HashAlg::Sha512)
    } else {
        None
    };

    Ok(ResolvedAuth::PublicKey {
        key: Arc::new(key),
        hash_alg,
    })
}

//! Connection profiles stored as TOML.
//!
//! ```toml
//! hostname = "example.com"
//! port = 2222
//! username = "bob"
//! private_key = "~/.ssh/id_ed25519"
//! timeout = 15
//! ```

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

use super::connection::DEFAULT_PORT;

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

/// Connection settings as written in a profile file
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionProfile {
    #[serde(default)]
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub password: Option<SecretString>,
    #[serde(default)]
    pub private_key: Option<PathBuf>,
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub key_passphrase: Option<SecretString>,
    /// Connect timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl ConnectionProfile {
    /// Parse a profile from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Load a profile from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!("Loading connection profile from: {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_toml_str(&content)
    }
}

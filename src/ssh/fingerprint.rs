//! Host key fingerprints.
//!
//! MD5 and SHA-1 follow the historical SSH fingerprint conventions. Both are
//! weak hashes; treat the result as informational.

use std::fmt;
use std::str::FromStr;

use data_encoding::HEXUPPER;
use md5::{Digest, Md5};
use sha1::Sha1;

use crate::error::SshError;

/// Supported fingerprint hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FingerprintAlgorithm {
    #[default]
    Md5,
    Sha1,
}

impl FingerprintAlgorithm {
    pub const ALL: [FingerprintAlgorithm; 2] =
        [FingerprintAlgorithm::Md5, FingerprintAlgorithm::Sha1];

    pub fn name(self) -> &'static str {
        match self {
            FingerprintAlgorithm::Md5 => "md5",
            FingerprintAlgorithm::Sha1 => "sha1",
        }
    }

    fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            FingerprintAlgorithm::Md5 => Md5::digest(data).to_vec(),
            FingerprintAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
        }
    }

    /// Uppercase hex digest of a host key blob
    pub fn fingerprint(self, host_key: &[u8]) -> String {
        HEXUPPER.encode(&self.digest(host_key))
    }
}

impl fmt::Display for FingerprintAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FingerprintAlgorithm {
    type Err = SshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "");
        Self::ALL
            .into_iter()
            .find(|alg| alg.name() == wanted)
            .ok_or_else(|| {
                SshError::Configuration(format!("Invalid fingerprint type specified: {}", s))
            })
    }
}

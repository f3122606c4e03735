pub mod connection;
pub mod paths;
pub mod profile;

pub use connection::{ConnectionConfig, Credential, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_PORT};
pub use profile::ConnectionProfile;

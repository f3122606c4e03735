//! SSH sessions: connect, authenticate, run commands and fingerprint the server.

pub mod auth;
pub(crate) mod client;
pub mod command;
pub mod fingerprint;
pub mod session;

pub use command::CommandResult;
pub use fingerprint::FingerprintAlgorithm;
pub use session::{Session, SessionState};

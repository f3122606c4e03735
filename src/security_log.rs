//! Security event logging for audit trails.
//!
//! All security events are logged with `target: "security"` to allow filtering
//! in production environments.
//!
//! # Example
//!
//! Filter security events only:
//! ```bash
//! RUST_LOG=security=info cargo run --example remote_exec -- ...
//! ```

use tracing::{info, warn};

/// Log an SSH authentication attempt.
///
/// Called before attempting to authenticate with a remote host.
pub fn log_auth_attempt(host: &str, port: u16, username: &str, method: &str) {
    info!(
        target: "security",
        event = "auth_attempt",
        host = %host,
        port = port,
        username = %username,
        method = %method,
        "SSH authentication attempt"
    );
}

/// Log a successful SSH authentication.
pub fn log_auth_success(host: &str, port: u16, username: &str, method: &str) {
    info!(
        target: "security",
        event = "auth_success",
        host = %host,
        port = port,
        username = %username,
        method = %method,
        "SSH authentication succeeded"
    );
}

/// Log a failed SSH authentication attempt.
pub fn log_auth_failure(host: &str, port: u16, username: &str, method: &str, reason: &str) {
    warn!(
        target: "security",
        event = "auth_failure",
        host = %host,
        port = port,
        username = %username,
        method = %method,
        reason = %reason,
        "SSH authentication failed"
    );
}

/// Log an SFTP connection establishment.
pub fn log_sftp_connect(host: &str, port: u16, username: &str) {
    info!(
        target: "security",
        event = "sftp_connect",
        host = %host,
        port = port,
        username = %username,
        "SFTP connection established"
    );
}

/// Log an explicit disconnect of an SSH or SFTP session.
pub fn log_disconnect(host: &str, port: u16, username: &str, kind: &str) {
    info!(
        target: "security",
        event = "disconnect",
        host = %host,
        port = port,
        username = %username,
        kind = %kind,
        "Session disconnected"
    );
}

/// Log a host key fingerprint handed to the caller.
pub fn log_host_key_fingerprint(host: &str, port: u16, algorithm: &str, fingerprint: &str) {
    info!(
        target: "security",
        event = "host_key_fingerprint",
        host = %host,
        port = port,
        algorithm = %algorithm,
        fingerprint = %fingerprint,
        "Host key fingerprint computed"
    );
}

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use russh::client::Handler;
use russh::keys::{HashAlg, PublicKey};

use crate::error::SshError;

/// Host key recorded during key exchange
pub(crate) type HostKeySlot = Arc<Mutex<Option<PublicKey>>>;

/// SSH client handler implementation
pub(crate) struct ClientHandler {
    host: String,
    port: u16,
    host_key: HostKeySlot,
}

impl ClientHandler {
    pub(crate) fn new(host: String, port: u16, host_key: HostKeySlot) -> Self {
        Self {
            host,
            port,
            host_key,
        }
    }
}

impl Handler for ClientHandler {
    type Error = SshError;

    /// Every host key is accepted; callers compare `Session::fingerprint` themselves.
    fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send {
        tracing::debug!(
            "Host key for {}:{} - {} ({})",
            self.host,
            self.port,
            server_public_key.fingerprint(HashAlg::Sha256),
            server_public_key.algorithm().as_str()
        );
        *self.host_key.lock() = Some(server_public_key.clone());

        async { Ok(true) }
    }
}

use crate::config::ConnectionConfig;
use crate::error::SshError;
use crate::security_log;
use crate::transport::{Connector, Transport};

use super::auth::ResolvedAuth;

/// Open a transport for `config` and log in.
///
/// Key material is resolved first so a bad key fails without touching the
/// network. A single attempt is made; nothing is retried.
pub(crate) fn open_authenticated(
    config: &ConnectionConfig,
    connector: &dyn Connector,
) -> Result<Box<dyn Transport>, SshError> {
    let auth = ResolvedAuth::resolve(&config.credential)?;

    let mut transport = connector.open(&config.hostname, config.port, config.connect_timeout())?;

    if let Err(e) = authenticate(transport.as_mut(), config, &auth) {
        if let Err(close_err) = transport.close() {
            tracing::debug!("Close after failed authentication: {}", close_err);
        }
        return Err(e);
    }

    Ok(transport)
}

fn authenticate(
    transport: &mut dyn Transport,
    config: &ConnectionConfig,
    auth: &ResolvedAuth,
) -> Result<(), SshError> {
    let method_name = auth.method_name();
    let (hostname, port, username) = (&config.hostname, config.port, &config.username);

    security_log::log_auth_attempt(hostname, port, username, method_name);

    let accepted = match transport.authenticate(username, auth) {
        Ok(accepted) => accepted,
        Err(e) => {
            let reason = e.to_string();
            security_log::log_auth_failure(hostname, port, username, method_name, &reason);
            return Err(SshError::AuthenticationFailed(reason));
        }
    };

    if !accepted {
        let reason = match auth {
            ResolvedAuth::Password(_) => "Error authenticating with password",
            ResolvedAuth::PublicKey { .. } => "Error authenticating with public-private key pair",
        };
        security_log::log_auth_failure(hostname, port, username, method_name, reason);
        return Err(SshError::AuthenticationFailed(reason.to_string()));
    }

    security_log::log_auth_success(hostname, port, username, method_name);
    Ok(())
}

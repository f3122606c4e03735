//! SSH connection tests

use sshconnect::{ErrorKind, FingerprintAlgorithm, SessionState};

use super::fixtures::SshTestEnvironment;

#[test]
fn test_password_auth_runs_command() {
    skip_if_no_docker!();
    let _guard = super::fixtures::acquire_test_lock();
    let env = SshTestEnvironment::new().expect("Failed to create test environment");

    let mut session = env.password_builder().connect().expect("connect");

    let result = session.run("echo hi").expect("run");
    assert_eq!(result.output(), "hi");
    assert_eq!(result.exit_status(), Some(0));

    let whoami = session.run("whoami").expect("run");
    assert_eq!(whoami.output(), env.server.username);

    session.disconnect().expect("disconnect");
    assert_eq!(session.state(), SessionState::Closed);
}

#[test]
fn test_stderr_and_exit_status() {
    skip_if_no_docker!();
    let _guard = super::fixtures::acquire_test_lock();
    let env = SshTestEnvironment::new().expect("Failed to create test environment");

    let mut session = env.password_builder().connect().expect("connect");
    let result = session
        .run("echo out; echo err 1>&2; exit 3")
        .expect("run");

    assert_eq!(result.output(), "out");
    assert_eq!(result.error(), "err");
    assert_eq!(result.exit_status(), Some(3));
    assert!(!result.success());
    assert!(session.is_connected());
}

#[test]
fn test_command_reading_stdin_sees_end_of_input() {
    skip_if_no_docker!();
    let _guard = super::fixtures::acquire_test_lock();
    let env = SshTestEnvironment::new().expect("Failed to create test environment");

    let mut session = env.password_builder().connect().expect("connect");
    let result = session.run("cat; echo done").expect("run");

    assert_eq!(result.output(), "done");
    assert_eq!(result.exit_status(), Some(0));
}

#[test]
fn test_key_auth() {
    skip_if_no_docker!();
    let _guard = super::fixtures::acquire_test_lock();
    let env = SshTestEnvironment::new().expect("Failed to create test environment");

    let mut session = env
        .builder()
        .with_private_key(env.server.private_key_path.clone())
        .connect()
        .expect("connect with key");
    assert_eq!(session.run("echo key").expect("run").output(), "key");
}

#[test]
fn test_encrypted_key_auth() {
    skip_if_no_docker!();
    let _guard = super::fixtures::acquire_test_lock();
    let env = SshTestEnvironment::new().expect("Failed to create test environment");

    let session = env
        .builder()
        .with_private_key(env.server.encrypted_key_path.clone())
        .with_key_passphrase(env.server.key_passphrase.clone())
        .connect()
        .expect("connect with encrypted key");
    assert!(session.is_connected());
}

#[test]
fn test_wrong_password_rejected() {
    skip_if_no_docker!();
    let _guard = super::fixtures::acquire_test_lock();
    let env = SshTestEnvironment::new().expect("Failed to create test environment");

    let err = env
        .builder()
        .with_password("definitely-wrong")
        .connect()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[test]
fn test_closed_port_is_connection_error() {
    skip_if_no_docker!();
    let _guard = super::fixtures::acquire_test_lock();
    let env = SshTestEnvironment::new().expect("Failed to create test environment");

    let err = env.password_builder().on_port(1).connect().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
}

#[test]
fn test_fingerprints_are_stable_across_connections() {
    skip_if_no_docker!();
    let _guard = super::fixtures::acquire_test_lock();
    let env = SshTestEnvironment::new().expect("Failed to create test environment");

    let builder = env.password_builder();
    let mut first = builder.connect().expect("connect");
    let mut second = builder.connect().expect("connect");

    let md5 = first.fingerprint(FingerprintAlgorithm::Md5).expect("md5");
    let sha1 = first.fingerprint_str("sha1").expect("sha1");

    assert_eq!(md5.len(), 32);
    assert_eq!(sha1.len(), 40);
    assert_eq!(second.fingerprint_str("md5").expect("md5"), md5);
    assert_eq!(second.fingerprint(FingerprintAlgorithm::Sha1).expect("sha1"), sha1);
}

//! SFTP transfer tests

use sshconnect::{ErrorKind, SshError};

use super::fixtures::SshTestEnvironment;

#[test]
fn test_upload_download_round_trip() {
    skip_if_no_docker!();
    let _guard = super::fixtures::acquire_test_lock();
    let env = SshTestEnvironment::new().expect("Failed to create test environment");

    // Larger than one transfer chunk
    let content: Vec<u8> = (0..200_000u32).map(|i| (i % 253) as u8).collect();
    let local = env.work_dir.path().join("upload.bin");
    std::fs::write(&local, &content).unwrap();

    let mut sftp = env.password_builder().connect_sftp().expect("sftp connect");

    let up = sftp.upload(&local, "/tmp/sshconnect-roundtrip.bin").expect("upload");
    assert!(up.success);
    assert_eq!(up.bytes_transferred, content.len() as u64);

    let target = env.work_dir.path().join("down/roundtrip.bin");
    let down = sftp
        .download("/tmp/sshconnect-roundtrip.bin", &target)
        .expect("download");
    assert!(down.success);
    assert_eq!(std::fs::read(&target).unwrap(), content);

    sftp.disconnect().expect("disconnect");
}

#[test]
fn test_uploaded_file_is_visible_to_commands() {
    skip_if_no_docker!();
    let _guard = super::fixtures::acquire_test_lock();
    let env = SshTestEnvironment::new().expect("Failed to create test environment");

    let local = env.work_dir.path().join("hello.txt");
    std::fs::write(&local, "hello from sftp\n").unwrap();

    let builder = env.password_builder();
    let mut sftp = builder.connect_sftp().expect("sftp connect");
    let mut session = builder.connect().expect("connect");

    sftp.upload(&local, "/tmp/sshconnect-hello.txt").expect("upload");
    let result = session.run("cat /tmp/sshconnect-hello.txt").expect("run");
    assert_eq!(result.output(), "hello from sftp");
}

#[test]
fn test_download_missing_remote_file() {
    skip_if_no_docker!();
    let _guard = super::fixtures::acquire_test_lock();
    let env = SshTestEnvironment::new().expect("Failed to create test environment");

    let mut sftp = env.password_builder().connect_sftp().expect("sftp connect");
    let target = env.work_dir.path().join("missing.txt");

    let err = sftp
        .download("/tmp/sshconnect-does-not-exist", &target)
        .unwrap_err();
    assert!(matches!(err, SshError::RemoteNotFound(_)));
    assert!(!target.exists());
    assert!(sftp.is_connected());
}

#[test]
fn test_upload_missing_local_file() {
    skip_if_no_docker!();
    let _guard = super::fixtures::acquire_test_lock();
    let env = SshTestEnvironment::new().expect("Failed to create test environment");

    let mut sftp = env.password_builder().connect_sftp().expect("sftp connect");
    let err = sftp
        .upload("/nonexistent/file", "/tmp/sshconnect-never")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

//! Docker-based SSH test fixtures

use std::net::{TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::process::Command;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard, const_mutex};
use tempfile::TempDir;

use sshconnect::ConnectionBuilder;

// Ensure Docker containers are started only once per test run
static DOCKER_INIT: Once = Once::new();
static DOCKER_AVAILABLE: AtomicBool = AtomicBool::new(false);
static TEST_LOCK: Mutex<()> = const_mutex(());

/// Configuration for the test SSH server
#[derive(Debug, Clone)]
pub struct TestSshServer {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub private_key_path: PathBuf,
    pub encrypted_key_path: PathBuf,
    pub key_passphrase: String,
}

impl Default for TestSshServer {
    fn default() -> Self {
        let keys_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        Self {
            host: "127.0.0.1".to_string(),
            port: 2222,
            username: "testuser".to_string(),
            password: "testpass123".to_string(),
            private_key_path: keys_dir.join("id_ed25519"),
            encrypted_key_path: keys_dir.join("id_ed25519_encrypted"),
            key_passphrase: "fixturepass".to_string(),
        }
    }
}

/// Start Docker containers for SSH testing
pub fn ensure_docker_started() {
    DOCKER_INIT.call_once(|| {
        let docker_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/docker");

        if Command::new("docker").arg("--version").output().is_err() {
            eprintln!("WARNING: Docker not available, SSH integration tests will be skipped");
            return;
        }

        let status = if Command::new("docker")
            .args(["compose", "version"])
            .output()
            .is_ok_and(|o| o.status.success())
        {
            Command::new("docker")
                .current_dir(&docker_dir)
                .args(["compose", "up", "-d", "--build", "--wait"])
                .status()
        } else {
            Command::new("docker-compose")
                .current_dir(&docker_dir)
                .args(["up", "-d", "--build", "--wait"])
                .status()
        };

        match status {
            Ok(s) if s.success() => {
                DOCKER_AVAILABLE.store(true, Ordering::SeqCst);
                eprintln!("SSH test containers started successfully");
            }
            Ok(s) => {
                eprintln!(
                    "Failed to start SSH test containers: exit code {:?}",
                    s.code()
                );
            }
            Err(e) => {
                eprintln!("Failed to start SSH test containers: {}", e);
            }
        }
    });
}

/// Check if Docker containers are running
pub fn is_docker_available() -> bool {
    ensure_docker_started();
    DOCKER_AVAILABLE.load(Ordering::SeqCst)
}

/// Serialize tests sharing the container
pub fn acquire_test_lock() -> MutexGuard<'static, ()> {
    TEST_LOCK.lock()
}

/// Wait for SSH server to accept TCP connections
pub fn wait_for_ssh_ready(host: &str, port: u16) -> Result<(), String> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|e| e.to_string())?
        .next()
        .ok_or_else(|| format!("No address for {}:{}", host, port))?;
    let max_attempts = 30;

    for _ in 0..max_attempts {
        if TcpStream::connect_timeout(&addr, Duration::from_secs(2)).is_ok() {
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(200));
    }

    Err(format!(
        "SSH server not ready after {} attempts",
        max_attempts
    ))
}

/// Test environment with a scratch directory and the Docker server
pub struct SshTestEnvironment {
    pub server: TestSshServer,
    pub work_dir: TempDir,
}

impl SshTestEnvironment {
    pub fn new() -> Result<Self, String> {
        if !is_docker_available() {
            return Err("Docker not available".to_string());
        }

        let server = TestSshServer::default();
        wait_for_ssh_ready(&server.host, server.port)?;

        let work_dir = TempDir::new().map_err(|e| format!("Failed to create temp dir: {}", e))?;

        Ok(Self { server, work_dir })
    }

    /// Builder aimed at the test server with no credential set
    pub fn builder(&self) -> ConnectionBuilder {
        ConnectionBuilder::new()
            .to(self.server.host.clone())
            .on_port(self.server.port)
            .as_user(self.server.username.clone())
            .timeout(10)
    }

    pub fn password_builder(&self) -> ConnectionBuilder {
        self.builder().with_password(self.server.password.clone())
    }
}

/// Macro to skip tests when Docker is not available
#[macro_export]
macro_rules! skip_if_no_docker {
    () => {
        if !super::fixtures::is_docker_available() {
            eprintln!("Skipping test: Docker not available");
            return;
        }
    };
}

//! SSH integration tests
//!
//! These tests require Docker to run a test SSH server.
//! The server is automatically started when tests run.
//!
//! ## Running the tests
//!
//! ```bash
//! cargo test --test ssh_integration
//!
//! # Cleanup (optional - containers are reused)
//! cd tests/docker && docker compose down -v
//! ```

#[macro_use]
pub mod fixtures;

mod connection_tests;
mod sftp_tests;

//! Run one command on a remote host and print its output and host key fingerprints.
//!
//! ```bash
//! cargo run --example remote_exec -- bob@example.com:22 "uname -a"
//! ```
//!
//! The password is read from the first line of stdin.

use std::io::BufRead;
use std::process::ExitCode;

use anyhow::{Context, bail};
use sshconnect::{ConnectionBuilder, FingerprintAlgorithm};

fn parse_target(target: &str) -> anyhow::Result<(String, String, u16)> {
    let (user, rest) = target
        .split_once('@')
        .context("target must look like user@host[:port]")?;
    let (host, port) = match rest.rsplit_once(':') {
        Some((host, port)) => (host, port.parse().context("invalid port")?),
        None => (rest, 22),
    };
    Ok((user.to_string(), host.to_string(), port))
}

/// Process exit code mirroring the remote status; out-of-range statuses report 1
fn exit_code(status: Option<u32>) -> u8 {
    match status {
        None | Some(0) => 0,
        Some(status) => u8::try_from(status).unwrap_or(1),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let log_dir = sshconnect::config::paths::ensure_log_dir().ok();
    let _guard = sshconnect::logging::init_logging(log_dir);

    let mut args = std::env::args().skip(1);
    let (Some(target), command) = (args.next(), args.collect::<Vec<_>>().join(" ")) else {
        bail!("usage: remote_exec user@host[:port] <command>");
    };
    if command.is_empty() {
        bail!("usage: remote_exec user@host[:port] <command>");
    }
    let (user, host, port) = parse_target(&target)?;

    eprint!("Password: ");
    let mut password = String::new();
    std::io::stdin().lock().read_line(&mut password)?;

    let mut session = ConnectionBuilder::new()
        .to(host)
        .on_port(port)
        .as_user(user)
        .with_password(password.trim_end_matches(['\r', '\n']).to_string())
        .connect()?;

    for algorithm in FingerprintAlgorithm::ALL {
        println!("{:>4}: {}", algorithm, session.fingerprint(algorithm)?);
    }

    let result = session.run(&command)?;
    println!("{}", result.output());
    if !result.error().is_empty() {
        eprintln!("{}", result.error());
    }

    session.disconnect()?;

    // `_guard` must drop before the process exits to flush the log file
    Ok(ExitCode::from(exit_code(result.exit_status())))
}

/*
 * Copyright (c) 2025 Facmon Contributors
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! SSH local port forward used to reach a database behind a gateway host.
//!
//! The tunnel wraps a spawned `ssh -N -L` child process. Dropping the
//! `SshTunnel` kills the child, so the forward lives exactly as long as the
//! value that owns it.

use std::io;
use std::net::TcpStream;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::config::Tunnel;

const READY_TIMEOUT: Duration = Duration::from_secs(15);
const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A running SSH local port forward. Closed on drop.
pub struct SshTunnel {
    child: Child,
    local_port: u16,
}

impl SshTunnel {
    /// Spawns the forward and waits until the local port accepts connections.
    pub fn open(cfg: &Tunnel) -> io::Result<Self> {
        let forward = format!(
            "{}:{}:{}",
            cfg.local_port, cfg.remote_host, cfg.remote_port
        );
        let destination = format!("{}@{}", cfg.ssh_user, cfg.ssh_host);

        let mut command = Command::new("ssh");
        command
            .arg("-N")
            .arg("-L")
            .arg(&forward)
            .arg("-o")
            .arg("ExitOnForwardFailure=yes")
            .arg("-o")
            .arg("BatchMode=yes");
        if let Some(ref identity) = cfg.identity_file {
            command.arg("-i").arg(identity);
        }
        command
            .arg(&destination)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        info!(
            "Opening SSH tunnel {} via {}",
            forward, destination
        );
        let child = command.spawn()?;

        let mut tunnel = SshTunnel {
            child,
            local_port: cfg.local_port,
        };
        tunnel.wait_ready()?;
        Ok(tunnel)
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    fn wait_ready(&mut self) -> io::Result<()> {
        let deadline = Instant::now() + READY_TIMEOUT;
        let address = format!("127.0.0.1:{}", self.local_port);

        loop {
            // A child that exited early means the forward failed.
            if let Some(status) = self.child.try_wait()? {
                return Err(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    format!("ssh exited before the forward came up: {}", status),
                ));
            }
            if TcpStream::connect_timeout(
                &address.parse().map_err(|e| {
                    io::Error::new(io::ErrorKind::InvalidInput, format!("{}", e))
                })?,
                READY_POLL_INTERVAL,
            )
            .is_ok()
            {
                info!("SSH tunnel ready on {}", address);
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("SSH tunnel on {} did not become ready", address),
                ));
            }
            std::thread::sleep(READY_POLL_INTERVAL);
        }
    }
}

impl Drop for SshTunnel {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            warn!("Failed to close SSH tunnel: {}", e);
        }
        let _ = self.child.wait();
    }
}

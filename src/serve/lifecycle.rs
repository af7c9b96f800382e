//! Server lifecycle management.

use std::net::{IpAddr, SocketAddr};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossbeam::channel::Receiver;
use tiny_http::Server;

use crate::actor::Coordinator;
use crate::log;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                // port 0 asks the OS; report what it chose
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Run the actor system on its own runtime thread.
pub fn spawn_actors(coordinator: Coordinator, shutdown_rx: Receiver<()>) -> Result<JoinHandle<()>> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let handle = thread::Builder::new()
        .name("actors".into())
        .spawn(move || rt.block_on(coordinator.run(shutdown_rx)))
        .context("failed to spawn actor thread")?;
    Ok(handle)
}

/// Wait for the actor system to stop (max 2 seconds).
pub fn wait_for_shutdown(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_bind_retries_taken_port() {
        let (first, addr) = bind_with_retry(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).unwrap();
        assert_ne!(addr.port(), 0);

        match bind_with_retry(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port()) {
            Ok((_second, next)) => assert_ne!(next.port(), addr.port()),
            Err(e) => assert!(e.to_string().contains("failed to bind")),
        }
        drop(first);
    }
}

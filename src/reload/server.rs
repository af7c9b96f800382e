//! WebSocket listener for live reload.
//!
//! Accepted sockets are handed to the WsActor, which performs the handshake.

use std::net::{IpAddr, SocketAddr, TcpListener};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc::UnboundedSender;

use crate::actor::messages::WsMsg;
use crate::core::is_shutdown;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Bind the listener and start the acceptor thread.
///
/// Returns the port actually bound. A bind failure on every candidate port is
/// an error; the dev server cannot run without it.
pub fn start_ws_server_with_channel(
    interface: IpAddr,
    base_port: u16,
    ws_tx: UnboundedSender<WsMsg>,
) -> Result<u16> {
    let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        while !is_shutdown() {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("ws"; "client connected: {}", addr);
                    let _ = stream.set_nonblocking(false);
                    if ws_tx.send(WsMsg::AddClient(stream)).is_err() {
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(ACCEPT_POLL);
                }
                Err(e) => {
                    crate::log!("ws"; "accept error: {}", e);
                    std::thread::sleep(ACCEPT_POLL);
                }
            }
        }
    });

    Ok(actual_port)
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_port_retry_skips_taken_port() {
        let taken = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let port = taken.local_addr().unwrap().port();

        match try_bind_port(IpAddr::V4(Ipv4Addr::LOCALHOST), port, 10) {
            Ok((_listener, actual)) => assert_ne!(actual, port),
            // every following port may be taken on a busy machine
            Err(e) => assert!(e.to_string().contains("after 10 attempts")),
        }
    }

    #[test]
    fn test_accepted_client_reaches_actor() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let port = start_ws_server_with_channel(IpAddr::V4(Ipv4Addr::LOCALHOST), 0, tx).unwrap();
        assert_ne!(port, 0);

        let _client = std::net::TcpStream::connect((Ipv4Addr::LOCALHOST, port)).unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            match rx.try_recv() {
                Ok(WsMsg::AddClient(_)) => break,
                Ok(_) => panic!("unexpected message"),
                Err(_) if std::time::Instant::now() < deadline => std::thread::sleep(ACCEPT_POLL),
                Err(e) => panic!("no client received: {e}"),
            }
        }
    }
}

//! WebSocket Actor - Broadcast to Live-Reload Clients
//!
//! ```text
//! ReloadHandle --[Reload/Css/Error]--> WsActor --[broadcast]--> Clients
//! ```
//!
//! The last error is kept so clients that connect while a task is failing
//! still see the overlay.

use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::WsMsg;
use crate::reload::message::HotReloadMessage;

const READ_POLL: Duration = Duration::from_millis(100);

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: UnboundedReceiver<WsMsg>,
    clients: Clients,
    /// Error shown to clients that connect while a task is failing
    pending_error: Option<HotReloadMessage>,
}

impl WsActor {
    pub fn new(rx: UnboundedReceiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::default(),
            pending_error: None,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        std::thread::spawn(move || client_reader_loop(clients_for_reader));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Reload { reason } => {
                    crate::debug!("ws"; "reload: {}", reason);
                    self.broadcast(&HotReloadMessage::reload(reason));
                }
                WsMsg::Css { target } => {
                    crate::debug!("ws"; "css: {}", target);
                    self.broadcast(&HotReloadMessage::css(target));
                }
                WsMsg::Error { path, error } => {
                    let msg = HotReloadMessage::error(path, error);
                    self.broadcast(&msg);
                    self.pending_error = Some(msg);
                }
                WsMsg::ClearError => {
                    self.pending_error = None;
                    self.broadcast(&HotReloadMessage::ClearError);
                }
                WsMsg::AddClient(stream) => self.add_client(stream),
                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    for mut client in self.clients.lock().drain(..) {
                        let _ = client.close(None);
                    }
                    break;
                }
            }
        }
    }

    fn add_client(&self, stream: TcpStream) {
        // handshake in blocking mode, then switch to polling reads
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
                return;
            }
        };
        let _ = ws.get_ref().set_nonblocking(true);

        let greeting = std::iter::once(HotReloadMessage::connected()).chain(self.pending_error.clone());
        for msg in greeting {
            if let Err(e) = ws.send(Message::Text(msg.to_json().into())) {
                crate::log!("ws"; "failed to greet client: {}", e);
                return;
            }
        }

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("ws"; "client connected (total: {})", clients.len());
    }

    fn broadcast(&self, msg: &HotReloadMessage) {
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        let msg = Message::Text(msg.to_json().into());
        clients.retain_mut(|client| match client.send(msg.clone()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("ws"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {} clients", clients.len());
    }
}

/// Drain client frames so pings are answered and closed sockets are dropped.
fn client_reader_loop(clients: Clients) {
    while !crate::core::is_shutdown() {
        std::thread::sleep(READ_POLL);

        clients.lock().retain_mut(|client| match client.read() {
            Ok(Message::Close(_)) => false,
            Ok(_) => true,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => true,
            Err(_) => false,
        });
    }
}

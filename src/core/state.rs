//! Process-wide serve state.
//!
//! - `SHUTDOWN`: Ctrl+C received
//! - `SERVER`: the HTTP server to unblock on shutdown
//! - `SHUTDOWN_TX`: wakes the actor system

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tiny_http::Server;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

/// Install the Ctrl+C handler. Call once at program start.
///
/// - Before `register_server()`: exit immediately
/// - After: unblock the server and notify the actors
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if let Some(tx) = SHUTDOWN_TX.get() {
            let _ = tx.send(());
        }

        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "shutting down...");
            server.unblock();
        } else {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown.
pub fn register_server(server: Arc<Server>, shutdown_tx: crossbeam::channel::Sender<()>) {
    let _ = SERVER.set(server);
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

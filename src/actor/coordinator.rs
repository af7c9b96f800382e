//! Actor Coordinator - Wires up the Watch Actor System
//!
//! ```text
//! FsActor --TaskMsg--> TaskActor --ReloadHandle--> WsActor --> clients
//! ```
//!
//! Setup (WebSocket bind, watcher creation) happens synchronously in
//! [`Coordinator::new`], so failures reach the caller before serving starts.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use super::fs::FsActor;
use super::messages::{TaskMsg, WsMsg};
use super::task::TaskActor;
use super::ws::WsActor;
use crate::config::PipelineConfig;
use crate::reload::ReloadHandle;
use crate::reload::server::start_ws_server_with_channel;
use crate::watch::WatchSet;

/// Channel buffer size
const CHANNEL_BUFFER: usize = 32;

/// How often the shutdown signal is polled
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

pub struct Coordinator {
    fs: FsActor,
    task: TaskActor,
    ws: WsActor,
    task_tx: mpsc::Sender<TaskMsg>,
    reload: ReloadHandle,
    ws_port: u16,
}

impl Coordinator {
    /// Bind the WebSocket server and start watching.
    ///
    /// `ws_rx` is the receiving side of `reload`'s channel; messages queued
    /// before this call (failures of the initial build) are delivered.
    pub fn new(
        config: Arc<PipelineConfig>,
        reload: ReloadHandle,
        ws_rx: UnboundedReceiver<WsMsg>,
    ) -> Result<Self> {
        let ws_port = start_ws_server_with_channel(
            config.serve.interface,
            config.serve.ws_port,
            reload.sender(),
        )?;

        let watch_set = WatchSet::from_config(&config)?;
        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER);
        let fs = FsActor::new(Arc::clone(&config), watch_set, task_tx.clone())
            .context("failed to start file watcher")?;
        let task = TaskActor::new(task_rx, config, reload.clone());
        let ws = WsActor::new(ws_rx);

        Ok(Self {
            fs,
            task,
            ws,
            task_tx,
            reload,
            ws_port,
        })
    }

    /// Port the WebSocket server actually bound.
    pub fn ws_port(&self) -> u16 {
        self.ws_port
    }

    /// Run all actors until the shutdown signal arrives.
    pub async fn run(self, shutdown_rx: Receiver<()>) {
        let Self {
            fs,
            task,
            ws,
            task_tx,
            reload,
            ..
        } = self;

        let fs_handle = tokio::spawn(fs.run());
        let task_handle = tokio::spawn(task.run());
        let ws_handle = tokio::spawn(ws.run());
        crate::debug!("actor"; "start");

        // crossbeam receiver: poll instead of blocking a worker
        while shutdown_rx.try_recv().is_err() && !crate::core::is_shutdown() {
            tokio::time::sleep(SHUTDOWN_POLL).await;
        }

        crate::debug!("actor"; "shutdown signal received");
        fs_handle.abort();
        let _ = task_tx.send(TaskMsg::Shutdown).await;
        reload.shutdown();

        // a task may still be writing; give it a moment
        let _ = tokio::time::timeout(Duration::from_secs(2), async {
            let _ = task_handle.await;
            let _ = ws_handle.await;
        })
        .await;
        crate::debug!("actor"; "stopped");
    }
}

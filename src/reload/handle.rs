//! Task results -> live-reload messages.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::actor::messages::WsMsg;
use crate::config::PipelineConfig;
use crate::debug;
use crate::task::{TaskName, TaskOutcome};
use crate::utils::glob::to_slash;

/// Cloneable sender used by tasks while watching.
///
/// Tracks which tasks are currently failing so the error overlay is cleared
/// only once every one of them has recovered.
#[derive(Clone)]
pub struct ReloadHandle {
    tx: UnboundedSender<WsMsg>,
    failing: Arc<Mutex<FxHashSet<TaskName>>>,
}

impl ReloadHandle {
    pub fn channel() -> (Self, UnboundedReceiver<WsMsg>) {
        let (tx, rx) = unbounded_channel();
        let handle = Self {
            tx,
            failing: Arc::default(),
        };
        (handle, rx)
    }

    /// Translate one task outcome into client messages.
    pub fn notify(&self, task: TaskName, outcome: &TaskOutcome, config: &PipelineConfig) {
        match outcome {
            TaskOutcome::Failed(failure) => {
                self.failing.lock().insert(task);
                let path = failure
                    .path
                    .as_ref()
                    .map(|p| config.source_relative(p))
                    .unwrap_or_else(|| task.to_string());
                self.send(WsMsg::Error {
                    path,
                    error: failure.message.clone(),
                });
            }
            TaskOutcome::Done { .. } => {
                let cleared = {
                    let mut failing = self.failing.lock();
                    failing.remove(&task) && failing.is_empty()
                };
                if cleared {
                    self.send(WsMsg::ClearError);
                }

                let msg = match task {
                    TaskName::Styles => WsMsg::Css {
                        target: stylesheet_url(config),
                    },
                    _ => WsMsg::Reload {
                        reason: format!("{task} rebuilt"),
                    },
                };
                self.send(msg);
            }
        }
    }

    pub fn sender(&self) -> UnboundedSender<WsMsg> {
        self.tx.clone()
    }

    pub fn shutdown(&self) {
        self.send(WsMsg::Shutdown);
    }

    fn send(&self, msg: WsMsg) {
        if self.tx.send(msg).is_err() {
            debug!("ws"; "reload channel closed");
        }
    }
}

/// URL path of the compiled stylesheet: `/css/main.min.css`.
pub fn stylesheet_url(config: &PipelineConfig) -> String {
    let path = config.styles.output.join(config.styles.output_name());
    format!("/{}", to_slash(&path))
}

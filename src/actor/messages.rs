//! Actor Message Definitions
//!
//! ```text
//! FsActor --Run--> TaskActor --(ReloadHandle)--> WsActor
//! ```

use std::net::TcpStream;
use std::path::PathBuf;

use crate::task::TaskName;

// =============================================================================
// TaskActor Messages
// =============================================================================

/// Messages to the Task Actor
#[derive(Debug)]
pub enum TaskMsg {
    /// Run the tasks bound to a debounced batch of changes
    Run {
        tasks: Vec<TaskName>,
        /// Source-relative paths that triggered the batch
        paths: Vec<PathBuf>,
    },
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to the WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Full page reload
    Reload { reason: String },
    /// Swap one stylesheet in place
    Css { target: String },
    /// Show the error overlay
    Error { path: String, error: String },
    /// Hide the error overlay
    ClearError,
    /// Accepted socket, handshake pending
    AddClient(TcpStream),
    Shutdown,
}

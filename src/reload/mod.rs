//! Live reload.
//!
//! ```text
//! task result --ReloadHandle--> WsActor --JSON--> browser (hotreload.js)
//! ```
//!
//! - `handle` - turns task outcomes into messages, tracks failing tasks
//! - `message` - wire format
//! - `server` - WebSocket listener feeding the WsActor

mod handle;
pub mod message;
pub mod server;

pub use handle::{ReloadHandle, stylesheet_url};

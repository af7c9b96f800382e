//! Actor System for Watch Mode
//!
//! Message-passing concurrency for the dev server:
//!
//! ```text
//! FsActor --> TaskActor --> WsActor
//! (watch)     (run tasks)   (broadcast)
//! ```
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `task` - Runs watch-triggered tasks on the blocking pool
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod task;
pub mod ws;

pub use coordinator::Coordinator;

//! Actor System for Hot Reload
//!
//! Message-passing concurrency for `serve`:
//!
//! ```text
//! FsActor --> BuildActor --> WsActor
//! (watch)     (pipeline)    (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `builder` - Runs builds and reports outcomes
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod builder;
pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod ws;

pub use coordinator::Coordinator;

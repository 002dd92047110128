//! Reload Module
//!
//! Provides WebSocket-based live reload for development.
//!
//! # Architecture
//!
//! ```text
//! FsActor -> BuildActor -> WsActor -> Browser
//!  (watch)     (build)   (broadcast)  (hotreload.js)
//! ```
//!
//! # Modules
//!
//! - `message` - Hot reload message types (reload, error, clear_error)
//! - `server` - WebSocket listener handing clients to the actor system

pub mod message;
pub mod server;

//! Core types - pure abstractions shared across the codebase.

mod mode;
mod state;

pub use mode::{BuildMode, DevtoolPolicy};
pub use state::{is_healthy, is_shutdown, register_server, set_healthy, setup_shutdown_handler};

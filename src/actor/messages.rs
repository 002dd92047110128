//! Actor Message Definitions
//!
//! Message types for inter-actor communication.
//!
//! ```text
//! FsActor --Rebuild--> BuildActor --Reload/Error--> WsActor
//! ```

use std::path::PathBuf;

use crate::plugin::BuildScope;

// =============================================================================
// BuildActor Messages
// =============================================================================

/// Messages to Build Actor
#[derive(Debug)]
pub enum BuildMsg {
    /// Rebuild after source changes
    Rebuild {
        scope: BuildScope,
        /// Paths that triggered this build (for logging and the error overlay)
        changed: Vec<PathBuf>,
    },
    /// The config file changed; the running config is immutable
    ConfigChanged(PathBuf),
    /// Shutdown
    Shutdown,
}

impl BuildMsg {
    /// Fold a queued rebuild into this one. A full rebuild absorbs a restage.
    pub fn merge(&mut self, other: BuildMsg) -> Option<BuildMsg> {
        match (self, other) {
            (
                BuildMsg::Rebuild { scope, changed },
                BuildMsg::Rebuild {
                    scope: other_scope,
                    changed: other_changed,
                },
            ) => {
                if other_scope == BuildScope::Full {
                    *scope = BuildScope::Full;
                }
                for path in other_changed {
                    if !changed.contains(&path) {
                        changed.push(path);
                    }
                }
                None
            }
            (_, other) => Some(other),
        }
    }
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Reload all pages
    Reload { reason: String },
    /// Build error (display overlay, no reload)
    Error { path: String, error: String },
    /// Clear error overlay (build succeeded after error)
    ClearError,
    /// Add client
    AddClient(std::net::TcpStream),
    /// Shutdown
    Shutdown,
}

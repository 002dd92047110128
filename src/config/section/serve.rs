//! `[serve]` section configuration.
//!
//! Contains development server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! root = "."                  # Directory served as static content
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 8080                 # HTTP port number
//! hot = true                  # Watch sources and reload connected pages
//! ws_port = 35729             # WebSocket port for the reload channel
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Static file root, relative to the project root.
    pub root: PathBuf,

    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Enable file watcher and in-page reload.
    pub hot: bool,

    /// WebSocket port for the reload channel.
    pub ws_port: u16,
}

impl ServeConfig {
    pub const ROOT: FieldPath = FieldPath::new("serve.root");
    pub const WS_PORT: FieldPath = FieldPath::new("serve.ws_port");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.root.is_dir() {
            diag.error(
                Self::ROOT,
                format!("static root `{}` is not a directory", self.root.display()),
            );
        }
        if self.hot && self.port != 0 && self.ws_port == self.port {
            diag.error(Self::WS_PORT, "must differ from `serve.port`");
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            root: ".".into(),
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8080,
            hot: true,
            ws_port: 35729,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
    use std::path::PathBuf;

    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_serve_config() {
        let config =
            test_parse_config("[serve]\ninterface = \"0.0.0.0\"\nport = 3000\nhot = false");

        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
        );
        assert_eq!(config.serve.port, 3000);
        assert!(!config.serve.hot);
    }

    #[test]
    fn test_serve_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.serve.root, PathBuf::from("."));
        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
        assert_eq!(config.serve.port, 8080);
        assert!(config.serve.hot);
        assert_eq!(config.serve.ws_port, 35729);
    }

    #[test]
    fn test_serve_config_ipv6() {
        let config = test_parse_config("[serve]\ninterface = \"::1\"");
        assert_eq!(
            config.serve.interface,
            IpAddr::V6(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
        );
    }

    #[test]
    fn test_ws_port_collision() {
        let mut config = test_parse_config("[serve]\nport = 35729");
        config.serve.root = std::env::temp_dir();
        let mut diag = ConfigDiagnostics::new();
        config.serve.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}

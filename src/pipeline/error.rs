//! Build error types.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of a single build. Nothing here is retried.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to read entry module `{}`", path.display())]
    Entry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read HTML template `{}`", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external toolchain exited unsuccessfully. `message` is its output, untouched.
    #[error("`{tool}` failed\n{message}")]
    Toolchain { tool: String, message: String },

    #[error("`{tool}` not found in PATH (install it with `cargo install {tool}`)")]
    ToolchainMissing { tool: &'static str },

    #[error("failed to stage `{}` into the output directory", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolchain_message_is_verbatim() {
        let err = BuildError::Toolchain {
            tool: "wasm-pack".into(),
            message: "error[E0308]: mismatched types\n --> src/lib.rs:3:5".into(),
        };
        let text = err.to_string();
        assert!(text.starts_with("`wasm-pack` failed"));
        assert!(text.ends_with("error[E0308]: mismatched types\n --> src/lib.rs:3:5"));
    }

    #[test]
    fn test_missing_tool_hint() {
        let err = BuildError::ToolchainMissing { tool: "wasm-pack" };
        assert!(err.to_string().contains("cargo install wasm-pack"));
    }
}

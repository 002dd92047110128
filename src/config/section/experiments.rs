//! `[experiments]` section configuration.
//!
//! ```toml
//! [experiments]
//! async_wasm = true   # Instantiate the compiled module asynchronously
//! ```
//!
//! `async_wasm` must stay enabled while the `[wasm]` integration is active:
//! the bundle awaits module instantiation instead of loading it synchronously.

use serde::{Deserialize, Serialize};

/// Bundler capability flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentsConfig {
    pub async_wasm: bool,
}

impl Default for ExperimentsConfig {
    fn default() -> Self {
        Self { async_wasm: true }
    }
}

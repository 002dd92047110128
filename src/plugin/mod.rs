//! Build plugins.
//!
//! A build is a fixed sequence (clean, validate, compile, bundle, emit) with
//! extension points filled by plugins. Each plugin declares the [`Phase`] it
//! runs in; plugins of the same phase run in registration order.
//!
//! ```text
//! clean ─▶ validate ─▶ Phase::Compile ─▶ bundle ─▶ Phase::Emit
//!              │            │                         │
//!         Plugin::validate  WasmPackPlugin        HtmlPlugin
//! ```

mod html;
mod wasm;

pub use html::HtmlPlugin;
pub use wasm::{WasmPack, WasmPackPlugin};

#[cfg(test)]
pub(crate) use wasm::tests::FakeToolchain;

use crate::config::{BuildConfig, ConfigError};
use crate::utils::path::clean_path;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// When a plugin runs relative to bundling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the entry is bundled. May register module aliases.
    Compile,
    /// After the bundle is written.
    Emit,
}

/// How much of the project a build has to redo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildScope {
    /// Everything, including native compilation.
    #[default]
    Full,
    /// Reuse the previously compiled package; only bundle and emit.
    Restage,
}

/// A build extension.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn phase(&self) -> Phase;

    /// Check the configuration before anything is compiled or written.
    fn validate(&self, _config: &BuildConfig) -> Result<(), ConfigError> {
        Ok(())
    }

    fn apply(&self, ctx: &mut BuildContext<'_>) -> Result<()>;
}

/// A relative import target that the bundle rewrites to a staged module.
///
/// `./pkg`, `./pkg/index` and `./pkg/index.js` all refer to the same
/// generated glue module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleAlias {
    /// Directory of the generated package.
    pub dir: PathBuf,
    /// Base name of the glue module, without extension.
    pub name: String,
    /// Specifier written into the bundle.
    pub specifier: String,
}

impl ModuleAlias {
    pub fn matches(&self, resolved: &Path) -> bool {
        let resolved = clean_path(resolved);
        resolved == self.dir
            || resolved == self.dir.join(&self.name)
            || resolved == self.dir.join(format!("{}.js", self.name))
    }
}

/// Mutable state threaded through one build.
pub struct BuildContext<'a> {
    pub config: &'a BuildConfig,
    pub scope: BuildScope,
    pub aliases: Vec<ModuleAlias>,
    /// Files written to the output directory, in write order.
    pub emitted: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl<'a> BuildContext<'a> {
    pub fn new(config: &'a BuildConfig, scope: BuildScope) -> Self {
        Self {
            config,
            scope,
            aliases: Vec::new(),
            emitted: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn emit(&mut self, path: PathBuf) {
        crate::debug!("emit"; "{}", self.config.root_relative(&path).display());
        self.emitted.push(path);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Plugins for a configuration, in run order.
pub fn default_plugins(config: &BuildConfig) -> Vec<Box<dyn Plugin>> {
    let mut plugins: Vec<Box<dyn Plugin>> = Vec::new();
    if config.wasm.enable {
        plugins.push(Box::new(WasmPackPlugin::new(WasmPack)));
    }
    plugins.push(Box::new(HtmlPlugin));
    plugins
}

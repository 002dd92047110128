//! `[wasm]` section configuration.
//!
//! Contains the native crate compiled to WebAssembly with `wasm-pack`.
//!
//! # Example
//!
//! ```toml
//! [wasm]
//! enable = true              # Compile and link the crate into the bundle
//! crate_dir = "."            # Directory holding the crate's Cargo.toml
//! out_dir = "pkg"            # wasm-pack output, relative to crate_dir
//! out_name = "index"         # Base name of the generated .js/.wasm pair
//! extra_args = ["--no-typescript"]
//! force_mode = "production"  # Optional: ignore --mode for the wasm profile
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Component, PathBuf};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::core::BuildMode;
use crate::utils::path::{clean_path, to_slash};

/// Native crate compilation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WasmConfig {
    pub enable: bool,
    pub crate_dir: PathBuf,
    pub out_dir: PathBuf,
    pub out_name: String,
    pub extra_args: Vec<String>,
    pub force_mode: Option<BuildMode>,
}

impl WasmConfig {
    pub const CRATE_DIR: FieldPath = FieldPath::new("wasm.crate_dir");
    pub const OUT_DIR: FieldPath = FieldPath::new("wasm.out_dir");
    pub const OUT_NAME: FieldPath = FieldPath::new("wasm.out_name");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.enable {
            return;
        }
        if !self.manifest_path().is_file() {
            diag.error_with_hint(
                Self::CRATE_DIR,
                format!("no Cargo.toml in `{}`", self.crate_dir.display()),
                "point `wasm.crate_dir` at the crate to compile, or set `wasm.enable = false`",
            );
        }
        super::validate_file_name(&self.out_name, Self::OUT_NAME, diag);
        if self.out_dir.is_absolute() {
            diag.error(Self::OUT_DIR, "must be relative to `wasm.crate_dir`");
        } else if self.staged_dir().as_os_str().is_empty() {
            diag.error_with_hint(
                Self::OUT_DIR,
                format!("`{}` names no package directory", self.out_dir.display()),
                "use a directory like `pkg` or `../pkg`",
            );
        }
    }

    /// Path of the crate manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.crate_dir.join("Cargo.toml")
    }

    /// Absolute directory wasm-pack writes to.
    pub fn pkg_dir(&self) -> PathBuf {
        clean_path(&self.crate_dir.join(&self.out_dir))
    }

    /// Profile passed to wasm-pack for the given invocation mode.
    pub fn profile(&self, mode: BuildMode) -> BuildMode {
        self.force_mode.unwrap_or(mode)
    }

    /// Files of the generated package the bundle needs at runtime.
    pub fn runtime_files(&self) -> [String; 2] {
        [
            format!("{}.js", self.out_name),
            format!("{}_bg.wasm", self.out_name),
        ]
    }

    /// Import specifier of the package's JS glue, relative to the bundle.
    pub fn module_specifier(&self) -> String {
        let dir = to_slash(&self.staged_dir());
        format!("./{}/{}.js", dir, self.out_name)
    }

    /// Directory the package is staged under, relative to `output.dir`.
    ///
    /// Only the named components of `out_dir` are kept, so `../pkg` stages
    /// to `pkg` and the copy never leaves the output directory.
    pub fn staged_dir(&self) -> PathBuf {
        self.out_dir
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect()
    }
}

impl Default for WasmConfig {
    fn default() -> Self {
        Self {
            enable: true,
            crate_dir: ".".into(),
            out_dir: "pkg".into(),
            out_name: "index".into(),
            extra_args: Vec::new(),
            force_mode: None,
        }
    }
}

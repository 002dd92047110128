//! Build configuration for `wasp.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── output     # [output]
//! │   ├── html       # [html]
//! │   ├── wasm       # [wasm]
//! │   ├── experiments# [experiments]
//! │   └── serve      # [serve]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # Config discovery, path resolution
//! └── mod.rs         # BuildConfig (this file)
//! ```
//!
//! One `BuildConfig` is produced per invocation from the config file and the
//! `--mode` argument. It is immutable afterwards and handed around as
//! `Arc<BuildConfig>`.

pub mod section;
pub mod types;
mod util;

pub use section::{
    ExperimentsConfig, HtmlConfig, InjectPosition, OutputConfig, ServeConfig, WasmConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};
pub use util::find_config_file;

use crate::{
    cli::{Cli, Commands},
    core::{BuildMode, DevtoolPolicy},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing wasp.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Resolved build mode (internal use only)
    #[serde(skip)]
    pub mode: BuildMode,

    /// Program entry module
    pub entry: PathBuf,

    /// Bundle output settings
    pub output: OutputConfig,

    /// HTML document generation
    pub html: HtmlConfig,

    /// Native crate compilation
    pub wasm: WasmConfig,

    /// Bundler capability flags
    pub experiments: ExperimentsConfig,

    /// Development server settings
    pub serve: ServeConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            root: PathBuf::new(),
            mode: BuildMode::default(),
            entry: "index.js".into(),
            output: OutputConfig::default(),
            html: HtmlConfig::default(),
            wasm: WasmConfig::default(),
            experiments: ExperimentsConfig::default(),
            serve: ServeConfig::default(),
        }
    }
}

impl BuildConfig {
    pub const ENTRY: FieldPath = FieldPath::new("entry");

    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. Without one, the cwd is
    /// the project root and every default applies.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let mode = BuildMode::resolve(cli.mode.as_deref());

        let (config, root) = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                let root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config.config_path = Some(crate::utils::path::normalize_path(&path));
                (config, root)
            }
            None => {
                log!("config"; "no {} found, using defaults", cli.config.display());
                (Self::default(), cwd)
            }
        };

        let mut config = config.finalize(&root, mode);
        config.apply_command_options(cli);
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Attach root and mode, and resolve every path against the root.
    pub fn finalize(mut self, root: &Path, mode: BuildMode) -> Self {
        let root = crate::utils::path::normalize_path(root);
        self.mode = mode;
        self.normalize_paths(&root);
        self.root = root;
        self
    }

    /// Get path relative to the project root
    pub fn root_relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Debug-info policy for this invocation, derived from the mode.
    pub fn devtool(&self) -> DevtoolPolicy {
        DevtoolPolicy::for_mode(self.mode)
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        if let Commands::Serve {
            interface,
            port,
            hot,
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.hot, hot.as_ref());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Normalize all paths relative to root directory.
    fn normalize_paths(&mut self, root: &Path) {
        use util::resolve_against;

        self.entry = resolve_against(root, &self.entry);
        self.output.dir = resolve_against(root, &self.output.dir);
        self.html.template = resolve_against(root, &self.html.template);
        self.wasm.crate_dir = resolve_against(root, &self.wasm.crate_dir);
        self.serve.root = resolve_against(root, &self.serve.root);
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate inputs needed by a build.
    ///
    /// Collects all problems and returns them at once. Plugin-specific
    /// checks (such as the async wasm flag) are done by the plugins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if !self.entry.is_file() {
            diag.error_with_hint(
                Self::ENTRY,
                format!("entry `{}` not found", self.root_relative(&self.entry).display()),
                "set `entry` to the JavaScript module that starts the app",
            );
        }
        self.output.validate(&mut diag);
        self.html.validate(&mut diag);
        self.wasm.validate(&mut diag);
        self.validate_output_names(&mut diag);

        if !self.output.clean {
            diag.warn(
                FieldPath::new("output.clean"),
                "disabled; files from earlier builds may remain in the output directory",
            );
        }

        diag.print_warnings();
        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    /// Every file the build writes into `output.dir` needs its own name.
    fn validate_output_names(&self, diag: &mut ConfigDiagnostics) {
        let html = self.html.filename.as_str();
        for taken in [self.output.filename.clone(), self.output.map_filename()] {
            if html == taken {
                diag.error_with_hint(
                    HtmlConfig::FILENAME,
                    format!("`{html}` is also written by the bundle"),
                    "give the HTML document its own name, such as `index.html`",
                );
            }
        }

        if !self.wasm.enable {
            return;
        }
        let staged = self.wasm.staged_dir();
        let map = self.output.map_filename();
        if let Some(first) = staged.iter().next().and_then(|c| c.to_str()) {
            let clashes = [html, self.output.filename.as_str(), map.as_str()].contains(&first);
            if clashes {
                diag.error(
                    WasmConfig::OUT_DIR,
                    format!("staging directory `{first}` collides with an emitted file"),
                );
            }
        }
        if self.output.dir.join(&staged) == self.wasm.pkg_dir() {
            diag.error_with_hint(
                WasmConfig::OUT_DIR,
                "wasm-pack output is the staging directory itself",
                "keep `wasm.out_dir` outside `output.dir`",
            );
        }
    }

    /// Validate dev-server requirements on top of [`Self::validate`].
    pub fn validate_serve(&self) -> Result<(), ConfigError> {
        if self.mode.is_production() {
            return Err(ConfigError::ServeInProduction);
        }
        let mut diag = ConfigDiagnostics::new();
        self.serve.validate(&mut diag);
        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    /// Files whose changes require a rebuild in serve mode.
    pub fn watched_files(&self) -> Vec<PathBuf> {
        let mut files = vec![self.entry.clone(), self.html.template.clone()];
        if let Some(path) = &self.config_path {
            files.push(path.clone());
        }
        if self.wasm.enable {
            files.push(self.wasm.manifest_path());
        }
        files
    }

    /// Directories watched recursively in serve mode.
    pub fn watched_dirs(&self) -> Vec<PathBuf> {
        if self.wasm.enable {
            vec![self.wasm.crate_dir.join("src")]
        } else {
            Vec::new()
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> BuildConfig {
    let (parsed, ignored) = BuildConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Lay out a minimal valid project (entry, template, crate) under `root`.
#[cfg(test)]
pub fn test_project(root: &Path) -> BuildConfig {
    fs::write(
        root.join("index.js"),
        "import(\"./pkg\").catch(console.error);\n",
    )
    .unwrap();
    fs::write(
        root.join("index.html"),
        "<!DOCTYPE html>\n<html>\n<head>\n<title>app</title>\n</head>\n<body>\n<canvas id=\"canvas\"></canvas>\n</body>\n</html>\n",
    )
    .unwrap();
    fs::write(
        root.join("Cargo.toml"),
        "[package]\nname = \"smiley\"\nversion = \"0.1.0\"\n",
    )
    .unwrap();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/lib.rs"), "").unwrap();

    BuildConfig::default().finalize(root, BuildMode::Development)
}

// ============================================================================
// tests
// ============================================================================

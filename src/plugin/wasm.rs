//! Native crate compilation through `wasm-pack`.
//!
//! The crate is compiled for the `web` target and the generated glue module
//! and `.wasm` binary are staged into `<output.dir>/<wasm.staged_dir()>/`. The
//! entry's imports of the package are aliased to the staged module.
//!
//! The generated glue only supports asynchronous instantiation, so the
//! plugin refuses to run with `experiments.async_wasm = false`.

use super::{BuildContext, BuildScope, ModuleAlias, Phase, Plugin};
use crate::config::{BuildConfig, ConfigError, WasmConfig};
use crate::core::BuildMode;
use crate::pipeline::BuildError;
use crate::utils::exec::{Cmd, FilterRule};
use anyhow::Result;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// wasm-pack progress lines that add nothing to the build log.
static WASM_PACK_FILTER: FilterRule = FilterRule::new(&[
    "[INFO]: Checking for the Wasm target",
    "[INFO]: Compiling to Wasm",
    "[INFO]: Installing wasm-bindgen",
    "Compiling",
    "Finished",
]);

/// Something that compiles a crate into a wasm package.
pub trait WasmToolchain: Send + Sync {
    /// Compile `wasm.crate_dir` into `wasm.pkg_dir()` with the given profile.
    fn compile(&self, wasm: &WasmConfig, profile: BuildMode) -> Result<(), BuildError>;
}

/// The `wasm-pack` executable.
pub struct WasmPack;

impl WasmPack {
    const TOOL: &'static str = "wasm-pack";

    fn args(wasm: &WasmConfig, profile: BuildMode) -> Vec<String> {
        let mut args = vec![
            "build".to_string(),
            wasm.crate_dir.to_string_lossy().into_owned(),
            "--target".into(),
            "web".into(),
            "--out-dir".into(),
            wasm.out_dir.to_string_lossy().into_owned(),
            "--out-name".into(),
            wasm.out_name.clone(),
            if profile.is_production() {
                "--release".into()
            } else {
                "--dev".into()
            },
        ];
        args.extend(wasm.extra_args.iter().cloned());
        args
    }
}

impl WasmToolchain for WasmPack {
    fn compile(&self, wasm: &WasmConfig, profile: BuildMode) -> Result<(), BuildError> {
        let bin = which::which(Self::TOOL)
            .map_err(|_| BuildError::ToolchainMissing { tool: Self::TOOL })?;

        crate::log!("wasm-pack"; "compiling {} ({})", wasm.crate_dir.display(), profile);
        Cmd::new(bin)
            .name(Self::TOOL)
            .args(Self::args(wasm, profile))
            .cwd(&wasm.crate_dir)
            .pty(std::io::stdout().is_terminal())
            .filter(&WASM_PACK_FILTER)
            .run()
            .map_err(|e| BuildError::Toolchain {
                tool: Self::TOOL.to_string(),
                message: format!("{e:#}"),
            })?;
        Ok(())
    }
}

/// Compile-phase plugin wrapping a [`WasmToolchain`].
pub struct WasmPackPlugin<T = WasmPack> {
    toolchain: T,
}

impl<T: WasmToolchain> WasmPackPlugin<T> {
    pub fn new(toolchain: T) -> Self {
        Self { toolchain }
    }
}

impl<T: WasmToolchain> Plugin for WasmPackPlugin<T> {
    fn name(&self) -> &'static str {
        "wasm-pack"
    }

    fn phase(&self) -> Phase {
        Phase::Compile
    }

    fn validate(&self, config: &BuildConfig) -> Result<(), ConfigError> {
        if !config.experiments.async_wasm {
            return Err(ConfigError::AsyncWasmDisabled);
        }
        if !config.wasm.manifest_path().is_file() {
            return Err(ConfigError::Validation(format!(
                "no Cargo.toml in `{}`",
                config.wasm.crate_dir.display()
            )));
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let config = ctx.config;
        let wasm = &config.wasm;

        match ctx.scope {
            BuildScope::Full => self.toolchain.compile(wasm, wasm.profile(config.mode))?,
            BuildScope::Restage => {
                crate::debug!("wasm"; "crate unchanged, restaging {}", wasm.pkg_dir().display());
            }
        }

        for path in stage(config)? {
            ctx.emit(path);
        }
        ctx.aliases.push(ModuleAlias {
            dir: wasm.pkg_dir(),
            name: wasm.out_name.clone(),
            specifier: wasm.module_specifier(),
        });
        Ok(())
    }
}

/// Copy the package's runtime files into the output directory.
fn stage(config: &BuildConfig) -> Result<Vec<PathBuf>, BuildError> {
    let wasm = &config.wasm;
    let pkg_dir = wasm.pkg_dir();
    let target_dir = config.output.dir.join(wasm.staged_dir());
    create_dir(&target_dir)?;

    let mut staged = Vec::new();
    for name in wasm.runtime_files() {
        let from = pkg_dir.join(&name);
        let to = target_dir.join(&name);
        copy(&from, &to)?;
        staged.push(to);
    }

    // inline JS snippets referenced by the glue (`#[wasm_bindgen(inline_js)]`)
    let snippets = pkg_dir.join("snippets");
    if snippets.is_dir() {
        copy_dir(&snippets, &target_dir.join("snippets"), &mut staged)?;
    }
    Ok(staged)
}

fn copy_dir(from: &Path, to: &Path, staged: &mut Vec<PathBuf>) -> Result<(), BuildError> {
    create_dir(to)?;
    let entries = fs::read_dir(from).map_err(|source| BuildError::Staging {
        path: from.to_path_buf(),
        source,
    })?;
    for entry in entries.flatten() {
        let path = entry.path();
        let target = to.join(entry.file_name());
        if path.is_dir() {
            copy_dir(&path, &target, staged)?;
        } else {
            copy(&path, &target)?;
            staged.push(target);
        }
    }
    Ok(())
}

fn copy(from: &Path, to: &Path) -> Result<(), BuildError> {
    fs::copy(from, to).map_err(|source| BuildError::Staging {
        path: from.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn create_dir(dir: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(dir).map_err(|source| BuildError::Write {
        path: dir.to_path_buf(),
        source,
    })
}

//! Clean-before-write for the output directory.
//!
//! The whole output directory is removed and recreated before every build,
//! so stale files from an earlier build (or a build in the other mode) never
//! survive. Removal is refused when the directory overlaps anything the
//! project still needs.

use crate::config::{BuildConfig, ConfigError};
use crate::utils::path::is_within;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Remove and recreate `output.dir`.
///
/// With `output.clean = false` the directory is only created.
pub fn clean_output_dir(config: &BuildConfig) -> Result<()> {
    let dir = &config.output.dir;

    if config.output.clean {
        check_output_dir(config)?;
        if dir.exists() {
            fs::remove_dir_all(dir)
                .with_context(|| format!("Failed to clear output directory: {}", dir.display()))?;
            crate::debug!("clean"; "removed {}", config.root_relative(dir).display());
        }
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    Ok(())
}

/// Refuse output directories whose removal would take project inputs with them.
pub fn check_output_dir(config: &BuildConfig) -> Result<(), ConfigError> {
    let dir = &config.output.dir;
    let unsafe_output = |reason: String| ConfigError::UnsafeOutput {
        dir: dir.clone(),
        reason,
    };

    if dir.parent().is_none() {
        return Err(unsafe_output("it is the filesystem root".into()));
    }

    for (name, path) in protected_paths(config) {
        if is_within(&path, dir) {
            let reason = if path == *dir {
                format!("it is the {name}")
            } else {
                format!("it contains the {name} `{}`", path.display())
            };
            return Err(unsafe_output(reason));
        }
    }
    Ok(())
}

fn protected_paths(config: &BuildConfig) -> Vec<(&'static str, PathBuf)> {
    let mut paths = vec![
        ("project root", config.root.clone()),
        ("entry module", config.entry.clone()),
        ("HTML template", config.html.template.clone()),
        ("static root", config.serve.root.clone()),
    ];
    if let Some(path) = &config.config_path {
        paths.push(("config file", path.clone()));
    }
    if config.wasm.enable {
        paths.push(("crate directory", config.wasm.crate_dir.clone()));
        paths.push(("wasm package directory", config.wasm.pkg_dir()));
    }
    paths.retain(|(_, path)| path != Path::new(""));
    paths
}

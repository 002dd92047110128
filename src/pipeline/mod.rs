//! Build orchestration.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌─────────┐   ┌────────┐   ┌──────┐
//! │  clean   │──▶│ validate │──▶│ compile │──▶│ bundle │──▶│ emit │
//! └──────────┘   └──────────┘   └─────────┘   └────────┘   └──────┘
//!  output.dir     config +       Phase::        entry        Phase::
//!  cleared        plugins        Compile        rewrite      Emit
//! ```
//!
//! Clean runs first so that a build failing at any later step leaves no
//! output from an earlier build behind. Every step is sequential; the first
//! error ends the build.

pub mod clean;
mod error;

pub use crate::plugin::BuildScope;
pub use error::BuildError;

use crate::bundle;
use crate::config::BuildConfig;
use crate::plugin::{BuildContext, Phase, Plugin};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Outcome of a successful build.
#[derive(Debug)]
pub struct BuildReport {
    pub scope: BuildScope,
    /// Every file written to the output directory.
    pub emitted: Vec<PathBuf>,
    pub warnings: Vec<String>,
    pub elapsed: Duration,
}

/// Run one build with the given plugins.
pub fn run(
    config: &BuildConfig,
    plugins: &[Box<dyn Plugin>],
    scope: BuildScope,
) -> Result<BuildReport> {
    let start = Instant::now();

    clean::clean_output_dir(config)?;

    config.validate()?;
    for plugin in plugins {
        plugin
            .validate(config)
            .with_context(|| format!("plugin `{}` rejected the configuration", plugin.name()))?;
    }

    let mut ctx = BuildContext::new(config, scope);
    run_phase(plugins, Phase::Compile, &mut ctx)?;

    let output = bundle::bundle(config, &ctx.aliases)?;
    ctx.emit(output.path);
    if let Some(map) = output.map_path {
        ctx.emit(map);
    }
    for warning in output.warnings {
        ctx.warn(warning);
    }

    run_phase(plugins, Phase::Emit, &mut ctx)?;

    Ok(BuildReport {
        scope,
        emitted: ctx.emitted,
        warnings: ctx.warnings,
        elapsed: start.elapsed(),
    })
}

fn run_phase(plugins: &[Box<dyn Plugin>], phase: Phase, ctx: &mut BuildContext<'_>) -> Result<()> {
    for plugin in plugins.iter().filter(|p| p.phase() == phase) {
        crate::debug!("build"; "running {}", plugin.name());
        plugin.apply(ctx)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, test_project};
    use crate::core::BuildMode;
    use crate::plugin::{FakeToolchain, HtmlPlugin, WasmPackPlugin};
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::Path;

    fn plugins() -> Vec<Box<dyn Plugin>> {
        vec![
            Box::new(WasmPackPlugin::new(FakeToolchain::default())),
            Box::new(HtmlPlugin),
        ]
    }

    fn listing(dir: &Path) -> BTreeSet<String> {
        let mut files = BTreeSet::new();
        let mut stack = vec![dir.to_path_buf()];
        while let Some(current) = stack.pop() {
            for entry in fs::read_dir(&current).unwrap().flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    let rel = path.strip_prefix(dir).unwrap();
                    files.insert(crate::utils::path::to_slash(rel));
                }
            }
        }
        files
    }

    #[test]
    fn test_development_build_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_project(dir.path());

        let report = run(&config, &plugins(), BuildScope::Full).unwrap();

        let files = listing(&config.output.dir);
        let expected: BTreeSet<String> = [
            "index.js",
            "index.html",
            "pkg/index.js",
            "pkg/index_bg.wasm",
            "pkg/snippets/smiley-1a2b/inline0.js",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(files, expected);
        assert_eq!(report.emitted.len(), expected.len());
        assert!(report.warnings.is_empty());

        let html = fs::read_to_string(config.output.dir.join("index.html")).unwrap();
        assert_eq!(html.matches("<script type=\"module\" src=\"index.js\">").count(), 1);

        let bundle = fs::read_to_string(config.output.dir.join("index.js")).unwrap();
        assert!(bundle.contains("./pkg/index.js"));
        assert!(bundle.contains("sourceMappingURL=data:application/json"));
    }

    #[test]
    fn test_production_build_emits_map() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_project(dir.path());
        config.mode = BuildMode::Production;

        run(&config, &plugins(), BuildScope::Full).unwrap();
        assert!(config.output.dir.join("index.js.map").is_file());
    }

    #[test]
    fn test_mode_switch_leaves_no_stale_map() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_project(dir.path());

        config.mode = BuildMode::Production;
        run(&config, &plugins(), BuildScope::Full).unwrap();
        assert!(config.output.dir.join("index.js.map").exists());

        config.mode = BuildMode::Development;
        run(&config, &plugins(), BuildScope::Full).unwrap();
        assert!(!config.output.dir.join("index.js.map").exists());
    }

    #[test]
    fn test_async_wasm_disabled_emits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_project(dir.path());
        config.experiments.async_wasm = false;

        let err = run(&config, &plugins(), BuildScope::Full).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::AsyncWasmDisabled)
        ));
        assert_eq!(fs::read_dir(&config.output.dir).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_build_leaves_no_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_project(dir.path());
        run(&config, &plugins(), BuildScope::Full).unwrap();
        assert!(config.output.dir.join("index.js").exists());

        fs::remove_file(&config.html.template).unwrap();
        assert!(run(&config, &plugins(), BuildScope::Full).is_err());
        assert_eq!(fs::read_dir(&config.output.dir).unwrap().count(), 0);
    }

    #[test]
    fn test_toolchain_failure_aborts_build() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_project(dir.path());
        let plugins: Vec<Box<dyn Plugin>> = vec![
            Box::new(WasmPackPlugin::new(FakeToolchain {
                fail_with: Some("linker error".into()),
                ..Default::default()
            })),
            Box::new(HtmlPlugin),
        ];

        let err = run(&config, &plugins, BuildScope::Full).unwrap_err();
        assert!(format!("{err:#}").contains("linker error"));
        assert!(!config.output.dir.join("index.html").exists());
        assert!(!config.output.dir.join("index.js").exists());
    }

    #[test]
    fn test_package_beside_crate_is_staged_and_aliased() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_project(dir.path());
        let native = config.root.join("native");
        fs::create_dir_all(&native).unwrap();
        fs::rename(config.root.join("Cargo.toml"), native.join("Cargo.toml")).unwrap();
        config.wasm.crate_dir = native;
        config.wasm.out_dir = "../pkg".into();

        run(&config, &plugins(), BuildScope::Full).unwrap();

        let compiled = fs::read(config.root.join("pkg/index_bg.wasm")).unwrap();
        let staged = fs::read(config.output.dir.join("pkg/index_bg.wasm")).unwrap();
        assert_eq!(compiled, b"\0asm");
        assert_eq!(staged, compiled);

        let bundle = fs::read_to_string(config.output.dir.join("index.js")).unwrap();
        assert!(bundle.contains("import(\"./pkg/index.js\")"));
    }

    #[test]
    fn test_html_name_collision_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_project(dir.path());
        config.html.filename = "index.js".into();

        let err = run(&config, &plugins(), BuildScope::Full).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Diagnostics(_))
        ));
        assert!(!config.output.dir.join("index.js").exists());
    }

    #[test]
    fn test_without_wasm_plugin_reports_import() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_project(dir.path());
        config.wasm.enable = false;
        let plugins: Vec<Box<dyn Plugin>> = vec![Box::new(HtmlPlugin)];

        let report = run(&config, &plugins, BuildScope::Full).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("./pkg"));
    }
}

//! `wasp build`.

use crate::{
    config::BuildConfig,
    log,
    pipeline::{self, BuildReport, BuildScope},
    plugin::default_plugins,
    utils::plural_count,
};
use anyhow::Result;

/// Run one full build with the default plugins and log the outcome.
pub fn build_project(config: &BuildConfig) -> Result<BuildReport> {
    log!(
        "build";
        "{} mode, devtool {}",
        config.mode,
        config.devtool().as_str()
    );

    let plugins = default_plugins(config);
    let report = pipeline::run(config, &plugins, BuildScope::Full)?;

    for warning in &report.warnings {
        log!("warning"; "{}", warning);
    }
    for path in &report.emitted {
        crate::debug!("build"; "wrote {}", config.root_relative(path).display());
    }
    log!(
        "build";
        "{} written to {} in {:.2?}",
        plural_count(report.emitted.len(), "file"),
        config.root_relative(&config.output.dir).display(),
        report.elapsed
    );
    Ok(report)
}

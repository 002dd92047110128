//! wasp - build, bundle and serve browser apps backed by a Rust crate
//! compiled to WebAssembly.

mod actor;
mod bundle;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod pipeline;
mod plugin;
mod reload;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::BuildConfig;
use std::sync::Arc;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = Arc::new(BuildConfig::load(&cli)?);

    match &cli.command {
        Commands::Build => cli::build::build_project(&config).map(|_| ()),
        Commands::Serve { .. } => cli::serve::serve(config),
    }
}

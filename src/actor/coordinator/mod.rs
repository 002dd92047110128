//! Actor Coordinator - Wires up the Hot Reload Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates communication channels
//! - Wires up actors
//! - Runs them concurrently

mod runtime;
mod watch_paths;

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::builder::BuildActor;
use super::fs::FsActor;
use super::messages::{BuildMsg, WsMsg};
use super::ws::WsActor;
use crate::config::BuildConfig;
use crate::pipeline::BuildScope;
use crate::plugin::default_plugins;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<BuildConfig>,
    /// Reload channel; the sender side is shared with the reload server
    ws_tx: mpsc::Sender<WsMsg>,
    ws_rx: mpsc::Receiver<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(
        config: Arc<BuildConfig>,
        ws_tx: mpsc::Sender<WsMsg>,
        ws_rx: mpsc::Receiver<WsMsg>,
    ) -> Self {
        Self {
            config,
            ws_tx,
            ws_rx,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    ///
    /// The watcher is attached before the initial build is queued, so edits
    /// made during that build trigger a follow-up build.
    pub async fn run(self) -> Result<()> {
        let (build_tx, build_rx) = mpsc::channel::<BuildMsg>(CHANNEL_BUFFER);

        let watch_paths = watch_paths::collect_watch_paths(&self.config);
        let fs_actor = FsActor::new(watch_paths, build_tx.clone(), Arc::clone(&self.config))
            .context("failed to start file watcher")?;

        let build_actor = BuildActor::new(
            build_rx,
            self.ws_tx.clone(),
            Arc::clone(&self.config),
            default_plugins(&self.config),
        );
        let ws_actor = WsActor::new(self.ws_rx);

        build_tx
            .send(BuildMsg::Rebuild {
                scope: BuildScope::Full,
                changed: Vec::new(),
            })
            .await
            .context("build actor unavailable")?;

        crate::debug!("actor"; "start");
        runtime::run_actors(
            fs_actor,
            build_actor,
            ws_actor,
            build_tx,
            self.ws_tx,
            self.shutdown_rx,
        )
        .await;
        crate::debug!("actor"; "stopped");
        Ok(())
    }
}

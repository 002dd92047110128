//! Build Actor - runs the pipeline on request
//!
//! Builds are sequential: requests that queue up while a build runs are
//! folded into one follow-up build (see [`BuildMsg::merge`]).

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::{BuildMsg, WsMsg};
use crate::config::BuildConfig;
use crate::logger::{status_error, status_success, status_warning};
use crate::pipeline::{self, BuildReport, BuildScope};
use crate::plugin::Plugin;

pub struct BuildActor {
    rx: mpsc::Receiver<BuildMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    config: Arc<BuildConfig>,
    plugins: Arc<Vec<Box<dyn Plugin>>>,
    /// Messages pulled off the channel that could not be merged
    backlog: VecDeque<BuildMsg>,
}

impl BuildActor {
    pub fn new(
        rx: mpsc::Receiver<BuildMsg>,
        ws_tx: mpsc::Sender<WsMsg>,
        config: Arc<BuildConfig>,
        plugins: Vec<Box<dyn Plugin>>,
    ) -> Self {
        Self {
            rx,
            ws_tx,
            config,
            plugins: Arc::new(plugins),
            backlog: VecDeque::new(),
        }
    }

    /// Main event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.next().await {
            match msg {
                BuildMsg::Rebuild { scope, changed } => self.rebuild(scope, changed).await,
                BuildMsg::ConfigChanged(path) => {
                    crate::log!(
                        "watch";
                        "{} changed, restart `wasp serve` to apply it",
                        self.config.root_relative(&path).display()
                    );
                }
                BuildMsg::Shutdown => {
                    crate::debug!("build"; "shutting down");
                    break;
                }
            }
        }
    }

    /// Next message, with everything already queued folded into it.
    async fn next(&mut self) -> Option<BuildMsg> {
        let mut msg = match self.backlog.pop_front() {
            Some(msg) => msg,
            None => self.rx.recv().await?,
        };
        while let Ok(next) = self.rx.try_recv() {
            if let Some(rest) = msg.merge(next) {
                self.backlog.push_back(rest);
            }
        }
        Some(msg)
    }

    async fn rebuild(&self, scope: BuildScope, changed: Vec<PathBuf>) {
        let config = Arc::clone(&self.config);
        let plugins = Arc::clone(&self.plugins);

        let result = tokio::task::spawn_blocking(move || pipeline::run(&config, &plugins, scope))
            .await
            .unwrap_or_else(|e| Err(anyhow::anyhow!("build task failed: {e}")));

        let reason = self.describe(&changed);
        let msg = match result {
            Ok(report) => self.on_success(&reason, &report),
            Err(e) => {
                let detail = format!("{e:#}");
                status_error(&format!("build failed ({reason})"), &detail);
                crate::core::set_healthy(false);
                WsMsg::Error {
                    path: reason,
                    error: detail,
                }
            }
        };
        let _ = self.ws_tx.send(msg).await;
    }

    fn on_success(&self, reason: &str, report: &BuildReport) -> WsMsg {
        for warning in &report.warnings {
            status_warning(warning);
        }
        let verb = match report.scope {
            BuildScope::Full => "rebuilt",
            BuildScope::Restage => "restaged",
        };
        status_success(&format!(
            "{verb} in {:.0?} ({}, {} files)",
            report.elapsed,
            reason,
            report.emitted.len()
        ));

        if !crate::core::is_healthy() {
            crate::core::set_healthy(true);
            let _ = self.ws_tx.try_send(WsMsg::ClearError);
        }
        WsMsg::Reload {
            reason: reason.to_string(),
        }
    }

    /// Short human description of what triggered a build.
    fn describe(&self, changed: &[PathBuf]) -> String {
        match changed {
            [] => "initial build".to_string(),
            [path] => format!("{} changed", self.config.root_relative(path).display()),
            [path, rest @ ..] => format!(
                "{} and {} more changed",
                self.config.root_relative(path).display(),
                rest.len()
            ),
        }
    }
}

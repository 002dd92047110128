//! Server lifecycle management.

use crate::{
    actor::{Coordinator, messages::WsMsg},
    config::BuildConfig,
    core::register_server,
    log,
};
use crossbeam::channel::{Receiver, Sender};
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};
use tiny_http::Server;
use tokio::sync::mpsc;

const ACTOR_WORKERS: usize = 2;
const RUNTIME_SHUTDOWN: Duration = Duration::from_secs(1);

/// Register server for graceful shutdown.
///
/// This registers the server with the global shutdown handler set up in main().
/// When Ctrl+C is pressed, the handler will unblock the server and notify actors.
pub fn register_server_for_shutdown(server: Arc<Server>, shutdown_tx: Sender<()>) {
    register_server(server, shutdown_tx);
}

/// Spawn the actor system for file watching and hot reload.
pub fn spawn_actors(
    config: Arc<BuildConfig>,
    ws_tx: mpsc::Sender<WsMsg>,
    ws_rx: mpsc::Receiver<WsMsg>,
    shutdown_rx: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || run_actor_system(config, ws_tx, ws_rx, shutdown_rx))
}

fn run_actor_system(
    config: Arc<BuildConfig>,
    ws_tx: mpsc::Sender<WsMsg>,
    ws_rx: mpsc::Receiver<WsMsg>,
    shutdown_rx: Receiver<()>,
) {
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(ACTOR_WORKERS)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log!("actor"; "failed to create tokio runtime: {}", e);
            return;
        }
    };

    rt.block_on(async {
        let coordinator =
            Coordinator::new(config, ws_tx, ws_rx).with_shutdown_signal(shutdown_rx);
        if let Err(e) = coordinator.run().await {
            log!("actor"; "error: {:#}", e);
        }
    });
    // a build may still be running on a blocking thread
    rt.shutdown_timeout(RUNTIME_SHUTDOWN);
}

/// Wait for actor system to shutdown gracefully (max 2 seconds).
pub fn wait_for_shutdown(handle: Option<JoinHandle<()>>) {
    let Some(handle) = handle else { return };

    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::builder::BuildActor;
use crate::actor::fs::FsActor;
use crate::actor::messages::{BuildMsg, WsMsg};
use crate::actor::ws::WsActor;

const SHUTDOWN_POLL: Duration = Duration::from_millis(100);
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Run all actors concurrently until shutdown or until one of them stops.
pub(super) async fn run_actors(
    fs: FsActor,
    build: BuildActor,
    ws: WsActor,
    build_tx: mpsc::Sender<BuildMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let mut fs_handle = tokio::spawn(fs.run());
    let mut build_handle = tokio::spawn(build.run());
    let mut ws_handle = tokio::spawn(ws.run());

    match shutdown_rx {
        Some(rx) => loop {
            if rx.try_recv().is_ok() || crate::core::is_shutdown() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            if fs_handle.is_finished() || build_handle.is_finished() || ws_handle.is_finished() {
                break;
            }
            tokio::time::sleep(SHUTDOWN_POLL).await;
        },
        None => {
            tokio::select! {
                _ = &mut fs_handle => {}
                _ = &mut build_handle => {}
                _ = &mut ws_handle => {}
            }
        }
    }

    let _ = build_tx.send(BuildMsg::Shutdown).await;
    let _ = ws_tx.send(WsMsg::Shutdown).await;
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, ws_handle).await;
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, build_handle).await;
    fs_handle.abort();
}

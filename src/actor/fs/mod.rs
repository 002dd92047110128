//! FileSystem Actor
//!
//! Watches the project for changes and sends debounced rebuild requests to
//! the BuildActor. The watcher is created before the initial build so that
//! edits made while it runs are not lost.
//!
//! Architecture:
//! ```text
//! Watcher → Debouncer (pure timing) → Classifier (business logic) → BuildMsg
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode};
use tokio::sync::mpsc;

use super::messages::BuildMsg;
use crate::config::BuildConfig;

// Business classification pipeline (raw changes -> actionable changes).
mod classifier;
// Pure timing and deduplication.
mod debouncer;
// Change routing (actionable changes -> BuildMsg).
mod router;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;

#[cfg(test)]
mod tests;

use classifier::EventClassifier;
use debouncer::Debouncer;
use router::{changes_to_messages, log_changes};
use watch_roots::WatchRoots;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    build_tx: mpsc::Sender<BuildMsg>,
    debouncer: Debouncer,
    classifier: EventClassifier,
    config: Arc<BuildConfig>,
}

impl FsActor {
    /// Create the actor and start watching immediately.
    ///
    /// Events buffer in the notify channel until [`Self::run`] is awaited.
    pub fn new(
        paths: Vec<(PathBuf, RecursiveMode)>,
        build_tx: mpsc::Sender<BuildMsg>,
        config: Arc<BuildConfig>,
    ) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watch_roots = WatchRoots::new(paths);
        watch_roots.attach_existing(&mut watcher)?;
        for path in watch_roots.paths() {
            crate::debug!("watch"; "watching {}", config.root_relative(path).display());
        }

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            build_tx,
            debouncer: Debouncer::new(),
            classifier: EventClassifier::new(&config),
            config,
        })
    }

    /// Run the actor event loop until the BuildActor goes away.
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut watch_roots,
            build_tx,
            mut debouncer,
            mut classifier,
            config,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // notify delivers on a std channel; bridge it into tokio
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => match event {
                    Some(event) => debouncer.add_event(&event),
                    None => break,
                },
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    watch_roots.maintain(&mut watcher);
                    if process_changes(&mut debouncer, &mut classifier, &build_tx, &config)
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            }
        }
        crate::debug!("watch"; "stopped");
    }
}

/// Process debounced file changes
///
/// Returns `Err(())` if the BuildActor shut down
async fn process_changes(
    debouncer: &mut Debouncer,
    classifier: &mut EventClassifier,
    build_tx: &mpsc::Sender<BuildMsg>,
    config: &BuildConfig,
) -> Result<(), ()> {
    if crate::core::is_shutdown() {
        return Err(());
    }

    let Some(raw) = debouncer.take_if_ready() else {
        return Ok(());
    };

    let changes = classifier.classify(raw, config);
    if changes.is_empty() {
        return Ok(());
    }
    log_changes(&changes);

    for msg in changes_to_messages(changes) {
        build_tx.send(msg).await.map_err(|_| ())?;
    }
    Ok(())
}

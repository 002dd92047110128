use std::path::PathBuf;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::types::{ChangeKind, is_temp_file};
use crate::utils::path::normalize_path;

pub(super) const DEBOUNCE: Duration = Duration::from_millis(300);
pub(super) const REBUILD_COOLDOWN: Duration = Duration::from_millis(800);

/// Idle wait when nothing is pending.
const IDLE: Duration = Duration::from_secs(86400);

/// Collects raw notify events until the burst settles.
///
/// Timing only: no knowledge of what the paths mean.
pub(super) struct Debouncer {
    pub(super) pending: FxHashMap<PathBuf, ChangeKind>,
    last_event: Option<Instant>,
    last_flush: Option<Instant>,
    debounce: Duration,
    cooldown: Duration,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self::with_timing(DEBOUNCE, REBUILD_COOLDOWN)
    }

    pub(super) fn with_timing(debounce: Duration, cooldown: Duration) -> Self {
        Self {
            pending: FxHashMap::default(),
            last_event: None,
            last_flush: None,
            debounce,
            cooldown,
        }
    }

    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;
        use notify::event::ModifyKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            // mtime/chmod noise would loop rebuilds
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => ChangeKind::Modified,
            _ => return,
        };

        for path in event.paths.iter().filter(|p| !is_temp_file(p)) {
            self.record(normalize_path(path), kind);
        }
    }

    fn record(&mut self, path: PathBuf, kind: ChangeKind) {
        let merged = match self.pending.get(&path) {
            Some(&existing) => existing.then(kind),
            None => Some(kind),
        };
        crate::debug!("watch"; "{} {}", kind.label(), path.display());

        match merged {
            Some(kind) => {
                self.pending.insert(path, kind);
            }
            None => {
                self.pending.remove(&path);
            }
        }
        self.last_event = Some(Instant::now());
    }

    /// Drain pending changes once the debounce window and cooldown have passed.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }
        self.last_event = None;
        self.last_flush = Some(Instant::now());
        Some(std::mem::take(&mut self.pending))
    }

    pub(super) fn is_ready(&self) -> bool {
        match self.last_event {
            Some(last) if !self.pending.is_empty() => {
                last.elapsed() >= self.debounce && self.cooldown_remaining().is_zero()
            }
            _ => false,
        }
    }

    /// Time until [`Self::take_if_ready`] can next succeed.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last) = self.last_event.filter(|_| !self.pending.is_empty()) else {
            return IDLE;
        };
        self.debounce
            .saturating_sub(last.elapsed())
            .max(self.cooldown_remaining())
            .max(Duration::from_millis(1))
    }

    fn cooldown_remaining(&self) -> Duration {
        self.last_flush
            .map(|t| self.cooldown.saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO)
    }
}

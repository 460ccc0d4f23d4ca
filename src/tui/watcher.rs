//! Live reload of the document on screen.
//!
//! Watches the directory holding the current document and reports when
//! that file is written, so the viewer can re-run the selection pipeline.

use log::{debug, warn};
use notify::{
    Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
    event::{AccessKind, AccessMode, ModifyKind},
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

pub struct DocumentWatcher {
    watcher: RecommendedWatcher,
    receiver: Receiver<Result<Event, notify::Error>>,
    current: Option<PathBuf>,
    /// Ignore bursts of events that arrive within this window
    last_change: Instant,
    debounce: Duration,
}

impl DocumentWatcher {
    pub fn new() -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let watcher = notify::recommended_watcher(tx)?;

        Ok(Self {
            watcher,
            receiver: rx,
            current: None,
            last_change: Instant::now(),
            debounce: Duration::from_millis(100),
        })
    }

    /// Follow `path` instead of the previous document.
    ///
    /// The parent directory is watched so that editors which replace the
    /// file on save are still noticed.
    pub fn watch(&mut self, path: &Path) -> Result<(), notify::Error> {
        if self.current.as_deref() == Some(path) {
            return Ok(());
        }
        if let Some(old) = self.current.take().and_then(|p| p.parent().map(Path::to_path_buf)) {
            let _ = self.watcher.unwatch(&old);
        }

        let dir = path.parent().unwrap_or(path);
        self.watcher.watch(dir, RecursiveMode::NonRecursive)?;
        debug!("watching {}", path.display());
        self.current = Some(path.to_path_buf());
        self.last_change = Instant::now();
        Ok(())
    }

    /// Drain pending events; `true` when the current document changed.
    pub fn check_for_changes(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.receiver.try_recv() {
                Ok(Ok(event)) => changed |= self.is_relevant_event(&event),
                Ok(Err(e)) => warn!("watch error: {}", e),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        if changed {
            let now = Instant::now();
            if now.duration_since(self.last_change) >= self.debounce {
                self.last_change = now;
                return true;
            }
        }
        false
    }

    fn is_relevant_event(&self, event: &Event) -> bool {
        let Some(current) = &self.current else {
            return false;
        };
        event.paths.iter().any(|p| p == current) && is_write(&event.kind)
    }
}

fn is_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Any)
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Access(AccessKind::Close(AccessMode::Write))
            | EventKind::Create(_)
    )
}

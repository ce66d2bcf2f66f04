// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event Intake (spec §4.I): bridges the external filesystem watcher into
//! debounced, OR-coalesced daemon ticks.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fr_core::{WatchEvent, WatchEventKind};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("failed to set up filesystem watcher: {0}")]
    Watch(#[from] notify::Error),
}

/// One watched path, tagged with whether a change to it should trigger the
/// preamble-recompile path.
#[derive(Debug, Clone)]
struct WatchedPath {
    realpath: PathBuf,
    preamble_watch: bool,
}

/// Watches the parent directory of each realpath of interest (so editor
/// rename-and-replace save sequences are still observed), filters events
/// down to the exact realpaths, and delivers one OR-coalesced boolean per
/// debounced batch.
pub struct EventIntake {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<WatchEvent>,
    debounce: Duration,
}

impl EventIntake {
    /// `main_file` is always watched as a body file; `extra_watch` paths are
    /// body files, `extra_watch_preamble` paths trigger the preamble path.
    pub fn new(
        main_file: &Path,
        extra_watch: &[PathBuf],
        extra_watch_preamble: &[PathBuf],
        debounce: Duration,
    ) -> Result<Self, IntakeError> {
        let mut watched = vec![WatchedPath {
            realpath: canonicalize_best_effort(main_file),
            preamble_watch: false,
        }];
        watched.extend(extra_watch.iter().map(|p| WatchedPath {
            realpath: canonicalize_best_effort(p),
            preamble_watch: false,
        }));
        watched.extend(extra_watch_preamble.iter().map(|p| WatchedPath {
            realpath: canonicalize_best_effort(p),
            preamble_watch: true,
        }));

        let (tx, rx) = mpsc::channel(64);
        let watched_for_closure = watched.clone();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let Ok(event) = res else { return };
            let Some(kind) = watch_event_kind(&event.kind) else { return };
            for changed in &event.paths {
                if let Some(entry) = watched_for_closure
                    .iter()
                    .find(|w| paths_match(&w.realpath, changed))
                {
                    let _ = tx.blocking_send(WatchEvent {
                        path: changed.clone(),
                        kind,
                        preamble_watch: entry.preamble_watch,
                    });
                }
            }
        })?;

        let parents: HashSet<PathBuf> = watched
            .iter()
            .filter_map(|w| w.realpath.parent().map(Path::to_path_buf))
            .collect();
        for parent in &parents {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        Ok(Self {
            _watcher: watcher,
            rx,
            debounce,
        })
    }

    /// spec §4.I / §4.H event-intake coupling: block for the first event
    /// (or a shutdown signal), then drain the debounce window, OR-combining
    /// every queued preamble flag. Returns `None` on shutdown.
    pub async fn next_tick(&mut self) -> Option<bool> {
        let mut preamble = self.rx.recv().await?.preamble_watch;

        tokio::time::sleep(self.debounce).await;
        while let Ok(event) = self.rx.try_recv() {
            preamble |= event.preamble_watch;
        }

        Some(preamble)
    }
}

fn canonicalize_best_effort(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn paths_match(watched: &Path, changed: &Path) -> bool {
    watched == changed || canonicalize_best_effort(changed) == watched
}

/// Maps a `notify` event kind onto spec §3's `WatchEventKind`; renames
/// surface as `Moved`, plain removes as `Modified` since the daemon treats
/// "file is gone" the same as "file changed" for recompile purposes.
fn watch_event_kind(kind: &EventKind) -> Option<WatchEventKind> {
    match kind {
        EventKind::Create(_) => Some(WatchEventKind::Created),
        EventKind::Modify(ModifyKind::Name(_)) => Some(WatchEventKind::Moved),
        EventKind::Modify(_) => Some(WatchEventKind::Modified),
        EventKind::Remove(_) => Some(WatchEventKind::Modified),
        _ => None,
    }
}

#[cfg(test)]
#[path = "intake_tests.rs"]
mod tests;

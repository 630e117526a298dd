//! Source File Watcher
//!
//! Watches the project root for changes to JSX source files and forwards
//! them as reload notifications for connected editor clients. Changes to a
//! file that was just programmatically edited are dropped, breaking the
//! feedback loop between the save endpoint and the live application.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};

use crate::reload::EditHold;

/// Events from the file watcher thread
#[derive(Debug)]
enum WatcherEvent {
    SourceChanged(PathBuf),
    WatcherError(notify::Error),
}

/// Recursive watcher over the project root
///
/// Keeps the notify watcher alive; the forwarding task exits when the
/// watcher is dropped and its channel closes.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
}

impl SourceWatcher {
    /// Start watching `root`, broadcasting changed paths to `reload_tx`
    pub fn start(
        root: &Path,
        extensions: &[String],
        edit_hold: EditHold,
        reload_tx: broadcast::Sender<PathBuf>,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if let EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) =
                        event.kind
                    {
                        for path in event.paths {
                            let _ = tx.send(WatcherEvent::SourceChanged(path));
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatcherEvent::WatcherError(e));
                }
            },
            NotifyConfig::default().with_poll_interval(Duration::from_secs(1)),
        )?;

        watcher.watch(root, RecursiveMode::Recursive)?;
        log::info!("watching {} for source changes", root.display());

        Self::start_forwarding_task(rx, extensions.to_vec(), edit_hold, reload_tx);

        Ok(Self { _watcher: watcher })
    }

    /// Background task bridging watcher events into reload notifications
    fn start_forwarding_task(
        mut rx: mpsc::UnboundedReceiver<WatcherEvent>,
        extensions: Vec<String>,
        edit_hold: EditHold,
        reload_tx: broadcast::Sender<PathBuf>,
    ) {
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    WatcherEvent::SourceChanged(path) => {
                        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                            continue;
                        };
                        if !extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)) {
                            continue;
                        }

                        // Saves hold the canonical path; compare like with like.
                        // Canonicalization fails for deleted files; fall back
                        // to the reported path.
                        let path = match tokio::fs::canonicalize(&path).await {
                            Ok(canonical) => canonical,
                            Err(_) => path,
                        };

                        if edit_hold.is_held(&path).await {
                            log::debug!(
                                "suppressing reload for just-edited file: {}",
                                path.display()
                            );
                            continue;
                        }

                        log::debug!("source changed: {}", path.display());
                        let _ = reload_tx.send(path);
                    }
                    WatcherEvent::WatcherError(e) => {
                        log::error!("source watcher error: {}", e);
                    }
                }
            }
        });
    }
}

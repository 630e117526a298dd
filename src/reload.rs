//! Self-Edit Hold
//!
//! When a save request rewrites a file, the file watcher fires for our own
//! write. The hold marks the file as "just edited" so that one reload
//! notification is dropped, then expires on its own after a fixed delay.
//!
//! This is a best-effort flag, not a lock: the entry vanishes after the
//! delay whether or not a watch event ever arrived, and nothing orders it
//! against concurrent saves of the same file. Each hold carries a generation
//! so a stale expiry task cannot clear a newer hold.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

/// Default time a programmatic edit suppresses the watcher
pub const DEFAULT_HOLD: Duration = Duration::from_millis(1000);

/// Shared map of recently self-edited files
#[derive(Debug, Clone)]
pub struct EditHold {
    held: Arc<Mutex<HashMap<PathBuf, u64>>>,
    generation: Arc<AtomicU64>,
    hold_duration: Duration,
}

impl EditHold {
    pub fn new(hold_duration: Duration) -> Self {
        Self {
            held: Arc::new(Mutex::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
            hold_duration,
        }
    }

    /// Mark a file as just edited and schedule the expiry
    pub async fn hold(&self, path: PathBuf) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        {
            let mut held = self.held.lock().await;
            held.insert(path.clone(), generation);
        }

        let held = Arc::clone(&self.held);
        let hold_duration = self.hold_duration;
        tokio::spawn(async move {
            tokio::time::sleep(hold_duration).await;
            let mut held = held.lock().await;
            if held.get(&path) == Some(&generation) {
                held.remove(&path);
            }
        });
    }

    /// Drop the hold immediately (used when a save inserted a new attribute
    /// and the client must see the reload)
    pub async fn release(&self, path: &Path) {
        self.held.lock().await.remove(path);
    }

    /// Is this file currently marked as just edited?
    pub async fn is_held(&self, path: &Path) -> bool {
        self.held.lock().await.contains_key(path)
    }
}

impl Default for EditHold {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hold_expires_on_its_own() {
        let hold = EditHold::new(Duration::from_millis(50));
        let path = PathBuf::from("/tmp/scene.tsx");

        hold.hold(path.clone()).await;
        assert!(hold.is_held(&path).await);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!hold.is_held(&path).await);
    }

    #[tokio::test]
    async fn test_release_clears_immediately() {
        let hold = EditHold::new(Duration::from_secs(60));
        let path = PathBuf::from("/tmp/scene.tsx");

        hold.hold(path.clone()).await;
        hold.release(&path).await;
        assert!(!hold.is_held(&path).await);
    }

    #[tokio::test]
    async fn test_newer_hold_survives_older_expiry() {
        let hold = EditHold::new(Duration::from_millis(60));
        let path = PathBuf::from("/tmp/scene.tsx");

        hold.hold(path.clone()).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        hold.hold(path.clone()).await;

        // The first hold's expiry fires around 60ms; the second must hold on
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(hold.is_held(&path).await);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!hold.is_held(&path).await);
    }

    #[tokio::test]
    async fn test_holds_are_per_file() {
        let hold = EditHold::new(Duration::from_secs(60));
        hold.hold(PathBuf::from("/tmp/a.tsx")).await;

        assert!(hold.is_held(Path::new("/tmp/a.tsx")).await);
        assert!(!hold.is_held(Path::new("/tmp/b.tsx")).await);
    }
}

//! Named cache instances, one per data domain, plus the background sweep.
//!
//! Each domain gets its own store so TTL defaults, eviction, and pattern
//! invalidation never cross domains.

use super::store::CacheStore;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// All cache stores used by the server, explicitly constructed and passed
/// to whatever needs them.
#[derive(Clone)]
pub struct CacheRegistry {
  /// Active sprint per board (10 min)
  pub sprints: CacheStore,
  /// Sprint issue lists and single issues (5 min)
  pub issues: CacheStore,
  /// Built standup reports (5 min)
  pub reports: CacheStore,
  /// Board and user metadata (10 min)
  pub metadata: CacheStore,
}

impl CacheRegistry {
  pub fn new() -> Self {
    Self {
      sprints: CacheStore::new("sprint", 600, 200),
      issues: CacheStore::new("issue", 300, 500),
      reports: CacheStore::new("report", 300, 100),
      metadata: CacheStore::new("meta", 600, 200),
    }
  }

  /// Drop expired entries from every store. Returns the total removed.
  pub fn sweep_all(&self) -> usize {
    self.sprints.sweep() + self.issues.sweep() + self.reports.sweep() + self.metadata.sweep()
  }

  /// Spawn the periodic sweep task. The returned handle must be kept alive
  /// for the lifetime of the process and stopped for clean shutdown.
  pub fn spawn_sweeper(&self) -> SweeperHandle {
    self.spawn_sweeper_with_interval(SWEEP_INTERVAL)
  }

  fn spawn_sweeper_with_interval(&self, interval: Duration) -> SweeperHandle {
    let (tx, mut rx) = watch::channel(false);
    let registry = self.clone();

    let handle = tokio::spawn(async move {
      let mut ticker = tokio::time::interval(interval);
      // The first tick fires immediately; skip it so sweeps start one
      // interval in.
      ticker.tick().await;
      loop {
        tokio::select! {
          _ = ticker.tick() => {
            let removed = registry.sweep_all();
            if removed > 0 {
              tracing::debug!(removed, "cache sweep removed expired entries");
            }
          }
          _ = rx.changed() => break,
        }
      }
    });

    SweeperHandle { tx, handle }
  }
}

impl Default for CacheRegistry {
  fn default() -> Self {
    Self::new()
  }
}

/// Stoppable handle for the background sweep task.
pub struct SweeperHandle {
  tx: watch::Sender<bool>,
  handle: JoinHandle<()>,
}

impl SweeperHandle {
  /// Signal the sweep loop to exit and wait for it.
  pub async fn shutdown(self) {
    let _ = self.tx.send(true);
    let _ = self.handle.await;
  }
}

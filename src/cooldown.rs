//! Cooldown store (C7): per-stream suppression windows with a background sweeper.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::model::CooldownEntry;

/// How a [`InMemoryCooldownStore`]'s background sweeper is told to stop.
type ShutdownSignal = tokio::sync::watch::Sender<bool>;

/// Per-stream-scope suppression state, consulted by the match engine (C6)
/// before a profile is allowed to fire again.
pub trait CooldownStore: Send + Sync {
    fn add(&self, scope: &str, entry: CooldownEntry) -> Result<(), StoreError>;
    fn snapshot(&self, scope: &str) -> Result<Vec<CooldownEntry>, StoreError>;
    fn prune(&self, scope: &str, now: f64) -> Result<(), StoreError>;
    fn register_stream(&self, scope: &str);
    fn deregister_stream(&self, scope: &str);
}

/// `DashMap`-backed default. Each scope owns a `Mutex<Vec<CooldownEntry>>` so
/// reads and writes for independent radio systems never contend.
pub struct InMemoryCooldownStore {
    scopes: Arc<DashMap<String, Mutex<Vec<CooldownEntry>>>>,
    sweep_interval: Duration,
    shutdown: Mutex<HashMap<String, ShutdownSignal>>,
}

impl InMemoryCooldownStore {
    pub fn new(sweep_interval: Duration) -> Self {
        Self {
            scopes: Arc::new(DashMap::new()),
            sweep_interval,
            shutdown: Mutex::new(HashMap::new()),
        }
    }

    /// Current wall-clock time as fractional seconds since the Unix epoch.
    fn now_s() -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }
}

impl Default for InMemoryCooldownStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl CooldownStore for InMemoryCooldownStore {
    fn add(&self, scope: &str, entry: CooldownEntry) -> Result<(), StoreError> {
        let bucket = self
            .scopes
            .entry(scope.to_string())
            .or_insert_with(|| Mutex::new(Vec::new()));
        bucket.lock().push(entry);
        Ok(())
    }

    fn snapshot(&self, scope: &str) -> Result<Vec<CooldownEntry>, StoreError> {
        Ok(self
            .scopes
            .get(scope)
            .map(|bucket| bucket.lock().clone())
            .unwrap_or_default())
    }

    fn prune(&self, scope: &str, now: f64) -> Result<(), StoreError> {
        if let Some(bucket) = self.scopes.get(scope) {
            bucket.lock().retain(|e| e.is_active(now));
        }
        Ok(())
    }

    fn register_stream(&self, scope: &str) {
        self.scopes
            .entry(scope.to_string())
            .or_insert_with(|| Mutex::new(Vec::new()));

        let (tx, mut rx) = tokio::sync::watch::channel(false);
        self.shutdown.lock().insert(scope.to_string(), tx);

        let scopes = Arc::clone(&self.scopes);
        let interval = self.sweep_interval;
        let scope = scope.to_string();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Some(bucket) = scopes.get(&scope) {
                            let now = Self::now_s();
                            bucket.lock().retain(|e| e.is_active(now));
                        }
                    }
                    _ = rx.changed() => {
                        debug!(scope = %scope, "cooldown sweeper shutting down");
                        break;
                    }
                }
            }
        });
    }

    fn deregister_stream(&self, scope: &str) {
        if let Some(tx) = self.shutdown.lock().remove(scope) {
            let _ = tx.send(true);
        }
        self.scopes.remove(scope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_snapshot_round_trips() {
        let store = InMemoryCooldownStore::default();
        store
            .add(
                "scope-a",
                CooldownEntry {
                    profile_id: "p1".to_string(),
                    last_detected: 100.0,
                    ignore_seconds: 300.0,
                },
            )
            .unwrap();

        let snap = store.snapshot("scope-a").unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].profile_id, "p1");
    }

    #[test]
    fn prune_removes_expired_entries() {
        let store = InMemoryCooldownStore::default();
        store
            .add(
                "scope-a",
                CooldownEntry {
                    profile_id: "p1".to_string(),
                    last_detected: 0.0,
                    ignore_seconds: 10.0,
                },
            )
            .unwrap();

        store.prune("scope-a", 20.0).unwrap();
        let snap = store.snapshot("scope-a").unwrap();
        assert!(snap.is_empty());
    }

    #[test]
    fn scopes_are_independent() {
        let store = InMemoryCooldownStore::default();
        store
            .add(
                "scope-a",
                CooldownEntry {
                    profile_id: "p1".to_string(),
                    last_detected: 0.0,
                    ignore_seconds: 300.0,
                },
            )
            .unwrap();

        let snap_b = store.snapshot("scope-b").unwrap();
        assert!(snap_b.is_empty());
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use crate::domain::StatsSnapshot;
use crate::error::AppResult;
use crate::services::SupportApi;

/// Read-only dashboard. The snapshot is refetched lazily once the refresh
/// key has been bumped past the key it was loaded under.
#[derive(Clone)]
pub struct StatsDashboard {
    api: Arc<dyn SupportApi>,
    refresh_key: Arc<AtomicU64>,
    loaded: Arc<RwLock<Option<(u64, StatsSnapshot)>>>,
}

impl StatsDashboard {
    pub fn new(api: Arc<dyn SupportApi>) -> Self {
        Self {
            api,
            refresh_key: Arc::default(),
            loaded: Arc::default(),
        }
    }

    /// Marks the current snapshot stale, e.g. after a ticket is created.
    pub fn bump(&self) {
        self.refresh_key.fetch_add(1, Ordering::SeqCst);
    }

    pub fn refresh_key(&self) -> u64 {
        self.refresh_key.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Option<StatsSnapshot> {
        self.loaded.read().as_ref().map(|(_, snapshot)| snapshot.clone())
    }

    pub fn is_stale(&self) -> bool {
        match &*self.loaded.read() {
            Some((key, _)) => *key != self.refresh_key(),
            None => true,
        }
    }

    pub async fn load(&self) -> AppResult<StatsSnapshot> {
        if !self.is_stale() {
            if let Some(snapshot) = self.snapshot() {
                return Ok(snapshot);
            }
        }

        let key = self.refresh_key();
        debug!(key, "fetching stats");
        let snapshot = self.api.get_stats().await?;
        let mut loaded = self.loaded.write();
        if loaded.as_ref().is_none_or(|(current, _)| *current <= key) {
            *loaded = Some((key, snapshot.clone()));
        }
        Ok(snapshot)
    }
}

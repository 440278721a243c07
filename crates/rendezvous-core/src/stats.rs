// ── Stats aggregator ──
//
// Read-only cache of the backend's aggregate statistics. The snapshot
// is always overwritten wholesale by `fetch`; nothing here is computed
// from the local collection, so it can lag behind optimistic writes
// until the refresh they trigger completes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rendezvous_api::{BackendClient, StatsSnapshot};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::books::CollectionChange;
use crate::error::CoreError;
use crate::invalidation::MutationObserver;
use crate::stream::StateStream;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsState {
    pub snapshot: StatsSnapshot,
    pub last_refresh: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Cheaply cloneable handle on the stats cache.
#[derive(Clone)]
pub struct StatsStore {
    inner: Arc<StatsInner>,
}

struct StatsInner {
    api: BackendClient,
    state: watch::Sender<StatsState>,
}

impl StatsStore {
    pub fn new(api: BackendClient) -> Self {
        let (state, _) = watch::channel(StatsState::default());
        Self {
            inner: Arc::new(StatsInner { api, state }),
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.inner.state.borrow().snapshot
    }

    pub fn state(&self) -> StatsState {
        self.inner.state.borrow().clone()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.inner.state.borrow().last_refresh
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.state.borrow().last_error.clone()
    }

    pub fn subscribe(&self) -> StateStream<StatsState> {
        StateStream::new(self.inner.state.subscribe())
    }

    /// Pull a fresh snapshot. On failure the previous snapshot is kept.
    pub async fn fetch(&self) -> bool {
        match self.inner.api.stats().await {
            Ok(snapshot) => {
                debug!(total_books = snapshot.total_books, "stats refreshed");
                self.inner.state.send_replace(StatsState {
                    snapshot,
                    last_refresh: Some(Utc::now()),
                    last_error: None,
                });
                true
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(error = %err, "stats fetch failed");
                self.inner
                    .state
                    .send_modify(|s| s.last_error = Some(err.to_string()));
                false
            }
        }
    }

    /// Reset every counter to zero.
    pub fn clear(&self) {
        self.inner.state.send_replace(StatsState::default());
    }
}

impl MutationObserver for StatsStore {
    fn collection_changed(&self, change: &CollectionChange) {
        debug!(id = change.id(), "collection changed, refreshing stats");
        let stats = self.clone();
        tokio::spawn(async move {
            stats.fetch().await;
        });
    }
}

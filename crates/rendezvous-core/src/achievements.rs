// ── Achievement store ──

use std::sync::Arc;

use rendezvous_api::{Achievement, BackendClient};
use tokio::sync::watch;
use tracing::warn;

use crate::error::CoreError;
use crate::stream::StateStream;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AchievementState {
    pub achievements: Arc<Vec<Achievement>>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Achievements unlocked by the current user.
#[derive(Clone)]
pub struct AchievementStore {
    inner: Arc<AchievementInner>,
}

struct AchievementInner {
    api: BackendClient,
    state: watch::Sender<AchievementState>,
}

impl AchievementStore {
    pub fn new(api: BackendClient) -> Self {
        let (state, _) = watch::channel(AchievementState::default());
        Self {
            inner: Arc::new(AchievementInner { api, state }),
        }
    }

    pub fn state(&self) -> AchievementState {
        self.inner.state.borrow().clone()
    }

    pub fn achievements(&self) -> Arc<Vec<Achievement>> {
        Arc::clone(&self.inner.state.borrow().achievements)
    }

    pub fn subscribe(&self) -> StateStream<AchievementState> {
        StateStream::new(self.inner.state.subscribe())
    }

    /// Load the list. `loading` is set for the duration of the request;
    /// on failure the previous list is kept and `error` is set.
    pub async fn fetch(&self) -> bool {
        self.inner.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        match self.inner.api.achievements().await {
            Ok(list) => {
                self.inner.state.send_replace(AchievementState {
                    achievements: Arc::new(list),
                    loading: false,
                    error: None,
                });
                true
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(error = %err, "achievements fetch failed");
                self.inner.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(err.to_string());
                });
                false
            }
        }
    }

    pub fn clear(&self) {
        self.inner.state.send_replace(AchievementState::default());
    }
}

// ── Context ──
//
// Explicitly constructed owner of one instance of every store. Wires the
// collection → stats invalidation, cascades logout to every store, and
// runs the navigation guard with its stats prefetch.

use std::sync::Arc;

use rendezvous_api::{BackendClient, TokenStore, TransportConfig};
use tracing::{debug, info, warn};

use crate::achievements::AchievementStore;
use crate::books::BookStore;
use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::guard::{Navigation, NavigationGuard};
use crate::reconcile::{Optimistic, WritePolicy};
use crate::session::SessionManager;
use crate::stats::StatsStore;

/// Cheaply cloneable via `Arc<ContextInner>`.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    config: ClientConfig,
    api: BackendClient,
    session: SessionManager,
    books: BookStore,
    stats: StatsStore,
    achievements: AchievementStore,
    guard: NavigationGuard,
}

/// Builder for [`Context`]; the only knob beyond the config is the
/// collection's write policy.
pub struct ContextBuilder {
    config: ClientConfig,
    tokens: Arc<dyn TokenStore>,
    policy: Arc<dyn WritePolicy>,
}

impl ContextBuilder {
    pub fn write_policy(mut self, policy: impl WritePolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn build(self) -> Result<Context, CoreError> {
        let transport = TransportConfig::default()
            .with_cookie_jar()
            .with_timeout(self.config.timeout);
        let api = BackendClient::new(self.config.base_url.clone(), self.tokens, &transport)?;
        Ok(Context::assemble(self.config, api, self.policy))
    }
}

impl Context {
    /// Build a context with the default [`Optimistic`] write policy.
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, CoreError> {
        Self::builder(config, tokens).build()
    }

    pub fn builder(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> ContextBuilder {
        ContextBuilder {
            config,
            tokens,
            policy: Arc::new(Optimistic),
        }
    }

    fn assemble(config: ClientConfig, api: BackendClient, policy: Arc<dyn WritePolicy>) -> Self {
        let session = SessionManager::new(api.clone(), config.logout_timeout);
        let books = BookStore::with_policy(api.clone(), policy);
        let stats = StatsStore::new(api.clone());
        let achievements = AchievementStore::new(api.clone());
        let guard = NavigationGuard::new(config.guard.clone());

        books.observe(Arc::new(stats.clone()));

        Self {
            inner: Arc::new(ContextInner {
                config,
                api,
                session,
                books,
                stats,
                achievements,
                guard,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn api(&self) -> &BackendClient {
        &self.inner.api
    }

    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    pub fn books(&self) -> &BookStore {
        &self.inner.books
    }

    pub fn stats(&self) -> &StatsStore {
        &self.inner.stats
    }

    pub fn achievements(&self) -> &AchievementStore {
        &self.inner.achievements
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.inner.guard
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Validate the persisted token; when it holds, load the collection
    /// and stats concurrently. Returns whether the session is valid.
    pub async fn bootstrap(&self) -> bool {
        if !self.inner.session.check_auth().await {
            debug!("no valid session at startup");
            return false;
        }

        let (books, stats) = tokio::join!(self.inner.books.fetch_all(), self.inner.stats.fetch());
        if !(books && stats) {
            warn!(books, stats, "initial load incomplete");
        }
        true
    }

    /// Log out and drop every user-scoped cache.
    pub async fn logout(&self) {
        self.inner.session.logout().await;
        self.inner.books.clear();
        self.inner.stats.clear();
        self.inner.achievements.clear();
        info!("local state cleared");
    }

    /// Run the guard for `path`. When the navigation proceeds with a
    /// session, stats are fetched before returning so the destination
    /// loads after them.
    pub async fn navigate(&self, path: &str) -> Navigation {
        let authenticated = self.inner.session.is_authenticated();
        let decision = self.inner.guard.check(path, authenticated);
        match &decision {
            Navigation::Proceed if authenticated => {
                self.inner.stats.fetch().await;
            }
            Navigation::Proceed => {}
            Navigation::Redirect { to } => debug!(path, to = %to, "navigation redirected"),
        }
        decision
    }
}

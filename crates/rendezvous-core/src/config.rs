// ── Runtime client configuration ──
//
// These types describe *where* the backend lives and how the layer
// behaves around it. They never touch disk: the CLI (or any other
// consumer) builds a `ClientConfig` and hands it in.

use std::time::Duration;

use url::Url;

/// Default backend when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:6050";

/// Default bound on the best-effort server logout notification.
pub const DEFAULT_LOGOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for one backend connection.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g. `http://localhost:6050`).
    pub base_url: Url,
    /// Per-request timeout. `None` (the default) lets requests hang
    /// until the backend answers.
    pub timeout: Option<Duration>,
    /// How long `logout` waits for the server before clearing local state.
    pub logout_timeout: Duration,
    /// Public routes and redirect target for the navigation guard.
    pub guard: GuardConfig,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: None,
            logout_timeout: DEFAULT_LOGOUT_TIMEOUT,
            guard: GuardConfig::default(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        let base_url = Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL is valid");
        Self::new(base_url)
    }
}

/// Destinations reachable without a session, and where everything else
/// redirects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    pub public_routes: Vec<String>,
    pub login_route: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            public_routes: vec!["/".into(), "/login".into()],
            login_route: "/login".into(),
        }
    }
}

// ── Navigation guard ──
//
// Pure routing decision: may an (un)authenticated user enter `path`?
// No I/O and no state of its own.

use crate::config::GuardConfig;

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect { to: String },
}

#[derive(Debug, Clone, Default)]
pub struct NavigationGuard {
    config: GuardConfig,
}

impl NavigationGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    /// Anonymous users may only enter public routes; everyone else is
    /// sent to the login route. Matching is exact on the path component.
    pub fn check(&self, path: &str, authenticated: bool) -> Navigation {
        if authenticated || self.is_public(path) {
            Navigation::Proceed
        } else {
            Navigation::Redirect {
                to: self.config.login_route.clone(),
            }
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        let path = route_path(path);
        self.config.public_routes.iter().any(|r| r == path)
    }
}

/// Strip query and fragment; an empty path is the root.
fn route_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    if path.is_empty() { "/" } else { path }
}

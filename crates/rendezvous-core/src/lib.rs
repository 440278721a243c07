//! Session and domain-state synchronization layer between
//! `rendezvous-api` and its consumers (CLI, or any other front end).
//!
//! - **[`Context`]** owns one instance of every store below, wires the
//!   collection → stats invalidation, and cascades logout.
//!
//! - **[`SessionManager`]** keeps the in-memory [`Session`] consistent
//!   with the persisted access token: `authenticated` is true exactly
//!   when a non-empty token is stored.
//!
//! - **[`BookStore`]** mirrors the collection. Writes are optimistic:
//!   local state changes first, the remote call runs in the background
//!   and its outcome goes through a [`WritePolicy`].
//!
//! - **[`StatsStore`]** / **[`AchievementStore`]** cache server-computed
//!   data; they never derive anything from the local collection.
//!
//! - **[`NavigationGuard`]** decides whether a route may be entered.
//!
//! Every store keeps its state in a `tokio::sync::watch` channel and
//! vends [`StateStream`] subscriptions. Nothing here touches disk:
//! configuration and token persistence are injected.

pub mod achievements;
pub mod books;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod invalidation;
pub mod reconcile;
pub mod session;
pub mod stats;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use achievements::{AchievementState, AchievementStore};
pub use books::{BookList, BookStore, CollectionChange, PendingWrite};
pub use config::{ClientConfig, DEFAULT_BACKEND_URL, DEFAULT_LOGOUT_TIMEOUT, GuardConfig};
pub use context::{Context, ContextBuilder};
pub use error::CoreError;
pub use guard::{Navigation, NavigationGuard};
pub use invalidation::MutationObserver;
pub use reconcile::{Optimistic, RollbackOnFailure, WritePolicy};
pub use session::{Session, SessionManager, SessionProfile};
pub use stats::{StatsState, StatsStore};
pub use stream::{StateStream, StateWatchStream};

// Wire types consumers need alongside the stores.
pub use rendezvous_api::{
    Achievement, Book, BookStatus, BooksPayload, Credentials, MemoryTokenStore, Registration,
    StatsSnapshot, TokenStore, TokenStoreError,
};

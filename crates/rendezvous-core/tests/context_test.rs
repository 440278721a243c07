#![allow(clippy::unwrap_used)]
// Context wiring: bootstrap, collection → stats invalidation, navigation
// prefetch and cascading logout.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rendezvous_core::{
    Book, BookStatus, ClientConfig, Context, MemoryTokenStore, Navigation, RollbackOnFailure,
    StatsSnapshot,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn stats_body() -> serde_json::Value {
    json!({
        "totalBooks": 3, "completedBooks": 1, "toReadBooks": 1, "readingBooks": 1,
        "favoriteBooks": 0, "totalPages": 900, "averageRating": 4.0
    })
}

fn expected_stats() -> StatsSnapshot {
    StatsSnapshot {
        total_books: 3,
        completed_books: 1,
        to_read_books: 1,
        reading_books: 1,
        favorite_books: 0,
        total_pages: 900,
        average_rating: 4.0,
    }
}

async fn setup(token: Option<&str>) -> (MockServer, Context) {
    let server = MockServer::start().await;
    let mut config = ClientConfig::new(Url::parse(&server.uri()).unwrap());
    config.logout_timeout = Duration::from_millis(200);
    let tokens = Arc::new(match token {
        Some(t) => MemoryTokenStore::with_token(t),
        None => MemoryTokenStore::new(),
    });
    let ctx = Context::builder(config, tokens)
        .write_policy(RollbackOnFailure)
        .build()
        .unwrap();
    (server, ctx)
}

async fn mount_stats(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body()))
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn bootstrap_loads_books_and_stats() {
    let (server, ctx) = setup(Some("t1")).await;

    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "alice" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "books": [{ "id": "b1", "title": "Dune", "status": "reading" }]
        })))
        .mount(&server)
        .await;
    mount_stats(&server, 1).await;

    assert!(ctx.bootstrap().await);
    assert!(ctx.session().is_authenticated());
    assert_eq!(ctx.books().len(), 1);
    assert_eq!(ctx.stats().snapshot(), expected_stats());
}

#[tokio::test]
async fn bootstrap_without_token_stays_anonymous() {
    let (server, ctx) = setup(None).await;
    mount_stats(&server, 0).await;

    assert!(!ctx.bootstrap().await);
    assert!(ctx.books().is_empty());
}

#[tokio::test]
async fn book_write_refreshes_stats() {
    let (server, ctx) = setup(Some("t1")).await;

    Mock::given(method("POST"))
        .and(path("/api/addbook"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .mount(&server)
        .await;
    mount_stats(&server, 1).await;

    let mut stats = ctx.stats().subscribe();
    let book = Book::new("b1", "g1", "Dune", vec![], BookStatus::Reading);
    ctx.books().add(book).settled().await.unwrap();

    let state = tokio::time::timeout(Duration::from_secs(5), stats.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.snapshot, expected_stats());
    assert!(state.last_refresh.is_some());
}

#[tokio::test]
async fn stats_refresh_does_not_wait_for_a_slow_write() {
    let (server, ctx) = setup(Some("t1")).await;

    Mock::given(method("DELETE"))
        .and(path("/api/books/b1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    mount_stats(&server, 1).await;

    let mut stats = ctx.stats().subscribe();
    let pending = ctx.books().remove("b1");

    let state = tokio::time::timeout(Duration::from_secs(1), stats.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.snapshot, expected_stats());
    assert!(!pending.is_finished());
}

#[tokio::test]
async fn stats_clear_then_fetch_reproduces_snapshot() {
    let (server, ctx) = setup(Some("t1")).await;
    mount_stats(&server, 2).await;

    assert!(ctx.stats().fetch().await);
    ctx.stats().clear();
    assert_eq!(ctx.stats().snapshot(), StatsSnapshot::default());

    assert!(ctx.stats().fetch().await);
    assert_eq!(ctx.stats().snapshot(), expected_stats());
}

#[tokio::test]
async fn navigation_prefetches_stats_only_when_authenticated() {
    let (server, ctx) = setup(Some("t1")).await;
    mount_stats(&server, 1).await;

    assert_eq!(ctx.navigate("/library").await, Navigation::Proceed);
    assert_eq!(ctx.stats().snapshot(), expected_stats());

    ctx.session().clear_token();
    assert_eq!(
        ctx.navigate("/library").await,
        Navigation::Redirect {
            to: "/login".into()
        }
    );
    assert_eq!(ctx.navigate("/login").await, Navigation::Proceed);
}

#[tokio::test]
async fn logout_clears_every_store() {
    let (server, ctx) = setup(Some("t1")).await;

    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "books": [{ "id": "b1", "title": "Dune", "status": "reading" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/achievements"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "achievements": [{ "name": "First book" }]
        })))
        .mount(&server)
        .await;
    mount_stats(&server, 1).await;

    ctx.books().fetch_all().await;
    ctx.stats().fetch().await;
    assert!(ctx.achievements().fetch().await);
    assert_eq!(ctx.achievements().achievements().len(), 1);

    ctx.logout().await;

    assert!(!ctx.session().is_authenticated());
    assert!(ctx.books().is_empty());
    assert_eq!(ctx.stats().snapshot(), StatsSnapshot::default());
    assert!(ctx.achievements().achievements().is_empty());
}

#[tokio::test]
async fn achievements_failure_records_error() {
    let (server, ctx) = setup(Some("t1")).await;

    Mock::given(method("GET"))
        .and(path("/api/achievements"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "db down" })))
        .mount(&server)
        .await;

    assert!(!ctx.achievements().fetch().await);
    let state = ctx.achievements().state();
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("Backend error (HTTP 500): db down"));
}

#![allow(clippy::unwrap_used)]
// Optimistic collection store: local-first writes, failure policies and
// the observer protocol.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rendezvous_api::{BackendClient, TransportConfig};
use rendezvous_core::books::draft;
use rendezvous_core::{
    Book, BookStatus, BookStore, CollectionChange, MemoryTokenStore, MutationObserver,
    RollbackOnFailure,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(
        Url::parse(&server.uri()).unwrap(),
        Arc::new(MemoryTokenStore::with_token("t1")),
        &TransportConfig::default(),
    )
    .unwrap()
}

fn book(id: &str, title: &str) -> Book {
    Book::new(id, format!("g-{id}"), title, vec!["Anon".into()], BookStatus::ToRead)
}

async fn mount_list(server: &MockServer, ids: &[&str]) {
    let books: Vec<_> = ids
        .iter()
        .map(|id| json!({ "id": id, "title": format!("Book {id}"), "status": "reading" }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "books": books })))
        .mount(server)
        .await;
}

#[derive(Default)]
struct CountingObserver {
    calls: AtomicUsize,
}

impl MutationObserver for CountingObserver {
    fn collection_changed(&self, _change: &CollectionChange) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Optimistic writes ───────────────────────────────────────────────

#[tokio::test]
async fn add_is_visible_before_the_server_answers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/addbook"))
        .and(body_partial_json(json!({ "book": { "id": "b1", "title": "Dune" } })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "message": "ok" }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = BookStore::new(client(&server).await);
    let pending = store.add(book("b1", "Dune"));

    assert_eq!(store.get("b1").unwrap().title, "Dune");
    assert!(!pending.is_finished());
    pending.settled().await.unwrap();
}

#[tokio::test]
async fn add_then_remove_leaves_nothing_regardless_of_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/addbook"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/books/b1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Book not found" })))
        .mount(&server)
        .await;

    let store = BookStore::new(client(&server).await);
    let add = store.add(book("b1", "Dune"));
    let remove = store.remove("b1");
    assert!(store.get("b1").is_none());

    let _ = remove.settled().await;
    add.settled().await.unwrap();
    assert!(store.get("b1").is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn add_with_existing_id_replaces_in_place() {
    let server = MockServer::start().await;
    mount_list(&server, &["b1", "b2"]).await;
    Mock::given(method("POST"))
        .and(path("/api/addbook"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .mount(&server)
        .await;

    let store = BookStore::new(client(&server).await);
    assert!(store.fetch_all().await);

    store.add(book("b1", "Replaced")).settled().await.unwrap();

    let books = store.books();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].title, "Replaced");
}

#[tokio::test]
async fn update_on_absent_id_still_issues_request() {
    let server = MockServer::start().await;
    mount_list(&server, &["b1"]).await;
    Mock::given(method("PUT"))
        .and(path("/api/books/zz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let store = BookStore::new(client(&server).await);
    store.fetch_all().await;

    store.update(book("zz", "Ghost")).settled().await.unwrap();
    assert_eq!(store.len(), 1);
    assert!(store.get("zz").is_none());
}

#[tokio::test]
async fn update_sends_zero_for_missing_rating() {
    let server = MockServer::start().await;
    mount_list(&server, &["b1"]).await;
    Mock::given(method("PUT"))
        .and(path("/api/books/b1"))
        .and(body_partial_json(json!({ "book": { "id": "b1", "rating": 0 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let store = BookStore::new(client(&server).await);
    store.fetch_all().await;

    let mut edited = (*store.get("b1").unwrap()).clone();
    edited.status = BookStatus::Finished;
    edited.rating = None;
    store.update(edited).settled().await.unwrap();

    let local = store.get("b1").unwrap();
    assert_eq!(local.status, BookStatus::Finished);
    assert_eq!(local.rating, Some(0));
}

#[tokio::test]
async fn remove_on_absent_id_still_issues_request() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/books/nope"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let store = BookStore::new(client(&server).await);
    store.remove("nope").settled().await.unwrap();
    assert!(store.is_empty());
}

// ── Failure policies ────────────────────────────────────────────────

#[tokio::test]
async fn optimistic_policy_keeps_local_state_on_failure() {
    let server = MockServer::start().await;
    mount_list(&server, &["b1"]).await;
    Mock::given(method("DELETE"))
        .and(path("/api/books/b1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = BookStore::new(client(&server).await);
    store.fetch_all().await;

    let result = store.remove("b1").settled().await;
    assert!(result.is_err());
    assert!(store.get("b1").is_none());
    assert!(store.last_error().is_some());
}

#[tokio::test]
async fn rollback_policy_restores_removed_book() {
    let server = MockServer::start().await;
    mount_list(&server, &["b1", "b2", "b3"]).await;
    Mock::given(method("DELETE"))
        .and(path("/api/books/b2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = BookStore::with_policy(client(&server).await, Arc::new(RollbackOnFailure));
    store.fetch_all().await;

    let pending = store.remove("b2");
    assert!(store.get("b2").is_none());
    assert!(pending.settled().await.is_err());

    let ids: Vec<_> = store.books().iter().map(|b| b.id.clone()).collect();
    assert_eq!(ids, ["b1", "b2", "b3"]);
}

#[tokio::test]
async fn rollback_policy_undoes_failed_add() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/addbook"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "Invalid request" })))
        .mount(&server)
        .await;

    let store = BookStore::with_policy(client(&server).await, Arc::new(RollbackOnFailure));
    let draft = draft("g-1", "Dune", vec![], BookStatus::Reading);
    let id = draft.id.clone();

    let pending = store.add(draft);
    assert!(store.get(&id).is_some());
    assert!(pending.settled().await.is_err());
    assert!(store.get(&id).is_none());
}

#[tokio::test]
async fn rollback_policy_keeps_add_with_unexpected_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/addbook"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "book": "stored" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = BookStore::with_policy(client(&server).await, Arc::new(RollbackOnFailure));
    let draft = draft("g-1", "Dune", vec![], BookStatus::Reading);
    let id = draft.id.clone();

    store.add(draft).settled().await.unwrap();
    assert!(store.get(&id).is_some());
    assert_eq!(store.last_error(), None);
}

// ── Observer protocol ───────────────────────────────────────────────

#[tokio::test]
async fn each_write_notifies_exactly_once_and_reads_never() {
    let server = MockServer::start().await;
    mount_list(&server, &["b1"]).await;
    Mock::given(method("POST"))
        .and(path("/api/addbook"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/books/b2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/books/b1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let store = BookStore::new(client(&server).await);
    let observer = Arc::new(CountingObserver::default());
    store.observe(observer.clone());

    store.fetch_all().await;
    let _ = store.get("b1");
    assert_eq!(observer.calls.load(Ordering::SeqCst), 0);

    store.add(book("b2", "Emma")).settled().await.unwrap();
    assert_eq!(observer.calls.load(Ordering::SeqCst), 1);

    // A failed write still notifies.
    let _ = store.update(book("b2", "Emma, revised")).settled().await;
    assert_eq!(observer.calls.load(Ordering::SeqCst), 2);

    store.remove("b1").settled().await.unwrap();
    assert_eq!(observer.calls.load(Ordering::SeqCst), 3);

    store.clear();
    store.fetch_all().await;
    assert_eq!(observer.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn observers_hear_the_local_step_before_the_server_answers() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/books/b1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let store = BookStore::new(client(&server).await);
    let observer = Arc::new(CountingObserver::default());
    store.observe(observer.clone());

    let pending = store.remove("b1");
    assert_eq!(observer.calls.load(Ordering::SeqCst), 1);
    assert!(!pending.is_finished());

    pending.settled().await.unwrap();
    assert_eq!(observer.calls.load(Ordering::SeqCst), 1);
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_all_replaces_and_dedupes() {
    let server = MockServer::start().await;
    mount_list(&server, &["b1", "b2", "b1"]).await;

    let store = BookStore::new(client(&server).await);
    let mut changes = store.subscribe();
    assert!(store.fetch_all().await);

    let ids: Vec<_> = store.books().iter().map(|b| b.id.clone()).collect();
    assert_eq!(ids, ["b1", "b2"]);
    assert_eq!(changes.changed().await.unwrap().len(), 2);
}

#[tokio::test]
async fn one_odd_status_does_not_empty_the_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "books": [
                { "id": "b1", "title": "Dune", "status": "reading" },
                { "id": "b2", "title": "Emma", "status": "pending" }
            ]
        })))
        .mount(&server)
        .await;

    let store = BookStore::new(client(&server).await);

    assert!(store.fetch_all().await);
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("b2").unwrap().status, BookStatus::Unknown);
    assert_eq!(store.last_error(), None);
}

#[tokio::test]
async fn failed_fetch_keeps_local_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid or expired JWT" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/addbook"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .mount(&server)
        .await;

    let store = BookStore::new(client(&server).await);
    store.add(book("b1", "Dune")).settled().await.unwrap();

    assert!(!store.fetch_all().await);
    assert_eq!(store.len(), 1);
    assert_eq!(store.last_error().as_deref(), Some("Invalid or expired JWT"));
}

#[tokio::test]
async fn fetch_public_leaves_local_state_alone() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/publicuser"))
        .and(body_partial_json(json!({ "publicid": "share-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "books": [{ "id": "p1", "title": "Shared", "status": "finished" }]
        })))
        .mount(&server)
        .await;

    let store = BookStore::new(client(&server).await);
    let payload = store.fetch_public("share-1").await.unwrap();

    assert_eq!(payload.books.len(), 1);
    assert!(store.is_empty());
    assert!(store.fetch_public("missing").await.is_none());
}

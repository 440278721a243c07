// ── Collection store ──
//
// Local mirror of the user's book collection. Structural writes are
// optimistic: the local sequence changes synchronously, then the remote
// call runs as a detached task. The local copy is only re-synced with
// the server by an explicit `fetch_all`.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};

use rendezvous_api::{BackendClient, Book, BookStatus, BooksPayload};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::CoreError;
use crate::invalidation::MutationObserver;
use crate::reconcile::{Optimistic, WritePolicy};
use crate::stream::StateStream;

/// Snapshot type vended to subscribers.
pub type BookList = Arc<Vec<Arc<Book>>>;

/// A structural write, as applied locally.
///
/// `previous` values capture what the write replaced so a
/// [`WritePolicy`] can undo it.
#[derive(Debug, Clone)]
pub enum CollectionChange {
    /// `previous` is set when the add replaced an entry with the same id.
    Added {
        book: Arc<Book>,
        previous: Option<Arc<Book>>,
    },
    /// `previous` is `None` when the id was absent locally.
    Updated {
        book: Arc<Book>,
        previous: Option<Arc<Book>>,
    },
    /// `previous` holds the removed entry and its index.
    Removed {
        id: String,
        previous: Option<(usize, Arc<Book>)>,
    },
}

impl CollectionChange {
    pub fn id(&self) -> &str {
        match self {
            Self::Added { book, .. } | Self::Updated { book, .. } => &book.id,
            Self::Removed { id, .. } => id,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Added { .. } => "add",
            Self::Updated { .. } => "update",
            Self::Removed { .. } => "remove",
        }
    }
}

/// Handle on the remote half of an optimistic write.
///
/// Dropping it does not cancel the write.
#[derive(Debug)]
pub struct PendingWrite {
    handle: JoinHandle<Result<(), CoreError>>,
}

impl PendingWrite {
    /// Wait for the remote call (and the failure policy, if it ran).
    pub async fn settled(self) -> Result<(), CoreError> {
        self.handle
            .await
            .unwrap_or_else(|e| Err(CoreError::Internal(format!("write task failed: {e}"))))
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// A new book with a provisional client-side id.
pub fn draft(
    google_books_id: impl Into<String>,
    title: impl Into<String>,
    authors: Vec<String>,
    status: BookStatus,
) -> Book {
    Book::new(
        Uuid::new_v4().to_string(),
        google_books_id,
        title,
        authors,
        status,
    )
}

// ── BookStore ────────────────────────────────────────────────────

/// The user's book collection.
///
/// Cheaply cloneable via `Arc<BookStoreInner>`. Writes must be issued
/// from within a Tokio runtime.
#[derive(Clone)]
pub struct BookStore {
    inner: Arc<BookStoreInner>,
}

struct BookStoreInner {
    api: BackendClient,
    books: watch::Sender<BookList>,
    observers: RwLock<Vec<Arc<dyn MutationObserver>>>,
    policy: Arc<dyn WritePolicy>,
    last_error: Mutex<Option<String>>,
}

impl BookStore {
    /// Create an empty store with the [`Optimistic`] write policy.
    pub fn new(api: BackendClient) -> Self {
        Self::with_policy(api, Arc::new(Optimistic))
    }

    pub fn with_policy(api: BackendClient, policy: Arc<dyn WritePolicy>) -> Self {
        let (books, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            inner: Arc::new(BookStoreInner {
                api,
                books,
                observers: RwLock::new(Vec::new()),
                policy,
                last_error: Mutex::new(None),
            }),
        }
    }

    /// Register an observer notified once per write, as soon as its
    /// local step is applied.
    pub fn observe(&self, observer: Arc<dyn MutationObserver>) {
        self.inner
            .observers
            .write()
            .expect("observer lock poisoned")
            .push(observer);
    }

    // ── Reads ────────────────────────────────────────────────────

    pub fn get(&self, id: &str) -> Option<Arc<Book>> {
        self.inner
            .books
            .borrow()
            .iter()
            .find(|b| b.id == id)
            .map(Arc::clone)
    }

    pub fn books(&self) -> BookList {
        self.inner.books.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.books.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.books.borrow().is_empty()
    }

    pub fn subscribe(&self) -> StateStream<BookList> {
        StateStream::new(self.inner.books.subscribe())
    }

    /// Message from the most recent failed fetch or write, cleared by the
    /// next success.
    pub fn last_error(&self) -> Option<String> {
        self.inner
            .last_error
            .lock()
            .expect("error lock poisoned")
            .clone()
    }

    // ── Optimistic writes ────────────────────────────────────────

    /// Append `book` locally (replacing an entry with the same id), then
    /// create it on the backend.
    pub fn add(&self, book: Book) -> PendingWrite {
        let book = Arc::new(book);
        let mut previous = None;
        self.inner.books.send_modify(|snap| {
            let books = Arc::make_mut(snap);
            match books.iter_mut().find(|b| b.id == book.id) {
                Some(slot) => previous = Some(std::mem::replace(slot, Arc::clone(&book))),
                None => books.push(Arc::clone(&book)),
            }
        });

        let change = CollectionChange::Added {
            book: Arc::clone(&book),
            previous,
        };
        self.spawn_write(change, move |api| async move { api.add_book(&book).await })
    }

    /// Replace the local entry with `book.id`, then update it on the
    /// backend. A missing rating is sent as 0. An absent id changes
    /// nothing locally but the request is still issued.
    pub fn update(&self, mut book: Book) -> PendingWrite {
        book.rating.get_or_insert(0);
        let book = Arc::new(book);
        let mut previous = None;
        self.inner.books.send_if_modified(|snap| {
            let Some(pos) = snap.iter().position(|b| b.id == book.id) else {
                return false;
            };
            let books = Arc::make_mut(snap);
            previous = Some(std::mem::replace(&mut books[pos], Arc::clone(&book)));
            true
        });

        let change = CollectionChange::Updated {
            book: Arc::clone(&book),
            previous,
        };
        self.spawn_write(change, move |api| async move { api.update_book(&book).await })
    }

    /// Drop the local entry with `id`, then delete it on the backend. An
    /// absent id changes nothing locally but the request is still issued.
    pub fn remove(&self, id: &str) -> PendingWrite {
        let mut previous = None;
        self.inner.books.send_if_modified(|snap| {
            let Some(pos) = snap.iter().position(|b| b.id == id) else {
                return false;
            };
            previous = Some((pos, Arc::make_mut(snap).remove(pos)));
            true
        });

        let change = CollectionChange::Removed {
            id: id.to_owned(),
            previous,
        };
        let id = id.to_owned();
        self.spawn_write(change, move |api| async move { api.delete_book(&id).await })
    }

    /// Notify observers of the applied local step, then run the remote
    /// half of the write in the background, applying the failure policy
    /// if it fails.
    fn spawn_write<F, Fut>(&self, change: CollectionChange, call: F) -> PendingWrite
    where
        F: FnOnce(BackendClient) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), rendezvous_api::Error>> + Send + 'static,
    {
        self.inner.notify(&change);

        let inner = Arc::clone(&self.inner);
        let api = inner.api.clone();

        let handle = tokio::spawn(async move {
            let result = call(api).await.map_err(CoreError::from);
            match &result {
                Ok(()) => {
                    debug!(op = change.kind(), id = change.id(), "book write confirmed");
                    inner.set_error(None);
                }
                Err(e) => {
                    warn!(op = change.kind(), id = change.id(), error = %e, "book write failed");
                    inner.set_error(Some(e.to_string()));
                    inner.books.send_if_modified(|snap| {
                        let mut books = snap.as_ref().clone();
                        if inner.policy.on_failure(&change, &mut books) {
                            *snap = Arc::new(books);
                            true
                        } else {
                            false
                        }
                    });
                }
            }
            result
        });

        PendingWrite { handle }
    }

    // ── Full reads ───────────────────────────────────────────────

    /// Replace the whole local sequence with the server's list. Observers
    /// are not notified.
    pub async fn fetch_all(&self) -> bool {
        match self.inner.api.list_books().await {
            Ok(books) => {
                let mut seen = HashSet::new();
                let books: Vec<Arc<Book>> = books
                    .into_iter()
                    .filter(|b| seen.insert(b.id.clone()))
                    .map(Arc::new)
                    .collect();
                debug!(count = books.len(), "collection fetched");
                self.inner.books.send_replace(Arc::new(books));
                self.inner.set_error(None);
                true
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(error = %err, "collection fetch failed");
                self.inner.set_error(Some(err.to_string()));
                false
            }
        }
    }

    /// Read another user's shared collection. Local state is untouched.
    pub async fn fetch_public(&self, public_id: &str) -> Option<BooksPayload> {
        match self.inner.api.public_books(public_id).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(public_id, error = %CoreError::from(e), "public collection fetch failed");
                None
            }
        }
    }

    /// Empty the local collection. Observers are not notified.
    pub fn clear(&self) {
        self.inner.books.send_replace(Arc::new(Vec::new()));
        self.inner.set_error(None);
    }
}

impl BookStoreInner {
    fn set_error(&self, error: Option<String>) {
        *self.last_error.lock().expect("error lock poisoned") = error;
    }

    fn notify(&self, change: &CollectionChange) {
        let observers = self.observers.read().expect("observer lock poisoned").clone();
        for observer in &observers {
            observer.collection_changed(change);
        }
    }
}

// ── Write reconciliation ──
//
// What happens to the local collection when an optimistic write is
// rejected by the backend. The store applies the policy inside a single
// state write, so subscribers see either the optimistic state or the
// reconciled one.

use std::sync::Arc;

use rendezvous_api::Book;

use crate::books::CollectionChange;

/// Decides how a failed remote write is reflected locally.
pub trait WritePolicy: Send + Sync {
    /// Adjust `books` after the remote call for `change` failed.
    /// Returns `true` if `books` was modified.
    fn on_failure(&self, change: &CollectionChange, books: &mut Vec<Arc<Book>>) -> bool;
}

/// Keep the optimistic local state even when the server rejects the
/// write. Local and server state may diverge until the next full fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct Optimistic;

impl WritePolicy for Optimistic {
    fn on_failure(&self, _change: &CollectionChange, _books: &mut Vec<Arc<Book>>) -> bool {
        false
    }
}

/// Undo a failed write.
///
/// An entry is only rolled back while it is still the exact record the
/// failed write installed (`Arc::ptr_eq`); a newer local write to the
/// same id wins over the rollback.
#[derive(Debug, Clone, Copy, Default)]
pub struct RollbackOnFailure;

impl WritePolicy for RollbackOnFailure {
    fn on_failure(&self, change: &CollectionChange, books: &mut Vec<Arc<Book>>) -> bool {
        match change {
            CollectionChange::Added { book, previous } => {
                let Some(pos) = books.iter().position(|b| Arc::ptr_eq(b, book)) else {
                    return false;
                };
                match previous {
                    Some(prev) => books[pos] = Arc::clone(prev),
                    None => {
                        books.remove(pos);
                    }
                }
                true
            }
            CollectionChange::Updated { book, previous } => {
                let Some(prev) = previous else {
                    return false;
                };
                match books.iter_mut().find(|b| Arc::ptr_eq(b, book)) {
                    Some(slot) => {
                        *slot = Arc::clone(prev);
                        true
                    }
                    None => false,
                }
            }
            CollectionChange::Removed { id, previous } => {
                let Some((index, prev)) = previous else {
                    return false;
                };
                if books.iter().any(|b| &b.id == id) {
                    return false;
                }
                let index = (*index).min(books.len());
                books.insert(index, Arc::clone(prev));
                true
            }
        }
    }
}

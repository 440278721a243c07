// ── Mutation invalidation ──
//
// Collection writes invalidate server-derived data. Observers registered
// on the `BookStore` hear about every structural write exactly once,
// right after its local step, without waiting for the remote call.

use crate::books::CollectionChange;

/// Receives a notification for each add/update/remove.
///
/// Called synchronously from the writing call, inside a Tokio runtime.
/// Implementations must not block; long work should be spawned.
pub trait MutationObserver: Send + Sync {
    fn collection_changed(&self, change: &CollectionChange);
}

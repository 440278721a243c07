// ── Reactive state streams ──
//
// Subscription handles vended by the stores. Every store keeps its state
// in a `watch` channel and writes it in one step, so a subscriber always
// observes a whole state, never a half-applied mutation.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A subscription to one store's state.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via [`changed()`](Self::changed) or by converting to a
/// `Stream`.
pub struct StateStream<T: Clone + Send + Sync + 'static> {
    current: T,
    receiver: watch::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> StateStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<T>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The state captured at creation time (or at the last `changed()`).
    pub fn current(&self) -> &T {
        &self.current
    }

    /// The latest state (may have changed since creation).
    pub fn latest(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new state.
    /// Returns `None` once the owning store has been dropped.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        let state = self.receiver.borrow_and_update().clone();
        self.current = state.clone();
        Some(state)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> StateWatchStream<T> {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current state first, then a new state each time the
/// store is written.
pub struct StateWatchStream<T: Clone + Send + Sync + 'static> {
    inner: WatchStream<T>,
}

impl<T: Clone + Send + Sync + Unpin + 'static> Stream for StateWatchStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use tokio_stream::StreamExt;

    use super::*;

    #[tokio::test]
    async fn snapshot_tracks_the_last_observed_change() {
        let (tx, rx) = watch::channel(1_u32);
        let mut sub = StateStream::new(rx);
        assert_eq!(*sub.current(), 1);

        tx.send_replace(2);
        assert_eq!(*sub.current(), 1);
        assert_eq!(sub.latest(), 2);

        assert_eq!(sub.changed().await, Some(2));
        assert_eq!(*sub.current(), 2);

        drop(tx);
        assert_eq!(sub.changed().await, None);
    }

    #[tokio::test]
    async fn stream_yields_current_then_each_write() {
        let (tx, rx) = watch::channel(String::from("a"));
        let mut stream = StateStream::new(rx).into_stream();

        assert_eq!(stream.next().await.as_deref(), Some("a"));
        tx.send_replace("b".into());
        assert_eq!(stream.next().await.as_deref(), Some("b"));

        drop(tx);
        assert_eq!(stream.next().await, None);
    }
}

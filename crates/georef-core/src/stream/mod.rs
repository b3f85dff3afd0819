// ── Reactive section streams ──
//
// Subscription types for consuming AddressSection state changes.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::cascade::SectionState;

/// A subscription to one address section.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via [`changed()`](Self::changed) or by converting to a `Stream`.
pub struct SectionStream {
    current: SectionState,
    receiver: watch::Receiver<SectionState>,
}

impl SectionStream {
    pub(crate) fn new(receiver: watch::Receiver<SectionState>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Get the snapshot captured at creation time (or at the last `changed()`).
    pub fn current(&self) -> &SectionState {
        &self.current
    }

    /// Get the latest snapshot (may have changed since creation).
    pub fn latest(&self) -> SectionState {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the section has been dropped.
    pub async fn changed(&mut self) -> Option<SectionState> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Wait until `predicate` holds for the section state.
    ///
    /// Checks the current value first, so it returns immediately if the
    /// condition is already met.
    pub async fn wait_until(
        &mut self,
        mut predicate: impl FnMut(&SectionState) -> bool,
    ) -> Option<SectionState> {
        let snap = self
            .receiver
            .wait_for(|state| predicate(state))
            .await
            .ok()?
            .clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> SectionWatchStream {
        SectionWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current snapshot first, then a new one each time the
/// section's visible state changes.
pub struct SectionWatchStream {
    inner: WatchStream<SectionState>,
}

impl Stream for SectionWatchStream {
    type Item = SectionState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

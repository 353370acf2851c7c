//! Publish watcher port definition.

use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::domain::entities::{EntityId, Offering};
use crate::domain::errors::WatchError;

/// Observable state of one publish watch.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchState {
    Idle,
    Polling { attempt: u32 },
    Succeeded(Offering),
    Failed(String),
    TimedOut,
}

impl WatchState {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_) | Self::TimedOut)
    }
}

/// Callback run once when the offering is observed as published.
pub type OnPublished = Box<dyn FnOnce(Offering) + Send>;

/// Port for tracking an accepted publish request until it settles.
pub trait PublishWatcher: Send + Sync {
    /// Starts watching an offering.
    ///
    /// # Errors
    /// Returns [`WatchError::AlreadyWatching`] when the offering already has an active watch.
    fn watch(&self, id: EntityId, on_published: OnPublished) -> Result<WatchHandle, WatchError>;

    /// Returns whether the offering has an active watch.
    fn is_watching(&self, id: &EntityId) -> bool;
}

/// Owner of a running watch. Dropping it stops the watch.
#[derive(Debug)]
pub struct WatchHandle {
    id: EntityId,
    state: watch::Receiver<WatchState>,
    abort: Option<AbortHandle>,
}

impl WatchHandle {
    #[must_use]
    pub fn new(id: EntityId, state: watch::Receiver<WatchState>, abort: Option<AbortHandle>) -> Self {
        Self { id, state, abort }
    }

    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Latest observed state.
    #[must_use]
    pub fn state(&self) -> WatchState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.borrow().is_terminal()
            || self.abort.as_ref().is_some_and(AbortHandle::is_finished)
    }

    /// Stops polling; no further state changes or callbacks happen.
    pub fn cancel(&self) {
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    /// Waits until the watch reaches a terminal state or stops.
    pub async fn wait(&mut self) -> WatchState {
        loop {
            if self.state.borrow().is_terminal() {
                break;
            }
            if self.state.changed().await.is_err() {
                break;
            }
        }
        self.state()
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;

    /// Watcher that records requested ids without polling.
    #[derive(Default)]
    pub struct RecordingWatcher {
        watched: Mutex<Vec<EntityId>>,
    }

    impl RecordingWatcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn watched(&self) -> Vec<EntityId> {
            self.watched.lock().clone()
        }
    }

    impl PublishWatcher for RecordingWatcher {
        fn watch(&self, id: EntityId, _on_published: OnPublished) -> Result<WatchHandle, WatchError> {
            self.watched.lock().push(id.clone());
            let (_tx, rx) = watch::channel(WatchState::Polling { attempt: 0 });
            Ok(WatchHandle::new(id, rx, None))
        }

        fn is_watching(&self, id: &EntityId) -> bool {
            self.watched.lock().contains(id)
        }
    }
}

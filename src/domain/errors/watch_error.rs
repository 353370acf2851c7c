//! Publish watcher error types.

use thiserror::Error;

use crate::domain::entities::EntityId;

/// Publish watcher error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum WatchError {
    #[error("offering {0} is already being watched")]
    AlreadyWatching(EntityId),
}

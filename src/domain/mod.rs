//! Domain layer with catalog entities, errors and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Toast notifications.
pub mod notification;
/// Port definitions.
pub mod ports;
/// Store filter state.
pub mod search;
/// Serde utilities.
pub mod serde_utils;

pub use entities::{AuthToken, EntityId, User};
pub use errors::{ApiError, AuthError};
pub use ports::{HttpTransport, SessionStoragePort, ToastPort};
pub use notification::{Notification, NotificationLevel};

//! Domain error types.

mod api_error;
mod auth_error;
mod catalog_error;
mod storage_error;
mod validation_error;
mod watch_error;

pub use api_error::{ApiError, ApiErrorKind};
pub use auth_error::AuthError;
pub use catalog_error::{CatalogActionError, CatalogError};
pub use storage_error::StorageError;
pub use validation_error::ValidationErrors;
pub use watch_error::WatchError;

//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Catalog API client and HTTP transport.
pub mod http;
/// Application state persistence.
pub mod state_store;
/// Session storage adapters.
pub mod storage;

pub use config::{AppConfig, CliArgs, LogLevel, StorageManager};
pub use http::{ApiClient, ReqwestTransport};
pub use state_store::{AppState, StateStore};
pub use storage::LocalStorage;

//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{ApiConfig, AppConfig, LogLevel, PublishConfig, StoreConfig, UiConfig};
pub use args::CliArgs;
pub use storage::{ConfigError, StorageManager};

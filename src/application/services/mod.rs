pub mod auth_context;
pub mod catalog_service;
pub mod data_table;
pub mod debouncer;
pub mod notification_manager;
pub mod publish_watcher;
pub mod store_browser;

pub use auth_context::{AuthContext, Route, SessionEvent};
pub use catalog_service::{CatalogResource, CatalogService};
pub use data_table::{Column, DataTable, PageButton, SortDirection};
pub use debouncer::{DEFAULT_DEBOUNCE, Debouncer};
pub use notification_manager::{NotificationManager, ToastSender};
pub use publish_watcher::{PollConfig, PollingPublishWatcher};
pub use store_browser::{FetchMode, LocationHistory, STORE_PAGE_SIZE, SearchTicket, StoreBrowser, StoreSearchService};

mod http_port;
mod publish_watcher_port;
mod session_storage_port;
mod toast_port;

pub use http_port::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody};
pub use publish_watcher_port::{OnPublished, PublishWatcher, WatchHandle, WatchState};
pub use session_storage_port::SessionStoragePort;
pub use toast_port::ToastPort;

#[cfg(test)]
pub mod mocks {
    pub use super::http_port::mock::MockTransport;
    pub use super::publish_watcher_port::mock::RecordingWatcher;
    pub use super::session_storage_port::mock::MemoryStorage;
    pub use super::toast_port::mock::RecordingToasts;
}

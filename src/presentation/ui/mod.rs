//! UI screens.

mod app;
mod builder_screen;
mod login_screen;
mod notification_popup;
mod store_screen;
mod viewer_screen;

pub use app::App;
pub use builder_screen::{BuilderAction, BuilderScreen, BuilderTab};
pub use login_screen::{LoginAction, LoginScreen, LoginState};
pub use notification_popup::NotificationPopup;
pub use store_screen::{StoreAction, StoreFocus, StoreScreen};
pub use viewer_screen::{CatalogRecord, LoadedRecords, ViewerAction, ViewerScreen};

use crate::domain::notification::NotificationLevel;

/// Port for transient user-facing notifications.
pub trait ToastPort: Send + Sync {
    /// Shows a toast.
    fn show(&self, level: NotificationLevel, message: &str);

    fn success(&self, message: &str) {
        self.show(NotificationLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.show(NotificationLevel::Error, message);
    }

    fn info(&self, message: &str) {
        self.show(NotificationLevel::Info, message);
    }
}

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::{Notification, NotificationLevel, ToastPort};

#[derive(Debug)]
pub struct NotificationManager {
    queue: VecDeque<Notification>,
    default_duration: Duration,
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl NotificationManager {
    #[must_use]
    pub fn new(default_duration: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            default_duration,
        }
    }

    pub fn push(&mut self, notification: Notification) {
        self.queue
            .push_back(notification.with_duration(self.default_duration));
    }

    pub fn notify(
        &mut self,
        level: NotificationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(Notification::new(level, title, message));
    }

    pub fn info(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(NotificationLevel::Info, title, message);
    }

    pub fn success(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(NotificationLevel::Success, title, message);
    }

    pub fn error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(NotificationLevel::Error, title, message);
    }

    pub fn tick(&mut self) {
        if let Some(front) = self.queue.front_mut() {
            front.mark_displayed();
            if front.is_expired() {
                self.queue.pop_front();
                if let Some(next) = self.queue.front_mut() {
                    next.mark_displayed();
                }
            }
        }
    }

    /// Drops the visible toast immediately.
    pub fn dismiss(&mut self) {
        self.queue.pop_front();
        if let Some(next) = self.queue.front_mut() {
            next.mark_displayed();
        }
    }

    #[must_use]
    pub fn current_notification(&self) -> Option<&Notification> {
        self.queue.front()
    }

    #[must_use]
    pub fn has_notifications(&self) -> bool {
        !self.queue.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Toast sink that forwards toasts from any task to the UI loop.
#[derive(Debug, Clone)]
pub struct ToastSender {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ToastSender {
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<Notification>) -> Self {
        Self { tx }
    }

    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl ToastPort for ToastSender {
    fn show(&self, level: NotificationLevel, message: &str) {
        if self.tx.send(Notification::toast(level, message)).is_err() {
            debug!(message, "Toast dropped, UI loop is gone");
        }
    }
}

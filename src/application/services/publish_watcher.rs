//! Short-poll implementation of [`PublishWatcher`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::entities::{EntityId, LifecycleStatus, Offering};
use crate::domain::errors::WatchError;
use crate::domain::ports::{OnPublished, PublishWatcher, ToastPort, WatchHandle, WatchState};
use crate::infrastructure::http::ApiClient;

/// Polling cadence and budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: 30,
        }
    }
}

/// Polls `GET /offerings/{id}` until the offering is published, fails or the budget runs out.
/// At most one poll runs per offering.
pub struct PollingPublishWatcher {
    api: Arc<ApiClient>,
    toasts: Arc<dyn ToastPort>,
    config: PollConfig,
    active: Arc<Mutex<HashSet<EntityId>>>,
}

impl PollingPublishWatcher {
    #[must_use]
    pub fn new(api: Arc<ApiClient>, toasts: Arc<dyn ToastPort>, config: PollConfig) -> Self {
        Self {
            api,
            toasts,
            config,
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    #[must_use]
    pub fn config(&self) -> PollConfig {
        self.config
    }
}

impl PublishWatcher for PollingPublishWatcher {
    fn watch(&self, id: EntityId, on_published: OnPublished) -> Result<WatchHandle, WatchError> {
        if !self.active.lock().insert(id.clone()) {
            warn!(offering_id = %id, "Publish watch already running");
            return Err(WatchError::AlreadyWatching(id));
        }

        let (tx, rx) = watch::channel(WatchState::Idle);
        let slot = ActiveSlot {
            active: self.active.clone(),
            id: id.clone(),
        };
        let task = tokio::spawn(run(
            self.api.clone(),
            self.toasts.clone(),
            self.config,
            slot,
            tx,
            on_published,
        ));

        info!(offering_id = %id, interval_ms = self.config.interval.as_millis(), "Watching publication");
        Ok(WatchHandle::new(id, rx, Some(task.abort_handle())))
    }

    fn is_watching(&self, id: &EntityId) -> bool {
        self.active.lock().contains(id)
    }
}

/// Frees the offering's watch slot when the poll ends or is aborted.
struct ActiveSlot {
    active: Arc<Mutex<HashSet<EntityId>>>,
    id: EntityId,
}

impl Drop for ActiveSlot {
    fn drop(&mut self) {
        self.active.lock().remove(&self.id);
    }
}

async fn run(
    api: Arc<ApiClient>,
    toasts: Arc<dyn ToastPort>,
    config: PollConfig,
    slot: ActiveSlot,
    tx: watch::Sender<WatchState>,
    on_published: OnPublished,
) {
    let id = slot.id.clone();
    let outcome = poll(&api, config, &id, &tx).await;
    drop(slot);

    match &outcome {
        WatchState::Succeeded(offering) => {
            info!(offering_id = %id, "Offering published");
            toasts.success(&format!("\"{}\" is now published!", offering.name));
        }
        WatchState::Failed(reason) => {
            warn!(offering_id = %id, reason, "Publication failed");
            toasts.error(&format!("Publication failed: {reason}"));
        }
        WatchState::TimedOut => {
            warn!(offering_id = %id, attempts = config.max_attempts, "Publication watch timed out");
            toasts.error("Publication is taking longer than expected. Check its status in the Viewer.");
        }
        WatchState::Idle | WatchState::Polling { .. } => {}
    }

    tx.send_replace(outcome.clone());
    if let WatchState::Succeeded(offering) = outcome {
        on_published(offering);
    }
}

async fn poll(
    api: &ApiClient,
    config: PollConfig,
    id: &EntityId,
    tx: &watch::Sender<WatchState>,
) -> WatchState {
    let path = format!("/offerings/{id}");

    for attempt in 1..=config.max_attempts {
        tx.send_replace(WatchState::Polling { attempt });
        tokio::time::sleep(config.interval).await;

        match api.get::<Offering>(&path, &[]).await {
            Ok(offering) => {
                debug!(offering_id = %id, attempt, status = %offering.lifecycle_status, "Polled offering");
                match offering.lifecycle_status {
                    LifecycleStatus::Published => return WatchState::Succeeded(offering),
                    LifecycleStatus::Retired => {
                        return WatchState::Failed(format!(
                            "\"{}\" was retired before it was published",
                            offering.name
                        ));
                    }
                    LifecycleStatus::Draft | LifecycleStatus::Publishing => {}
                }
            }
            Err(e) if e.is_unauthorized() => {
                return WatchState::Failed("Session expired while waiting for publication".to_string());
            }
            Err(e) if matches!(e.status, Some(403 | 404)) => return WatchState::Failed(e.message),
            Err(e) => warn!(offering_id = %id, attempt, error = %e, "Poll request failed"),
        }
    }

    WatchState::TimedOut
}

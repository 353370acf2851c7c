//! Listing and row actions for the catalog tables.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::application::forms::{PUBLISH_STARTED, failure_message};
use crate::domain::entities::{
    Characteristic, EntityId, LifecycleStatus, Offering, Price, Specification,
};
use crate::domain::errors::{ApiError, CatalogActionError, CatalogError};
use crate::domain::ports::{HttpMethod, OnPublished, PublishWatcher, RequestBody, ToastPort, WatchHandle};
use crate::infrastructure::http::ApiClient;

/// Backend collections shown in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogResource {
    Characteristics,
    Specifications,
    Prices,
    Offerings,
}

impl CatalogResource {
    pub const ALL: [Self; 4] = [
        Self::Characteristics,
        Self::Specifications,
        Self::Prices,
        Self::Offerings,
    ];

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Characteristics => "/characteristics",
            Self::Specifications => "/specifications",
            Self::Prices => "/prices",
            Self::Offerings => "/offerings",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Characteristics => "Characteristics",
            Self::Specifications => "Specifications",
            Self::Prices => "Pricing Plans",
            Self::Offerings => "Offerings",
        }
    }

    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Characteristics => "Characteristic",
            Self::Specifications => "Specification",
            Self::Prices => "Pricing plan",
            Self::Offerings => "Offering",
        }
    }

    fn item_path(self, id: &EntityId) -> String {
        format!("{}/{id}", self.path())
    }
}

pub struct CatalogService {
    api: Arc<ApiClient>,
    toasts: Arc<dyn ToastPort>,
    watcher: Arc<dyn PublishWatcher>,
}

impl CatalogService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>, toasts: Arc<dyn ToastPort>, watcher: Arc<dyn PublishWatcher>) -> Self {
        Self {
            api,
            toasts,
            watcher,
        }
    }

    /// Fetches a whole collection.
    ///
    /// # Errors
    /// Returns the request error after showing a toast.
    pub async fn list<T: DeserializeOwned>(&self, resource: CatalogResource) -> Result<Vec<T>, ApiError> {
        let result = self.api.get::<Vec<T>>(resource.path(), &[]).await;
        match &result {
            Ok(records) => info!(path = resource.path(), count = records.len(), "Catalog list loaded"),
            Err(e) => {
                warn!(path = resource.path(), error = %e, "Catalog list failed");
                self.toasts
                    .error(&format!("Failed to load {}", resource.title().to_lowercase()));
            }
        }
        result
    }

    /// # Errors
    /// See [`CatalogService::list`].
    pub async fn characteristics(&self) -> Result<Vec<Characteristic>, ApiError> {
        self.list(CatalogResource::Characteristics).await
    }

    /// # Errors
    /// See [`CatalogService::list`].
    pub async fn specifications(&self) -> Result<Vec<Specification>, ApiError> {
        self.list(CatalogResource::Specifications).await
    }

    /// # Errors
    /// See [`CatalogService::list`].
    pub async fn prices(&self) -> Result<Vec<Price>, ApiError> {
        self.list(CatalogResource::Prices).await
    }

    /// # Errors
    /// See [`CatalogService::list`].
    pub async fn offerings(&self) -> Result<Vec<Offering>, ApiError> {
        self.list(CatalogResource::Offerings).await
    }

    /// # Errors
    /// Returns the request error.
    pub async fn delete_characteristic(&self, characteristic: &Characteristic) -> Result<(), CatalogActionError> {
        self.delete(CatalogResource::Characteristics, &characteristic.id).await
    }

    /// # Errors
    /// Returns the request error.
    pub async fn delete_specification(&self, specification: &Specification) -> Result<(), CatalogActionError> {
        self.delete(CatalogResource::Specifications, &specification.id).await
    }

    /// # Errors
    /// Returns [`CatalogError::PriceLocked`] without a request for locked plans.
    pub async fn delete_price(&self, price: &Price) -> Result<(), CatalogActionError> {
        if !price.is_editable() {
            return Err(self.reject(CatalogError::PriceLocked));
        }
        self.delete(CatalogResource::Prices, &price.id).await
    }

    /// # Errors
    /// Returns [`CatalogError::NotDeletable`] without a request for PUBLISHING and
    /// PUBLISHED offerings.
    pub async fn delete_offering(&self, offering: &Offering) -> Result<(), CatalogActionError> {
        if !offering.can_delete() {
            return Err(self.reject(CatalogError::NotDeletable(offering.lifecycle_status)));
        }
        self.delete(CatalogResource::Offerings, &offering.id).await
    }

    /// Retires a published offering.
    ///
    /// # Errors
    /// Returns [`CatalogError::NotRetirable`] without a request unless PUBLISHED.
    pub async fn retire(&self, offering: &Offering) -> Result<(), CatalogActionError> {
        if !offering.can_retire() {
            return Err(self.reject(CatalogError::NotRetirable(offering.lifecycle_status)));
        }
        let path = format!("/offerings/{}/retire", offering.id);
        self.post_action(&path, "Failed to retire offering").await?;
        info!(offering_id = %offering.id, "Offering retired");
        self.toasts.success(&format!("\"{}\" retired", offering.name));
        Ok(())
    }

    /// Starts publishing an existing draft and hands it to the watcher.
    ///
    /// # Errors
    /// Returns a [`CatalogError`] without a request when the offering is not a DRAFT or
    /// misses a specification, price or sales channel.
    pub async fn publish(
        &self,
        offering: &Offering,
        on_published: OnPublished,
    ) -> Result<Option<WatchHandle>, CatalogActionError> {
        if offering.lifecycle_status != LifecycleStatus::Draft {
            return Err(self.reject(CatalogError::NotPublishable(offering.lifecycle_status)));
        }
        let missing = offering.missing_requirements();
        if !missing.is_empty() {
            return Err(self.reject(CatalogError::PublishRequirements(missing)));
        }

        let path = format!("/offerings/{}/publish", offering.id);
        self.post_action(&path, "Failed to initiate publication").await?;
        self.toasts.success(PUBLISH_STARTED);

        match self.watcher.watch(offering.id.clone(), on_published) {
            Ok(handle) => Ok(Some(handle)),
            Err(e) => {
                warn!(error = %e, "Publish watch not started");
                Ok(None)
            }
        }
    }

    async fn delete(&self, resource: CatalogResource, id: &EntityId) -> Result<(), CatalogActionError> {
        let path = resource.item_path(id);
        if let Err(e) = self.api.delete(&path).await {
            let fallback = format!("Failed to delete {}", resource.singular().to_lowercase());
            self.toasts.error(&failure_message(&e, &fallback));
            return Err(e.into());
        }
        info!(path, "Record deleted");
        self.toasts
            .success(&format!("{} deleted successfully!", resource.singular()));
        Ok(())
    }

    async fn post_action(&self, path: &str, fallback: &str) -> Result<(), CatalogActionError> {
        match self.api.send(HttpMethod::Post, path, &[], RequestBody::Empty).await {
            Ok(_) => Ok(()),
            Err(e) => {
                self.toasts.error(&failure_message(&e, fallback));
                Err(e.into())
            }
        }
    }

    fn reject(&self, error: CatalogError) -> CatalogActionError {
        warn!(reason = %error, "Catalog action refused");
        self.toasts.error(&error.to_string());
        error.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::SalesChannel;
    use crate::domain::ports::mocks::{MockTransport, RecordingToasts, RecordingWatcher};
    use serde_json::json;
    use test_case::test_case;

    struct Fixture {
        transport: Arc<MockTransport>,
        toasts: Arc<RecordingToasts>,
        watcher: Arc<RecordingWatcher>,
        service: CatalogService,
    }

    fn fixture() -> Fixture {
        let transport = Arc::new(MockTransport::new());
        let api = Arc::new(ApiClient::new(transport.clone()));
        let toasts = Arc::new(RecordingToasts::new());
        let watcher = Arc::new(RecordingWatcher::new());
        let service = CatalogService::new(api, toasts.clone(), watcher.clone());
        Fixture {
            transport,
            toasts,
            watcher,
            service,
        }
    }

    fn offering(status: LifecycleStatus) -> Offering {
        Offering {
            id: EntityId::from("o1"),
            name: "Fiber 500".to_string(),
            description: None,
            specification_ids: vec![EntityId::from("s1")],
            price_ids: vec![EntityId::from("p1")],
            sales_channels: vec![SalesChannel::Online],
            lifecycle_status: status,
            created_at: None,
            updated_at: None,
            published_at: None,
            retired_at: None,
        }
    }

    #[tokio::test]
    async fn test_list_offerings() {
        let f = fixture();
        f.transport.ok(
            HttpMethod::Get,
            "/offerings",
            json!([{"id": "o1", "name": "Fiber", "lifecycle_status": "PUBLISHED"}]),
        );

        let offerings = f.service.offerings().await.unwrap();

        assert_eq!(offerings.len(), 1);
        assert_eq!(offerings[0].lifecycle_status, LifecycleStatus::Published);
        assert!(f.toasts.is_empty());
    }

    #[tokio::test]
    async fn test_list_failure_toasts() {
        let f = fixture();
        f.transport.fail(HttpMethod::Get, "/prices", "connection refused");

        assert!(f.service.prices().await.is_err());
        assert_eq!(f.toasts.errors(), vec!["Failed to load pricing plans"]);
    }

    #[test_case(LifecycleStatus::Publishing ; "publishing")]
    #[test_case(LifecycleStatus::Published ; "published")]
    #[tokio::test]
    async fn test_live_offerings_cannot_be_deleted(status: LifecycleStatus) {
        let f = fixture();

        let err = f.service.delete_offering(&offering(status)).await.unwrap_err();

        assert_eq!(err, CatalogActionError::Rejected(CatalogError::NotDeletable(status)));
        assert!(f.transport.requests().is_empty());
        assert_eq!(f.toasts.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_retired_offering() {
        let f = fixture();
        f.transport.push_empty(HttpMethod::Delete, "/offerings/o1", 204);

        f.service
            .delete_offering(&offering(LifecycleStatus::Retired))
            .await
            .unwrap();

        assert_eq!(f.transport.requests_to(HttpMethod::Delete, "/offerings/o1").len(), 1);
        assert_eq!(f.toasts.successes(), vec!["Offering deleted successfully!"]);
    }

    #[tokio::test]
    async fn test_locked_price_cannot_be_deleted() {
        let f = fixture();
        let price: Price = serde_json::from_value(json!({
            "id": "p1", "name": "Basic", "value": "9.99", "unit": "per month",
            "currency": "USD", "locked": true
        }))
        .unwrap();

        let err = f.service.delete_price(&price).await.unwrap_err();

        assert_eq!(err, CatalogActionError::Rejected(CatalogError::PriceLocked));
        assert_eq!(
            f.toasts.errors(),
            vec!["Pricing plan is locked by a published offering"]
        );
        assert!(f.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_retire_requires_published() {
        let f = fixture();

        let err = f
            .service
            .retire(&offering(LifecycleStatus::Draft))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CatalogActionError::Rejected(CatalogError::NotRetirable(LifecycleStatus::Draft))
        ));
        assert!(f.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_retire_posts_action() {
        let f = fixture();
        f.transport.ok(HttpMethod::Post, "/offerings/o1/retire", json!({"status": "accepted"}));

        f.service
            .retire(&offering(LifecycleStatus::Published))
            .await
            .unwrap();

        assert_eq!(f.transport.requests_to(HttpMethod::Post, "/offerings/o1/retire").len(), 1);
        assert_eq!(f.toasts.successes(), vec!["\"Fiber 500\" retired"]);
    }

    #[tokio::test]
    async fn test_publish_draft_hands_off_to_watcher() {
        let f = fixture();
        f.transport.push_empty(HttpMethod::Post, "/offerings/o1/publish", 202);

        let handle = f
            .service
            .publish(&offering(LifecycleStatus::Draft), Box::new(|_| {}))
            .await
            .unwrap();

        assert!(handle.is_some());
        assert_eq!(f.watcher.watched(), vec![EntityId::from("o1")]);
        assert_eq!(f.toasts.successes(), vec![PUBLISH_STARTED]);
    }

    #[tokio::test]
    async fn test_publish_rejects_incomplete_draft() {
        let f = fixture();
        let mut draft = offering(LifecycleStatus::Draft);
        draft.sales_channels.clear();

        let err = f.service.publish(&draft, Box::new(|_| {})).await.unwrap_err();

        assert!(err.to_string().starts_with("Cannot publish"));
        assert!(err.to_string().contains("1 sales channel"));
        assert!(f.transport.requests().is_empty());
        assert!(f.watcher.watched().is_empty());
    }

    #[tokio::test]
    async fn test_publish_request_failure_skips_watcher() {
        let f = fixture();
        f.transport.respond(
            HttpMethod::Post,
            "/offerings/o1/publish",
            500,
            json!({"detail": "Saga orchestrator unavailable"}),
        );

        let err = f
            .service
            .publish(&offering(LifecycleStatus::Draft), Box::new(|_| {}))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogActionError::Request(ref e) if e.status == Some(500)));
        assert_eq!(f.toasts.errors(), vec!["Saga orchestrator unavailable"]);
        assert!(f.watcher.watched().is_empty());
    }
}

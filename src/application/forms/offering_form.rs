use tracing::{info, warn};

use super::{FormMode, SaveRequest, SelectOption, SubmitOutcome, failure_message, require, toggle_selection};
use crate::domain::entities::{
    EntityId, Offering, OfferingPayload, Price, SalesChannel, Specification,
    missing_publish_requirements,
};
use crate::domain::errors::{ApiError, CatalogError, ValidationErrors};
use crate::domain::ports::{HttpMethod, OnPublished, PublishWatcher, RequestBody, ToastPort, WatchHandle};
use crate::infrastructure::http::ApiClient;

const RESOURCE: &str = "offerings";

pub const PUBLISH_STARTED: &str = "Publication saga started! Check status in Viewer.";
const PUBLISH_PENDING: &str = "Initiating publication saga...";

/// Specifications and pricing plans an offering can reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferingOptions {
    pub specifications: Vec<Specification>,
    pub prices: Vec<Price>,
}

/// Save-then-publish submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishRequest {
    pub save: SaveRequest<OfferingPayload>,
}

/// Failure of a [`PublishRequest`]. `saved` is set when the record was stored but the
/// publish call failed.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishFailure {
    pub saved: Option<Offering>,
    pub error: ApiError,
}

impl PublishRequest {
    /// Saves the offering, then asks the backend to start publishing it.
    ///
    /// # Errors
    /// Returns [`PublishFailure`] for either failing step.
    pub async fn execute(&self, api: &ApiClient) -> Result<Offering, PublishFailure> {
        let saved: Offering = self
            .save
            .execute(api)
            .await
            .map_err(|error| PublishFailure { saved: None, error })?;

        let path = format!("/offerings/{}/publish", saved.id);
        match api.send(HttpMethod::Post, &path, &[], RequestBody::Empty).await {
            Ok(_) => Ok(saved),
            Err(error) => Err(PublishFailure {
                saved: Some(saved),
                error,
            }),
        }
    }
}

/// Result of a publish attempt from the form.
#[derive(Debug)]
pub enum PublishOutcome {
    /// Field validation failed; messages are on the form.
    Invalid,
    /// Rejected locally before any request.
    Rejected(String),
    Failed(String),
    /// The backend accepted the request. `watch` is `None` when the offering was
    /// already being watched.
    Started {
        offering: Offering,
        watch: Option<WatchHandle>,
    },
}

impl PublishOutcome {
    #[must_use]
    pub const fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

#[derive(Debug, Clone)]
pub struct OfferingForm {
    pub name: String,
    pub description: String,
    pub specification_ids: Vec<EntityId>,
    pub price_ids: Vec<EntityId>,
    pub sales_channels: Vec<SalesChannel>,
    specification_options: Vec<SelectOption>,
    price_options: Vec<SelectOption>,
    loading_options: bool,
    mode: FormMode,
    errors: ValidationErrors,
}

impl Default for OfferingForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            specification_ids: Vec::new(),
            price_ids: Vec::new(),
            sales_channels: vec![SalesChannel::Online],
            specification_options: Vec::new(),
            price_options: Vec::new(),
            loading_options: false,
            mode: FormMode::Create,
            errors: ValidationErrors::new(),
        }
    }
}

impl OfferingForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a draft for editing.
    ///
    /// # Errors
    /// Returns [`CatalogError::NotEditable`] unless the offering is a DRAFT.
    pub fn edit(offering: &Offering) -> Result<Self, CatalogError> {
        if !offering.is_editable() {
            return Err(CatalogError::NotEditable(offering.lifecycle_status));
        }
        Ok(Self {
            name: offering.name.clone(),
            description: offering.description.clone().unwrap_or_default(),
            specification_ids: offering.specification_ids.clone(),
            price_ids: offering.price_ids.clone(),
            sales_channels: offering.sales_channels.clone(),
            mode: FormMode::Edit(offering.id.clone()),
            ..Self::default()
        })
    }

    #[must_use]
    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    #[must_use]
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    #[must_use]
    pub fn specification_options(&self) -> &[SelectOption] {
        &self.specification_options
    }

    #[must_use]
    pub fn price_options(&self) -> &[SelectOption] {
        &self.price_options
    }

    #[must_use]
    pub fn is_loading_options(&self) -> bool {
        self.loading_options
    }

    pub fn toggle_specification(&mut self, id: &EntityId) {
        toggle_selection(&mut self.specification_ids, id);
    }

    pub fn toggle_price(&mut self, id: &EntityId) {
        toggle_selection(&mut self.price_ids, id);
    }

    pub fn toggle_channel(&mut self, channel: SalesChannel) {
        if let Some(pos) = self.sales_channels.iter().position(|c| *c == channel) {
            self.sales_channels.remove(pos);
        } else {
            self.sales_channels.push(channel);
        }
    }

    pub fn begin_options_refresh(&mut self) {
        self.loading_options = true;
    }

    /// Loads specifications and pricing plans concurrently.
    ///
    /// # Errors
    /// Returns the first request error.
    pub async fn fetch_options(api: &ApiClient) -> Result<OfferingOptions, ApiError> {
        let (specifications, prices) = tokio::try_join!(
            api.get::<Vec<Specification>>("/specifications", &[]),
            api.get::<Vec<Price>>("/prices", &[]),
        )?;
        Ok(OfferingOptions {
            specifications,
            prices,
        })
    }

    pub fn apply_options(&mut self, result: Result<OfferingOptions, ApiError>, toasts: &dyn ToastPort) {
        self.loading_options = false;
        match result {
            Ok(options) => {
                self.specification_options = options
                    .specifications
                    .into_iter()
                    .map(|s| SelectOption::new(s.id, s.name))
                    .collect();
                self.price_options = options
                    .prices
                    .into_iter()
                    .map(|p| {
                        let label = format!("{} ({})", p.name, p.display_amount());
                        SelectOption::new(p.id, label)
                    })
                    .collect();
            }
            Err(e) => {
                warn!(error = %e, "Failed to load offering dependencies");
                toasts.error("Failed to load dependencies");
            }
        }
    }

    pub async fn load_options(&mut self, api: &ApiClient, toasts: &dyn ToastPort) {
        self.begin_options_refresh();
        let result = Self::fetch_options(api).await;
        self.apply_options(result, toasts);
    }

    /// # Errors
    /// Returns the per-field messages when a field is invalid.
    pub fn validate(&self) -> Result<OfferingPayload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = require(&mut errors, "name", &self.name, "Name is required");
        let description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        errors.into_result(OfferingPayload {
            name,
            description,
            specification_ids: self.specification_ids.clone(),
            price_ids: self.price_ids.clone(),
            sales_channels: self.sales_channels.clone(),
        })
    }

    fn prepare_save(&mut self) -> Option<SaveRequest<OfferingPayload>> {
        match self.validate() {
            Ok(payload) => {
                self.errors.clear();
                Some(SaveRequest::new(self.mode.clone(), RESOURCE, payload))
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    /// Saving a draft has no requirements beyond a name.
    pub fn prepare_draft(&mut self) -> Option<SaveRequest<OfferingPayload>> {
        self.prepare_save()
    }

    pub fn complete_draft(
        &mut self,
        result: Result<Offering, ApiError>,
        toasts: &dyn ToastPort,
    ) -> SubmitOutcome<Offering> {
        match result {
            Ok(saved) => {
                info!(id = %saved.id, mode = self.mode.verb(), "Offering draft saved");
                toasts.success("Offering draft saved!");
                if !self.mode.is_edit() {
                    self.reset();
                }
                SubmitOutcome::Saved(saved)
            }
            Err(e) => {
                let message = failure_message(&e, "Failed to save draft");
                toasts.error(&message);
                SubmitOutcome::Failed(message)
            }
        }
    }

    pub async fn save_draft(&mut self, api: &ApiClient, toasts: &dyn ToastPort) -> SubmitOutcome<Offering> {
        let Some(request) = self.prepare_draft() else {
            return SubmitOutcome::Invalid;
        };
        let result = request.execute(api).await;
        self.complete_draft(result, toasts)
    }

    /// Checks fields and publish preconditions. A precondition failure is toasted and
    /// returned as `Err`; `Ok(None)` means field validation failed.
    ///
    /// # Errors
    /// Returns [`CatalogError::PublishRequirements`] naming what is missing.
    pub fn prepare_publish(&mut self, toasts: &dyn ToastPort) -> Result<Option<PublishRequest>, CatalogError> {
        let Some(save) = self.prepare_save() else {
            return Ok(None);
        };
        let missing = missing_publish_requirements(
            &save.payload.specification_ids,
            &save.payload.price_ids,
            &save.payload.sales_channels,
        );
        if !missing.is_empty() {
            let err = CatalogError::PublishRequirements(missing);
            toasts.error(&err.to_string());
            return Err(err);
        }
        toasts.info(PUBLISH_PENDING);
        Ok(Some(PublishRequest { save }))
    }

    /// Applies the publish result and hands an accepted offering to `watcher`.
    pub fn complete_publish(
        &mut self,
        result: Result<Offering, PublishFailure>,
        toasts: &dyn ToastPort,
        watcher: &dyn PublishWatcher,
        on_published: OnPublished,
    ) -> PublishOutcome {
        match result {
            Ok(offering) => {
                info!(id = %offering.id, "Publish request accepted");
                toasts.success(PUBLISH_STARTED);
                let watch = match watcher.watch(offering.id.clone(), on_published) {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        warn!(error = %e, "Publish watch not started");
                        None
                    }
                };
                self.reset();
                PublishOutcome::Started { offering, watch }
            }
            Err(PublishFailure { saved, error }) => {
                if let Some(saved) = saved {
                    // Record exists now; a retry must update it instead of creating another.
                    self.mode = FormMode::Edit(saved.id);
                }
                let message = failure_message(&error, "Failed to initiate publication");
                toasts.error(&message);
                PublishOutcome::Failed(message)
            }
        }
    }

    pub async fn publish(
        &mut self,
        api: &ApiClient,
        toasts: &dyn ToastPort,
        watcher: &dyn PublishWatcher,
        on_published: OnPublished,
    ) -> PublishOutcome {
        let request = match self.prepare_publish(toasts) {
            Ok(Some(request)) => request,
            Ok(None) => return PublishOutcome::Invalid,
            Err(e) => return PublishOutcome::Rejected(e.to_string()),
        };
        let result = request.execute(api).await;
        self.complete_publish(result, toasts, watcher, on_published)
    }

    /// Clears the inputs and keeps loaded options.
    fn reset(&mut self) {
        let specification_options = std::mem::take(&mut self.specification_options);
        let price_options = std::mem::take(&mut self.price_options);
        *self = Self {
            specification_options,
            price_options,
            ..Self::new()
        };
    }
}

use tracing::{info, warn};

use super::{FormMode, SaveRequest, SelectOption, SubmitOutcome, failure_message, require, toggle_selection};
use crate::domain::entities::{
    Characteristic, EntityId, Specification, SpecificationPayload, UnitOfMeasure,
};
use crate::domain::errors::{ApiError, ValidationErrors};
use crate::domain::ports::ToastPort;
use crate::infrastructure::http::ApiClient;

const RESOURCE: &str = "specifications";

#[derive(Debug, Clone, Default)]
pub struct SpecificationForm {
    pub name: String,
    pub characteristic_ids: Vec<EntityId>,
    options: Vec<SelectOption>,
    loading_options: bool,
    mode: FormMode,
    errors: ValidationErrors,
}

impl SpecificationForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn edit(specification: &Specification) -> Self {
        Self {
            name: specification.name.clone(),
            characteristic_ids: specification.characteristic_ids.clone(),
            mode: FormMode::Edit(specification.id.clone()),
            ..Self::default()
        }
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
    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    #[must_use]
    pub fn is_loading_options(&self) -> bool {
        self.loading_options
    }

    pub fn toggle_characteristic(&mut self, id: &EntityId) {
        toggle_selection(&mut self.characteristic_ids, id);
    }

    /// Marks options as loading; pair with [`SpecificationForm::fetch_options`].
    pub fn begin_options_refresh(&mut self) {
        self.loading_options = true;
    }

    /// Loads the selectable characteristics.
    ///
    /// # Errors
    /// Returns the request error.
    pub async fn fetch_options(api: &ApiClient) -> Result<Vec<Characteristic>, ApiError> {
        api.get("/characteristics", &[]).await
    }

    /// Applies fetched options. A failure only shows a toast; the form stays usable.
    pub fn apply_options(
        &mut self,
        result: Result<Vec<Characteristic>, ApiError>,
        toasts: &dyn ToastPort,
    ) {
        self.loading_options = false;
        match result {
            Ok(characteristics) => {
                self.options = characteristics
                    .into_iter()
                    .map(|c| {
                        let label = if c.unit_of_measure == UnitOfMeasure::None {
                            format!("{}: {}", c.name, c.value)
                        } else {
                            format!("{}: {} {}", c.name, c.value, c.unit_of_measure)
                        };
                        SelectOption::new(c.id, label)
                    })
                    .collect();
            }
            Err(e) => {
                warn!(error = %e, "Failed to load characteristics");
                toasts.error("Failed to load characteristics");
            }
        }
    }

    /// Fetches and applies options in one step.
    pub async fn load_options(&mut self, api: &ApiClient, toasts: &dyn ToastPort) {
        self.begin_options_refresh();
        let result = Self::fetch_options(api).await;
        self.apply_options(result, toasts);
    }

    /// # Errors
    /// Returns the per-field messages when a field is invalid.
    pub fn validate(&self) -> Result<SpecificationPayload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = require(&mut errors, "name", &self.name, "Name is required");
        if self.characteristic_ids.is_empty() {
            errors.add("characteristic_ids", "Select at least one characteristic");
        }
        errors.into_result(SpecificationPayload {
            name,
            characteristic_ids: self.characteristic_ids.clone(),
        })
    }

    pub fn prepare(&mut self) -> Option<SaveRequest<SpecificationPayload>> {
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

    pub fn complete(
        &mut self,
        result: Result<Specification, ApiError>,
        toasts: &dyn ToastPort,
    ) -> SubmitOutcome<Specification> {
        match result {
            Ok(saved) => {
                info!(id = %saved.id, mode = self.mode.verb(), "Specification saved");
                if self.mode.is_edit() {
                    toasts.success("Specification updated successfully!");
                } else {
                    toasts.success("Specification created successfully!");
                    self.name.clear();
                    self.characteristic_ids.clear();
                    self.errors.clear();
                }
                SubmitOutcome::Saved(saved)
            }
            Err(e) => {
                let fallback = format!("Failed to {} specification", self.mode.verb());
                let message = failure_message(&e, &fallback);
                toasts.error(&message);
                SubmitOutcome::Failed(message)
            }
        }
    }

    pub async fn submit(
        &mut self,
        api: &ApiClient,
        toasts: &dyn ToastPort,
    ) -> SubmitOutcome<Specification> {
        let Some(request) = self.prepare() else {
            return SubmitOutcome::Invalid;
        };
        let result = request.execute(api).await;
        self.complete(result, toasts)
    }
}

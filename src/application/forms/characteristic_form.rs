use tracing::info;

use super::{FormMode, SaveRequest, SubmitOutcome, failure_message, require};
use crate::domain::entities::{Characteristic, CharacteristicPayload, UnitOfMeasure};
use crate::domain::errors::{ApiError, ValidationErrors};
use crate::domain::ports::ToastPort;
use crate::infrastructure::http::ApiClient;

const RESOURCE: &str = "characteristics";

#[derive(Debug, Clone, Default)]
pub struct CharacteristicForm {
    pub name: String,
    pub value: String,
    pub unit_of_measure: UnitOfMeasure,
    mode: FormMode,
    errors: ValidationErrors,
}

impl CharacteristicForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn edit(characteristic: &Characteristic) -> Self {
        Self {
            name: characteristic.name.clone(),
            value: characteristic.value.clone(),
            unit_of_measure: characteristic.unit_of_measure,
            mode: FormMode::Edit(characteristic.id.clone()),
            errors: ValidationErrors::new(),
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

    /// # Errors
    /// Returns the per-field messages when a field is invalid.
    pub fn validate(&self) -> Result<CharacteristicPayload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = require(&mut errors, "name", &self.name, "Name is required");
        let value = require(&mut errors, "value", &self.value, "Value is required");
        errors.into_result(CharacteristicPayload {
            name,
            value,
            unit_of_measure: self.unit_of_measure,
        })
    }

    /// Validates and records the messages; `None` blocks submission.
    pub fn prepare(&mut self) -> Option<SaveRequest<CharacteristicPayload>> {
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
        result: Result<Characteristic, ApiError>,
        toasts: &dyn ToastPort,
    ) -> SubmitOutcome<Characteristic> {
        match result {
            Ok(saved) => {
                info!(id = %saved.id, mode = self.mode.verb(), "Characteristic saved");
                if self.mode.is_edit() {
                    toasts.success("Characteristic updated successfully!");
                } else {
                    toasts.success("Characteristic created successfully!");
                    *self = Self::new();
                }
                SubmitOutcome::Saved(saved)
            }
            Err(e) => {
                let fallback = format!("Failed to {} characteristic", self.mode.verb());
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
    ) -> SubmitOutcome<Characteristic> {
        let Some(request) = self.prepare() else {
            return SubmitOutcome::Invalid;
        };
        let result = request.execute(api).await;
        self.complete(result, toasts)
    }
}

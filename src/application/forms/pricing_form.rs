use tracing::info;

use super::{FormMode, SaveRequest, SubmitOutcome, failure_message, require};
use crate::domain::entities::{Currency, Price, PricePayload};
use crate::domain::errors::{ApiError, CatalogError, ValidationErrors};
use crate::domain::ports::ToastPort;
use crate::infrastructure::http::ApiClient;

const RESOURCE: &str = "prices";
const DEFAULT_UNIT: &str = "per month";

/// Pricing plan form. `value` is the raw text of the amount input.
#[derive(Debug, Clone)]
pub struct PricingForm {
    pub name: String,
    pub value: String,
    pub unit: String,
    pub currency: Currency,
    mode: FormMode,
    errors: ValidationErrors,
}

impl Default for PricingForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            value: String::new(),
            unit: DEFAULT_UNIT.to_string(),
            currency: Currency::Usd,
            mode: FormMode::Create,
            errors: ValidationErrors::new(),
        }
    }
}

impl PricingForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an existing plan for editing.
    ///
    /// # Errors
    /// Returns [`CatalogError::PriceLocked`] for plans locked by a published offering.
    pub fn edit(price: &Price) -> Result<Self, CatalogError> {
        if !price.is_editable() {
            return Err(CatalogError::PriceLocked);
        }
        Ok(Self {
            name: price.name.clone(),
            value: price.value.to_string(),
            unit: price.unit.clone(),
            currency: price.currency,
            mode: FormMode::Edit(price.id.clone()),
            errors: ValidationErrors::new(),
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

    /// # Errors
    /// Returns the per-field messages when a field is invalid.
    pub fn validate(&self) -> Result<PricePayload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = require(&mut errors, "name", &self.name, "Name is required");
        let value = match self.value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => v,
            Ok(_) => {
                errors.add("value", "Price must be positive");
                0.0
            }
            Err(_) => {
                errors.add("value", "Price must be a number");
                0.0
            }
        };
        let unit = require(&mut errors, "unit", &self.unit, "Unit is required");
        errors.into_result(PricePayload {
            name,
            value,
            unit,
            currency: self.currency,
        })
    }

    pub fn prepare(&mut self) -> Option<SaveRequest<PricePayload>> {
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

    pub fn complete(&mut self, result: Result<Price, ApiError>, toasts: &dyn ToastPort) -> SubmitOutcome<Price> {
        match result {
            Ok(saved) => {
                info!(id = %saved.id, mode = self.mode.verb(), "Pricing plan saved");
                if self.mode.is_edit() {
                    toasts.success("Pricing plan updated successfully!");
                } else {
                    toasts.success("Pricing plan created successfully!");
                    *self = Self::new();
                }
                SubmitOutcome::Saved(saved)
            }
            Err(e) => {
                let fallback = format!("Failed to {} pricing", self.mode.verb());
                let message = failure_message(&e, &fallback);
                toasts.error(&message);
                SubmitOutcome::Failed(message)
            }
        }
    }

    pub async fn submit(&mut self, api: &ApiClient, toasts: &dyn ToastPort) -> SubmitOutcome<Price> {
        let Some(request) = self.prepare() else {
            return SubmitOutcome::Invalid;
        };
        let result = request.execute(api).await;
        self.complete(result, toasts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EntityId;
    use crate::domain::ports::HttpMethod;
    use crate::domain::ports::mocks::{MockTransport, RecordingToasts};
    use serde_json::json;
    use std::sync::Arc;
    use test_case::test_case;

    fn price(locked: bool) -> Price {
        Price {
            id: EntityId::from("p1"),
            name: "Monthly".to_string(),
            value: 29.99,
            unit: "per month".to_string(),
            currency: Currency::Eur,
            locked,
            locked_by_saga_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test_case("-5" => Some("Price must be positive".to_string()) ; "negative")]
    #[test_case("0" => Some("Price must be positive".to_string()) ; "zero")]
    #[test_case("abc" => Some("Price must be a number".to_string()) ; "not a number")]
    #[test_case("" => Some("Price must be a number".to_string()) ; "empty")]
    #[test_case("19.99" => None ; "valid")]
    fn test_value_validation(value: &str) -> Option<String> {
        let form = PricingForm {
            name: "Basic".to_string(),
            value: value.to_string(),
            ..PricingForm::new()
        };
        form.validate()
            .err()
            .and_then(|errors| errors.get("value").map(str::to_string))
    }

    #[test]
    fn test_defaults() {
        let form = PricingForm::new();
        assert_eq!(form.unit, "per month");
        assert_eq!(form.currency, Currency::Usd);
    }

    #[tokio::test]
    async fn test_negative_price_blocks_submission() {
        let transport = Arc::new(MockTransport::new());
        let api = ApiClient::new(transport.clone());
        let toasts = RecordingToasts::new();
        let mut form = PricingForm::new();
        form.name = "Basic".to_string();
        form.value = "-5".to_string();

        assert_eq!(form.submit(&api, &toasts).await, SubmitOutcome::Invalid);
        assert_eq!(form.errors().get("value"), Some("Price must be positive"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_existing_plan() {
        let transport = Arc::new(MockTransport::new());
        let api = ApiClient::new(transport.clone());
        let toasts = RecordingToasts::new();
        transport.ok(
            HttpMethod::Put,
            "/prices/p1",
            json!({"id": "p1", "name": "Monthly", "value": "24.99", "unit": "per month", "currency": "EUR"}),
        );
        let mut form = PricingForm::edit(&price(false)).unwrap();
        form.value = "24.99".to_string();

        let outcome = form.submit(&api, &toasts).await;

        assert!(outcome.is_saved());
        let puts = transport.requests_to(HttpMethod::Put, "/prices/p1");
        assert_eq!(
            puts[0].json(),
            Some(&json!({"name": "Monthly", "value": 24.99, "unit": "per month", "currency": "EUR"}))
        );
        assert_eq!(toasts.successes(), vec!["Pricing plan updated successfully!"]);
    }

    #[test]
    fn test_locked_plan_cannot_be_edited() {
        let err = PricingForm::edit(&price(true)).unwrap_err();
        assert_eq!(err.to_string(), "Pricing plan is locked by a published offering");
    }
}

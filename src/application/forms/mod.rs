//! Entity forms: local validation, then create (POST) or update (PUT).
//!
//! Each form works in three steps so the UI can run the request on another task:
//! `prepare` validates and builds a [`SaveRequest`], the request is executed, and
//! `complete` applies the result and shows the toast. `submit` chains all three.

mod characteristic_form;
mod offering_form;
mod pricing_form;
mod specification_form;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::entities::EntityId;
use crate::domain::errors::{ApiError, ValidationErrors};
use crate::infrastructure::http::ApiClient;

pub use characteristic_form::CharacteristicForm;
pub use offering_form::{
    OfferingForm, OfferingOptions, PUBLISH_STARTED, PublishFailure, PublishOutcome, PublishRequest,
};
pub use pricing_form::PricingForm;
pub use specification_form::SpecificationForm;

/// Create or edit, chosen by whether the form was opened with an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Create,
    Edit(EntityId),
}

impl FormMode {
    #[must_use]
    pub const fn is_edit(&self) -> bool {
        matches!(self, Self::Edit(_))
    }

    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit(_) => "update",
        }
    }
}

/// A validated submission, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest<P> {
    pub mode: FormMode,
    pub resource: &'static str,
    pub payload: P,
}

impl<P: Serialize> SaveRequest<P> {
    #[must_use]
    pub fn new(mode: FormMode, resource: &'static str, payload: P) -> Self {
        Self {
            mode,
            resource,
            payload,
        }
    }

    /// `/<resource>` when creating, `/<resource>/{id}` when editing.
    #[must_use]
    pub fn path(&self) -> String {
        match &self.mode {
            FormMode::Create => format!("/{}", self.resource),
            FormMode::Edit(id) => format!("/{}/{id}", self.resource),
        }
    }

    /// # Errors
    /// Returns the request error unchanged.
    pub async fn execute<T: DeserializeOwned>(&self, api: &ApiClient) -> Result<T, ApiError> {
        let path = self.path();
        debug!(path, mode = self.mode.verb(), "Submitting form");
        match self.mode {
            FormMode::Create => api.post(&path, &self.payload).await,
            FormMode::Edit(_) => api.put(&path, &self.payload).await,
        }
    }
}

/// Result of a form submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    /// Validation failed; messages are on the form.
    Invalid,
    Saved(T),
    /// The backend or transport failed with this message.
    Failed(String),
}

impl<T> SubmitOutcome<T> {
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

/// Selectable entry of a multi-select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub id: EntityId,
    pub label: String,
}

impl SelectOption {
    #[must_use]
    pub fn new(id: EntityId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// Adds `toggle`d ids to or removes them from a selection, keeping insertion order.
pub fn toggle_selection(selection: &mut Vec<EntityId>, id: &EntityId) {
    if let Some(pos) = selection.iter().position(|s| s == id) {
        selection.remove(pos);
    } else {
        selection.push(id.clone());
    }
}

/// Trims `value`, recording `message` when it is empty.
fn require(errors: &mut ValidationErrors, field: &'static str, value: &str, message: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, message);
    }
    trimmed.to_string()
}

/// Message for a failed request: the backend's, or the fallback.
pub(crate) fn failure_message(error: &ApiError, fallback: &str) -> String {
    if error.message.trim().is_empty() {
        fallback.to_string()
    } else {
        error.message.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paths_follow_mode() {
        let create = SaveRequest::new(FormMode::Create, "prices", json!({}));
        let edit = SaveRequest::new(FormMode::Edit(EntityId::from("p1")), "prices", json!({}));
        assert_eq!(create.path(), "/prices");
        assert_eq!(edit.path(), "/prices/p1");
    }

    #[test]
    fn test_toggle_selection() {
        let mut selection = vec![EntityId::from("a")];
        toggle_selection(&mut selection, &EntityId::from("b"));
        toggle_selection(&mut selection, &EntityId::from("a"));
        assert_eq!(selection, vec![EntityId::from("b")]);
    }

    #[test]
    fn test_failure_message_fallback() {
        let blank = ApiError::with_status(500, " ");
        assert_eq!(failure_message(&blank, "Failed to save draft"), "Failed to save draft");
        let detailed = ApiError::with_status(409, "Name taken");
        assert_eq!(failure_message(&detailed, "Failed to save draft"), "Name taken");
    }
}

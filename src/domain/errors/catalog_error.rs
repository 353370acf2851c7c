//! Local business-rule rejections.

use thiserror::Error;

use super::ApiError;
use crate::domain::entities::{LifecycleStatus, PublishRequirement};

/// Catalog action rejected before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum CatalogError {
    #[error("Cannot publish: Needs at least {}.", join_requirements(.0))]
    PublishRequirements(Vec<PublishRequirement>),

    #[error("Cannot publish: offering is {0}, only DRAFT offerings can be published.")]
    NotPublishable(LifecycleStatus),

    #[error("Cannot retire: offering is {0}, only PUBLISHED offerings can be retired.")]
    NotRetirable(LifecycleStatus),

    #[error("Cannot delete: offering is {0}. Retire it first.")]
    NotDeletable(LifecycleStatus),

    #[error("Cannot edit: offering is {0}, only DRAFT offerings can be edited.")]
    NotEditable(LifecycleStatus),

    #[error("Pricing plan is locked by a published offering")]
    PriceLocked,
}

/// Table action failure: refused locally or failed at the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogActionError {
    #[error(transparent)]
    Rejected(#[from] CatalogError),

    #[error(transparent)]
    Request(#[from] ApiError),
}

fn join_requirements(missing: &[PublishRequirement]) -> String {
    let labels: Vec<&str> = missing.iter().map(|r| r.label()).collect();
    match labels.as_slice() {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

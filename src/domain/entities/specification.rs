//! Specification entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EntityId;

/// Named bundle of characteristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub characteristic_ids: Vec<EntityId>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::domain::serde_utils::optional_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::domain::serde_utils::optional_timestamp"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create/update body for `/specifications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationPayload {
    pub name: String,
    pub characteristic_ids: Vec<EntityId>,
}

//! Product offering entity and its lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EntityId;

/// Publication state of an offering, recorded by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LifecycleStatus {
    #[default]
    Draft,
    Publishing,
    Published,
    Retired,
}

impl LifecycleStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Publishing => "PUBLISHING",
            Self::Published => "PUBLISHED",
            Self::Retired => "RETIRED",
        }
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel through which an offering is sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SalesChannel {
    Online,
    Retail,
    Partner,
}

impl SalesChannel {
    pub const ALL: [Self; 3] = [Self::Online, Self::Retail, Self::Partner];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::Retail => "Retail",
            Self::Partner => "Partner",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl std::fmt::Display for SalesChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requirement missing for an offering to be publishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishRequirement {
    Specification,
    Price,
    SalesChannel,
}

impl PublishRequirement {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Specification => "1 specification",
            Self::Price => "1 price",
            Self::SalesChannel => "1 sales channel",
        }
    }
}

/// Returns the requirements that a set of selections fails, in a fixed order.
#[must_use]
pub fn missing_publish_requirements(
    specification_ids: &[EntityId],
    price_ids: &[EntityId],
    sales_channels: &[SalesChannel],
) -> Vec<PublishRequirement> {
    let mut missing = Vec::new();
    if specification_ids.is_empty() {
        missing.push(PublishRequirement::Specification);
    }
    if price_ids.is_empty() {
        missing.push(PublishRequirement::Price);
    }
    if sales_channels.is_empty() {
        missing.push(PublishRequirement::SalesChannel);
    }
    missing
}

/// Sellable bundle of specifications and prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub specification_ids: Vec<EntityId>,
    #[serde(default, alias = "pricing_ids")]
    pub price_ids: Vec<EntityId>,
    #[serde(default)]
    pub sales_channels: Vec<SalesChannel>,
    #[serde(default)]
    pub lifecycle_status: LifecycleStatus,
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
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::domain::serde_utils::optional_timestamp"
    )]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::domain::serde_utils::optional_timestamp"
    )]
    pub retired_at: Option<DateTime<Utc>>,
}

impl Offering {
    /// Requirements this offering still fails for publication.
    #[must_use]
    pub fn missing_requirements(&self) -> Vec<PublishRequirement> {
        missing_publish_requirements(
            &self.specification_ids,
            &self.price_ids,
            &self.sales_channels,
        )
    }

    /// Publish is only permitted from DRAFT with every requirement met.
    #[must_use]
    pub fn can_publish(&self) -> bool {
        self.lifecycle_status == LifecycleStatus::Draft && self.missing_requirements().is_empty()
    }

    /// Retire is only permitted from PUBLISHED.
    #[must_use]
    pub fn can_retire(&self) -> bool {
        self.lifecycle_status == LifecycleStatus::Published
    }

    /// Draft and retired offerings are not referenced by a live publication.
    #[must_use]
    pub fn can_delete(&self) -> bool {
        matches!(
            self.lifecycle_status,
            LifecycleStatus::Draft | LifecycleStatus::Retired
        )
    }

    /// Only drafts may be edited.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.lifecycle_status == LifecycleStatus::Draft
    }
}

/// Create/update body for `/offerings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferingPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub specification_ids: Vec<EntityId>,
    pub price_ids: Vec<EntityId>,
    pub sales_channels: Vec<SalesChannel>,
}

//! Pricing plan entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EntityId;

/// Currency of a pricing plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Try,
}

impl Currency {
    pub const ALL: [Self; 3] = [Self::Usd, Self::Eur, Self::Try];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Try => "TRY",
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Usd => Self::Eur,
            Self::Eur => Self::Try,
            Self::Try => Self::Usd,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monetary plan attachable to an offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub id: EntityId,
    pub name: String,
    #[serde(with = "crate::domain::serde_utils::decimal_to_f64")]
    pub value: f64,
    pub unit: String,
    pub currency: Currency,
    /// Set by the backend while a published offering references this plan.
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_by_saga_id: Option<String>,
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

impl Price {
    /// Locked plans are read-only in the console.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        !self.locked
    }

    /// Formats the amount as `12.50 USD / per month`.
    #[must_use]
    pub fn display_amount(&self) -> String {
        format!("{:.2} {} / {}", self.value, self.currency, self.unit)
    }
}

/// Create/update body for `/prices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePayload {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub currency: Currency,
}

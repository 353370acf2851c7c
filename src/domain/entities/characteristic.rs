//! Characteristic entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EntityId;

/// Unit attached to a characteristic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    Mbps,
    #[serde(rename = "GB")]
    Gb,
    #[serde(rename = "GHz")]
    Ghz,
    Volt,
    Watt,
    Meter,
    #[default]
    None,
}

impl UnitOfMeasure {
    /// Every unit, in selection order.
    pub const ALL: [Self; 7] = [
        Self::Mbps,
        Self::Gb,
        Self::Ghz,
        Self::Volt,
        Self::Watt,
        Self::Meter,
        Self::None,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mbps => "Mbps",
            Self::Gb => "GB",
            Self::Ghz => "GHz",
            Self::Volt => "Volt",
            Self::Watt => "Watt",
            Self::Meter => "Meter",
            Self::None => "None",
        }
    }

    /// Returns the unit after this one, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|u| *u == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic named attribute with a value and unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Characteristic {
    pub id: EntityId,
    pub name: String,
    pub value: String,
    pub unit_of_measure: UnitOfMeasure,
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

/// Create/update body for `/characteristics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacteristicPayload {
    pub name: String,
    pub value: String,
    pub unit_of_measure: UnitOfMeasure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_wire_names() {
        let names: Vec<String> = UnitOfMeasure::ALL
            .iter()
            .map(|u| serde_json::to_value(u).unwrap().as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["Mbps", "GB", "GHz", "Volt", "Watt", "Meter", "None"]);
    }

    #[test]
    fn test_unit_cycles() {
        assert_eq!(UnitOfMeasure::None.next(), UnitOfMeasure::Mbps);
        assert_eq!(UnitOfMeasure::Mbps.next(), UnitOfMeasure::Gb);
    }

    #[test]
    fn test_parse_backend_record() {
        let json = r#"{
            "id": "c1",
            "name": "Download Speed",
            "value": "500",
            "unit_of_measure": "Mbps",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        }"#;
        let characteristic: Characteristic = serde_json::from_str(json).unwrap();
        assert_eq!(characteristic.id.as_str(), "c1");
        assert_eq!(characteristic.unit_of_measure, UnitOfMeasure::Mbps);
    }
}

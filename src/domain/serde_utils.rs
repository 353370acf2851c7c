//! Serde utilities for catalog payloads.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

/// Module to handle monetary amounts that the backend serializes either as JSON numbers or as
/// decimal strings (`"19.99"`).
pub mod decimal_to_f64 {
    use super::{Deserializer, Serializer, Visitor, de, fmt};

    /// Serializes the amount as a JSON number.
    ///
    /// # Errors
    ///
    /// Returns an error if the serializer fails.
    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(*value)
    }

    /// Deserializes an amount from a number or a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither, or if the string is not a number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DecimalVisitor;

        impl Visitor<'_> for DecimalVisitor {
            type Value = f64;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a number or a decimal string")
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value)
            }

            #[allow(clippy::cast_precision_loss)]
            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value as f64)
            }

            #[allow(clippy::cast_precision_loss)]
            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value as f64)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.trim().parse::<f64>().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(DecimalVisitor)
    }
}

/// Module to handle optional timestamps that may lack a UTC offset. Offset-less values are
/// read as UTC.
pub mod optional_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes the timestamp as RFC 3339, or `null`.
    ///
    /// # Errors
    ///
    /// Returns an error if the serializer fails.
    #[allow(clippy::ref_option)]
    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(timestamp) => serializer.serialize_str(&timestamp.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an RFC 3339 or offset-less ISO 8601 timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a timestamp.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(Some(timestamp.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Some(naive.and_utc()))
            .map_err(serde::de::Error::custom)
    }
}

//! Field-level validation errors.

use std::collections::BTreeMap;

use thiserror::Error;

/// Per-field validation messages, rendered inline next to each input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", self.summary())]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for a field; the first message per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Iterates `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// Converts into a `Result`, failing when any field has a message.
    ///
    /// # Errors
    /// Returns `self` when it is not empty.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    fn summary(&self) -> String {
        self.fields
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

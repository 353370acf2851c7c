//! Store search filters and their query-string form.

use url::form_urlencoded;

/// Filter state shared by the filter panel, the store location and `/store/search`.
///
/// Field names double as query parameter names. `characteristic` entries use the
/// `name:value` form and are repeated once per value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub q: String,
    pub min_price: String,
    pub max_price: String,
    pub channel: String,
    pub characteristic: Vec<String>,
}

impl FilterState {
    /// Returns true when no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }

    /// Non-empty filters as `(name, value)` pairs in canonical order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in [
            ("q", &self.q),
            ("min_price", &self.min_price),
            ("max_price", &self.max_price),
            ("channel", &self.channel),
        ] {
            let value = value.trim();
            if !value.is_empty() {
                pairs.push((key.to_string(), value.to_string()));
            }
        }
        for characteristic in &self.characteristic {
            if !characteristic.trim().is_empty() {
                pairs.push(("characteristic".to_string(), characteristic.trim().to_string()));
            }
        }
        pairs
    }

    /// Query parameters for a search page.
    #[must_use]
    pub fn search_params(&self, skip: usize, limit: usize) -> Vec<(String, String)> {
        let mut params = vec![
            ("skip".to_string(), skip.to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        params.extend(self.pairs());
        params
    }

    /// Encodes the filters as a URL query string (without the leading `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }

    /// Decodes filters from a query string, ignoring unknown keys and a leading `?`.
    #[must_use]
    pub fn from_query_string(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let mut filters = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "q" => filters.q = value.into_owned(),
                "min_price" => filters.min_price = value.into_owned(),
                "max_price" => filters.max_price = value.into_owned(),
                "channel" => filters.channel = value.into_owned(),
                "characteristic" => filters.characteristic.push(value.into_owned()),
                _ => {}
            }
        }

        filters
    }
}

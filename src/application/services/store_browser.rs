//! Public store browsing: filters, paged search results and location history.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::entities::{SearchPage, StoreOffering};
use crate::domain::errors::ApiError;
use crate::domain::ports::ToastPort;
use crate::domain::search::FilterState;
use crate::infrastructure::http::ApiClient;

pub const STORE_PAGE_SIZE: usize = 12;
pub const SEARCH_PATH: &str = "/store/search";
pub const ERROR_TITLE: &str = "Oops! Something went wrong";
pub const ERROR_MESSAGE: &str = "Failed to load product offerings. Please try again later.";
pub const CONNECTION_TOAST: &str = "Could not connect to the store service.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Filters changed: results are replaced and `skip` restarts at 0.
    Replace,
    /// "Load more": results are appended.
    Append,
}

/// One issued search. Completing a ticket whose generation is no longer current is a no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    pub generation: u64,
    pub mode: FetchMode,
    pub filters: FilterState,
    pub skip: usize,
    pub limit: usize,
}

impl SearchTicket {
    #[must_use]
    pub fn params(&self) -> Vec<(String, String)> {
        self.filters.search_params(self.skip, self.limit)
    }
}

/// Back/forward over applied filter locations.
#[derive(Debug, Clone, Default)]
pub struct LocationHistory {
    entries: Vec<String>,
    index: usize,
}

impl LocationHistory {
    #[must_use]
    pub fn new(initial: String) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    #[must_use]
    pub fn current(&self) -> &str {
        self.entries.get(self.index).map_or("", String::as_str)
    }

    /// Records a location, dropping any forward entries. Repeating the current one is a no-op.
    pub fn push(&mut self, location: String) {
        if self.current() == location {
            return;
        }
        self.entries.truncate(self.index + 1);
        self.entries.push(location);
        self.index = self.entries.len() - 1;
    }

    pub fn back(&mut self) -> Option<&str> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&str> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }
}

#[derive(Debug)]
pub struct StoreBrowser {
    filters: FilterState,
    items: Vec<StoreOffering>,
    total: u64,
    skip: usize,
    limit: usize,
    loading: bool,
    error: Option<String>,
    generation: u64,
    history: LocationHistory,
    selected: usize,
}

impl StoreBrowser {
    #[must_use]
    pub fn new(filters: FilterState, limit: usize) -> Self {
        Self {
            history: LocationHistory::new(filters.to_query_string()),
            filters,
            items: Vec::new(),
            total: 0,
            skip: 0,
            limit: limit.max(1),
            loading: false,
            error: None,
            generation: 0,
            selected: 0,
        }
    }

    /// Restores filters from a location query string such as `q=Fiber&channel=Online`.
    #[must_use]
    pub fn from_location(location: &str, limit: usize) -> Self {
        Self::new(FilterState::from_query_string(location), limit)
    }

    fn issue(&mut self, mode: FetchMode, skip: usize) -> SearchTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        let ticket = SearchTicket {
            generation: self.generation,
            mode,
            filters: self.filters.clone(),
            skip,
            limit: self.limit,
        };
        debug!(generation = ticket.generation, ?mode, skip, "Store search issued");
        ticket
    }

    /// Searches with the current filters from the first page.
    pub fn refresh(&mut self) -> SearchTicket {
        self.issue(FetchMode::Replace, 0)
    }

    /// Re-runs the last filter search after a failure.
    pub fn retry(&mut self) -> SearchTicket {
        self.refresh()
    }

    /// Applies new filters, records the location and restarts from the first page.
    pub fn apply_filters(&mut self, filters: FilterState) -> SearchTicket {
        self.filters = filters;
        self.history.push(self.filters.to_query_string());
        self.refresh()
    }

    /// Requests the next page, unless a search is running or everything is shown.
    pub fn load_more(&mut self) -> Option<SearchTicket> {
        if self.loading || !self.has_more() {
            return None;
        }
        let skip = self.skip + self.limit;
        Some(self.issue(FetchMode::Append, skip))
    }

    pub fn back(&mut self) -> Option<SearchTicket> {
        let location = self.history.back()?.to_string();
        self.filters = FilterState::from_query_string(&location);
        Some(self.refresh())
    }

    pub fn forward(&mut self) -> Option<SearchTicket> {
        let location = self.history.forward()?.to_string();
        self.filters = FilterState::from_query_string(&location);
        Some(self.refresh())
    }

    /// Applies a search result. Returns `false` when the ticket was superseded.
    pub fn complete(&mut self, ticket: &SearchTicket, result: Result<SearchPage, ApiError>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "Discarding stale store response"
            );
            return false;
        }
        self.loading = false;

        match result {
            Ok(page) => {
                match ticket.mode {
                    FetchMode::Replace => {
                        self.items = page.items;
                        self.skip = 0;
                        self.selected = 0;
                    }
                    FetchMode::Append => {
                        self.items.extend(page.items);
                        self.skip = ticket.skip;
                    }
                }
                self.total = page.total;
            }
            Err(e) => {
                warn!(error = %e, mode = ?ticket.mode, "Store search failed");
                if ticket.mode == FetchMode::Replace {
                    self.items.clear();
                    self.total = 0;
                    self.skip = 0;
                    self.selected = 0;
                }
                self.error = Some(ERROR_MESSAGE.to_string());
            }
        }
        true
    }

    #[must_use]
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Current location query string.
    #[must_use]
    pub fn location(&self) -> &str {
        self.history.current()
    }

    #[must_use]
    pub fn history(&self) -> &LocationHistory {
        &self.history
    }

    #[must_use]
    pub fn items(&self) -> &[StoreOffering] {
        &self.items
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn skip(&self) -> usize {
        self.skip
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        (self.items.len() as u64) < self.total
    }

    #[must_use]
    pub fn shows_empty_state(&self) -> bool {
        !self.loading && self.error.is_none() && self.items.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> String {
        if self.loading {
            "Updating...".to_string()
        } else {
            format!("Showing {} of {} results", self.items.len(), self.total)
        }
    }

    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn selected(&self) -> Option<&StoreOffering> {
        self.items.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1).min(self.items.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

/// Runs store searches and reports failures as toasts.
#[derive(Clone)]
pub struct StoreSearchService {
    api: Arc<ApiClient>,
    toasts: Arc<dyn ToastPort>,
}

impl StoreSearchService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>, toasts: Arc<dyn ToastPort>) -> Self {
        Self { api, toasts }
    }

    /// # Errors
    /// Returns the request error after showing the connection toast.
    pub async fn search(&self, ticket: &SearchTicket) -> Result<SearchPage, ApiError> {
        let result = self.api.get::<SearchPage>(SEARCH_PATH, &ticket.params()).await;
        match &result {
            Ok(page) => debug!(
                generation = ticket.generation,
                total = page.total,
                received = page.items.len(),
                "Store search completed"
            ),
            Err(_) => self.toasts.error(CONNECTION_TOAST),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::debouncer::{DEFAULT_DEBOUNCE, Debouncer};
    use crate::domain::ports::HttpMethod;
    use crate::domain::ports::mocks::{MockTransport, RecordingToasts};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn item(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "sales_channels": ["Online"],
            "pricing": [{"name": "Monthly", "value": "29.99", "currency": "USD", "unit": "per month"}],
            "specifications": []
        })
    }

    fn page(total: u64, names: &[&str]) -> SearchPage {
        let items: Vec<Value> = names.iter().map(|n| item(n, n)).collect();
        serde_json::from_value(json!({"total": total, "items": items})).unwrap()
    }

    fn names(browser: &StoreBrowser) -> Vec<String> {
        browser.items().iter().map(|i| i.name.clone()).collect()
    }

    #[test]
    fn test_load_more_appends_and_advances_skip() {
        let mut browser = StoreBrowser::new(FilterState::default(), 2);
        let ticket = browser.refresh();
        assert!(browser.complete(&ticket, Ok(page(3, &["A", "B"]))));
        assert!(browser.has_more());

        let more = browser.load_more().unwrap();
        assert_eq!(more.skip, 2);
        assert_eq!(more.mode, FetchMode::Append);
        browser.complete(&more, Ok(page(3, &["C"])));

        assert_eq!(names(&browser), vec!["A", "B", "C"]);
        assert_eq!(browser.skip(), 2);
        assert!(!browser.has_more());
        assert!(browser.load_more().is_none());
        assert_eq!(browser.summary(), "Showing 3 of 3 results");
    }

    #[test]
    fn test_filter_change_replaces_and_resets_skip() {
        let mut browser = StoreBrowser::new(FilterState::default(), 2);
        let ticket = browser.refresh();
        browser.complete(&ticket, Ok(page(4, &["A", "B"])));
        let more = browser.load_more().unwrap();
        browser.complete(&more, Ok(page(4, &["C", "D"])));

        let filters = FilterState {
            q: "Fiber".to_string(),
            ..FilterState::default()
        };
        let ticket = browser.apply_filters(filters);
        assert_eq!(ticket.skip, 0);
        assert_eq!(ticket.mode, FetchMode::Replace);
        browser.complete(&ticket, Ok(page(1, &["Fiber 500"])));

        assert_eq!(names(&browser), vec!["Fiber 500"]);
        assert_eq!(browser.skip(), 0);
        assert_eq!(browser.location(), "q=Fiber");
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut browser = StoreBrowser::new(FilterState::default(), 12);
        let first = browser.apply_filters(FilterState {
            q: "Fi".to_string(),
            ..FilterState::default()
        });
        let second = browser.apply_filters(FilterState {
            q: "Fiber".to_string(),
            ..FilterState::default()
        });

        assert!(browser.complete(&second, Ok(page(1, &["Fiber 500"]))));
        assert!(!browser.complete(&first, Ok(page(2, &["Fiji", "Fiber 500"]))));

        assert_eq!(names(&browser), vec!["Fiber 500"]);
        assert_eq!(browser.total(), 1);
    }

    #[test]
    fn test_failed_append_keeps_results() {
        let mut browser = StoreBrowser::new(FilterState::default(), 2);
        let ticket = browser.refresh();
        browser.complete(&ticket, Ok(page(5, &["A", "B"])));

        let more = browser.load_more().unwrap();
        browser.complete(&more, Err(ApiError::network("refused")));

        assert_eq!(names(&browser), vec!["A", "B"]);
        assert_eq!(browser.error(), Some(ERROR_MESSAGE));
    }

    #[test]
    fn test_failed_filter_search_clears_results() {
        let mut browser = StoreBrowser::new(FilterState::default(), 2);
        let ticket = browser.refresh();
        browser.complete(&ticket, Ok(page(5, &["A", "B"])));

        let ticket = browser.apply_filters(FilterState {
            channel: "Retail".to_string(),
            ..FilterState::default()
        });
        browser.complete(&ticket, Err(ApiError::network("refused")));

        assert!(browser.items().is_empty());
        assert!(browser.error().is_some());
        assert!(!browser.shows_empty_state());

        let retry = browser.retry();
        assert!(browser.error().is_none());
        assert_eq!(retry.filters.channel, "Retail");
    }

    #[test]
    fn test_history_back_and_forward() {
        let mut browser = StoreBrowser::from_location("q=Fiber", 12);
        assert_eq!(browser.filters().q, "Fiber");

        browser.apply_filters(FilterState {
            q: "Fiber".to_string(),
            channel: "Online".to_string(),
            ..FilterState::default()
        });
        assert_eq!(browser.location(), "q=Fiber&channel=Online");

        let ticket = browser.back().unwrap();
        assert_eq!(ticket.filters.channel, "");
        assert_eq!(browser.location(), "q=Fiber");
        assert!(browser.back().is_none());

        browser.forward().unwrap();
        assert_eq!(browser.filters().channel, "Online");
        assert!(browser.forward().is_none());
    }

    #[test]
    fn test_history_push_drops_forward_entries() {
        let mut history = LocationHistory::new(String::new());
        history.push("q=a".to_string());
        history.push("q=b".to_string());
        history.back();
        history.push("q=c".to_string());

        assert_eq!(history.current(), "q=c");
        assert!(!history.can_go_forward());
        assert_eq!(history.back(), Some("q=a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_search_scenario() {
        let transport = Arc::new(MockTransport::new());
        let toasts = Arc::new(RecordingToasts::new());
        let api = Arc::new(ApiClient::new(transport.clone()));
        let service = StoreSearchService::new(api, toasts.clone());
        transport.ok(
            HttpMethod::Get,
            SEARCH_PATH,
            json!({"total": 2, "items": [item("a", "Fiber 500"), item("b", "Mobile 10")]}),
        );

        let mut browser = StoreBrowser::from_location("", STORE_PAGE_SIZE);
        let ticket = browser.refresh();
        assert!(browser.is_loading());
        assert_eq!(browser.summary(), "Updating...");

        let result = service.search(&ticket).await;
        browser.complete(&ticket, result);
        assert_eq!(names(&browser), vec!["Fiber 500", "Mobile 10"]);
        assert_eq!(browser.summary(), "Showing 2 of 2 results");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(DEFAULT_DEBOUNCE, tx);
        let mut filters = browser.filters().clone();
        for typed in ["F", "Fi", "Fib", "Fibe", "Fiber"] {
            filters.q = typed.to_string();
            debouncer.call(filters.clone());
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        let settled = rx.recv().await.unwrap();
        let ticket = browser.apply_filters(settled);
        let result = service.search(&ticket).await;
        browser.complete(&ticket, result);

        assert!(browser.location().contains("q=Fiber"));
        let searches = transport.requests_to(HttpMethod::Get, SEARCH_PATH);
        assert_eq!(searches.len(), 2);
        assert_eq!(searches[1].query_value("q"), Some("Fiber"));
        assert_eq!(searches[1].query_value("skip"), Some("0"));
        assert_eq!(searches[1].query_value("limit"), Some("12"));
        assert!(toasts.is_empty());
    }

    #[tokio::test]
    async fn test_store_search_failure_scenario() {
        let transport = Arc::new(MockTransport::new());
        let toasts = Arc::new(RecordingToasts::new());
        let service = StoreSearchService::new(Arc::new(ApiClient::new(transport.clone())), toasts.clone());
        transport.respond(HttpMethod::Get, SEARCH_PATH, 500, json!({"detail": "boom"}));

        let mut browser = StoreBrowser::from_location("", STORE_PAGE_SIZE);
        let ticket = browser.refresh();
        let result = service.search(&ticket).await;
        browser.complete(&ticket, result);

        assert_eq!(browser.error(), Some(ERROR_MESSAGE));
        assert_eq!(toasts.errors(), vec![CONNECTION_TOAST]);
        assert!(!browser.is_loading());
    }
}

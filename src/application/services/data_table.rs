//! Searchable, sortable, paginated view over an in-memory record set.
//!
//! Every change re-runs filter, then sort, then pagination.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_PAGE_SIZE: usize = 10;

type Compute<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

enum Accessor<T> {
    Field(&'static str),
    Computed(Compute<T>),
}

/// Column descriptor: a label plus either a serialized field name or a computed cell.
pub struct Column<T> {
    label: String,
    accessor: Accessor<T>,
    sortable: bool,
    width: Option<u16>,
}

impl<T> Column<T> {
    /// Column reading a top-level field of the serialized record.
    #[must_use]
    pub fn field(label: impl Into<String>, key: &'static str) -> Self {
        Self {
            label: label.into(),
            accessor: Accessor::Field(key),
            sortable: false,
            width: None,
        }
    }

    /// Column rendered by a function of the record.
    #[must_use]
    pub fn computed(
        label: impl Into<String>,
        compute: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            accessor: Accessor::Computed(Box::new(compute)),
            sortable: false,
            width: None,
        }
    }

    #[must_use]
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Fixed width in cells; unset columns share the remainder.
    #[must_use]
    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    #[must_use]
    pub fn fixed_width(&self) -> Option<u16> {
        self.width
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Pagination control entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageButton {
    Page(usize),
    Ellipsis,
}

pub struct DataTable<T> {
    columns: Vec<Column<T>>,
    records: Vec<T>,
    serialized: Vec<Value>,
    view: Vec<usize>,
    search: String,
    sort: Option<(usize, SortDirection)>,
    page: usize,
    page_size: usize,
    loading: bool,
    empty_message: String,
    selected: usize,
}

impl<T: Serialize> DataTable<T> {
    #[must_use]
    pub fn new(columns: Vec<Column<T>>, page_size: usize) -> Self {
        Self {
            columns,
            records: Vec::new(),
            serialized: Vec::new(),
            view: Vec::new(),
            search: String::new(),
            sort: None,
            page: 1,
            page_size: page_size.max(1),
            loading: false,
            empty_message: "No data available".to_string(),
            selected: 0,
        }
    }

    #[must_use]
    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    /// Replaces the record set and leaves the loading state. The page is clamped.
    pub fn set_records(&mut self, records: Vec<T>) {
        self.serialized = records
            .iter()
            .map(|record| {
                serde_json::to_value(record).unwrap_or_else(|e| {
                    warn!(error = %e, "Failed to serialize table record");
                    Value::Null
                })
            })
            .collect();
        self.records = records;
        self.loading = false;
        self.refresh();
        self.page = self.page.clamp(1, self.total_pages().max(1));
        self.clamp_selection();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Sets the search term and returns to the first page.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
        self.selected = 0;
        self.refresh();
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Cycles a column through unsorted, ascending, descending. Activating a column
    /// discards the sort of any other column.
    pub fn toggle_sort(&mut self, column: usize) {
        if !self.columns.get(column).is_some_and(Column::is_sortable) {
            return;
        }
        self.sort = match self.sort {
            Some((active, SortDirection::Ascending)) if active == column => {
                Some((column, SortDirection::Descending))
            }
            Some((active, SortDirection::Descending)) if active == column => None,
            _ => Some((column, SortDirection::Ascending)),
        };
        self.refresh();
    }

    #[must_use]
    pub fn sort(&self) -> Option<(usize, SortDirection)> {
        self.sort
    }

    /// Direction of a column when it is the active sort.
    #[must_use]
    pub fn sort_direction(&self, column: usize) -> Option<SortDirection> {
        self.sort
            .filter(|(active, _)| *active == column)
            .map(|(_, direction)| direction)
    }

    fn refresh(&mut self) {
        let needle = self.search.to_lowercase();
        let mut view: Vec<usize> = (0..self.records.len())
            .filter(|&i| needle.is_empty() || self.matches(i, &needle))
            .collect();

        if let Some((column, direction)) = self.sort {
            view.sort_by(|&a, &b| {
                let ordering = self.compare(column, a, b);
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        self.view = view;
    }

    fn matches(&self, index: usize, needle: &str) -> bool {
        match &self.serialized[index] {
            Value::Object(fields) => fields
                .values()
                .any(|value| stringify(value).to_lowercase().contains(needle)),
            other => stringify(other).to_lowercase().contains(needle),
        }
    }

    fn sort_key(&self, column: usize, index: usize) -> Value {
        match &self.columns[column].accessor {
            Accessor::Field(key) => self.serialized[index]
                .get(*key)
                .cloned()
                .unwrap_or(Value::Null),
            Accessor::Computed(compute) => Value::String(compute(&self.records[index])),
        }
    }

    fn compare(&self, column: usize, a: usize, b: usize) -> Ordering {
        compare_values(&self.sort_key(column, a), &self.sort_key(column, b))
    }

    /// Number of records passing the search filter.
    #[must_use]
    pub fn filtered_len(&self) -> usize {
        self.view.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Current 1-based page.
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// `ceil(filtered / page_size)`; zero when nothing matches.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.view.len().div_ceil(self.page_size)
    }

    pub fn set_page(&mut self, page: usize) {
        let page = page.clamp(1, self.total_pages().max(1));
        if page != self.page {
            self.page = page;
            self.selected = 0;
        }
    }

    pub fn first_page(&mut self) {
        self.set_page(1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn last_page(&mut self) {
        self.set_page(self.total_pages());
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.page < self.total_pages()
    }

    fn page_indices(&self) -> &[usize] {
        let start = (self.page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.view.len());
        self.view.get(start..end).unwrap_or(&[])
    }

    /// Records on the current page, in display order.
    #[must_use]
    pub fn page_rows(&self) -> Vec<&T> {
        self.page_indices()
            .iter()
            .map(|&i| &self.records[i])
            .collect()
    }

    /// Rendered cells of the current page.
    #[must_use]
    pub fn page_cells(&self) -> Vec<Vec<String>> {
        self.page_indices()
            .iter()
            .map(|&i| {
                (0..self.columns.len())
                    .map(|column| self.cell(column, i))
                    .collect()
            })
            .collect()
    }

    fn cell(&self, column: usize, index: usize) -> String {
        match &self.columns[column].accessor {
            Accessor::Field(key) => self.serialized[index]
                .get(*key)
                .map(stringify)
                .unwrap_or_default(),
            Accessor::Computed(compute) => compute(&self.records[index]),
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    /// Placeholder rows to draw instead of data while loading.
    #[must_use]
    pub fn placeholder_rows(&self) -> usize {
        if self.loading { self.page_size } else { 0 }
    }

    #[must_use]
    pub fn shows_empty_state(&self) -> bool {
        !self.loading && self.view.is_empty()
    }

    #[must_use]
    pub fn empty_message(&self) -> &str {
        &self.empty_message
    }

    /// "Showing N of M entries" with N rows on this page and M filtered records.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Showing {} of {} entries",
            self.page_indices().len(),
            self.view.len()
        )
    }

    /// First, last, current and its neighbours; an ellipsis two pages away from current.
    #[must_use]
    pub fn page_buttons(&self) -> Vec<PageButton> {
        let total = self.total_pages();
        let current = self.page;
        (1..=total)
            .filter_map(|page| {
                if page == 1 || page == total || page.abs_diff(current) <= 1 {
                    Some(PageButton::Page(page))
                } else if page.abs_diff(current) == 2 {
                    Some(PageButton::Ellipsis)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Row index of the selection within the current page.
    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Record under the cursor; `None` while placeholders are shown.
    #[must_use]
    pub fn selected(&self) -> Option<&T> {
        if self.loading {
            return None;
        }
        self.page_indices()
            .get(self.selected)
            .map(|&i| &self.records[i])
    }

    pub fn select_next(&mut self) {
        let rows = self.page_indices().len();
        if rows > 0 {
            self.selected = (self.selected + 1).min(rows - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let rows = self.page_indices().len();
        self.selected = self.selected.min(rows.saturating_sub(1));
    }
}

/// Display text of a serialized value.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

const fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x.len().cmp(&y.len()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use test_case::test_case;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Row {
        id: u32,
        name: String,
        speed: u32,
    }

    fn row(id: u32, name: &str, speed: u32) -> Row {
        Row {
            id,
            name: name.to_string(),
            speed,
        }
    }

    fn table(records: Vec<Row>, page_size: usize) -> DataTable<Row> {
        let mut table = DataTable::new(
            vec![
                Column::field("Name", "name").sortable(),
                Column::field("Speed", "speed").sortable(),
                Column::computed("Label", |r: &Row| format!("{} ({})", r.name, r.speed)),
            ],
            page_size,
        );
        table.set_records(records);
        table
    }

    fn sample() -> Vec<Row> {
        vec![
            row(1, "Fiber Home", 500),
            row(2, "DSL Basic", 16),
            row(3, "fiber pro", 1000),
            row(4, "Cable", 200),
        ]
    }

    fn ids(table: &DataTable<Row>) -> Vec<u32> {
        table.page_rows().iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_over_all_fields() {
        let mut table = table(sample(), 10);

        table.set_search("FIBER");
        assert_eq!(ids(&table), vec![1, 3]);

        table.set_search("16");
        assert_eq!(ids(&table), vec![2]);

        table.set_search("");
        assert_eq!(ids(&table), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_search_resets_page() {
        let mut table = table(sample(), 1);
        table.set_page(3);
        assert_eq!(table.page(), 3);

        table.set_search("a");
        assert_eq!(table.page(), 1);
    }

    #[test]
    fn test_sort_cycle_returns_to_input_order() {
        let mut table = table(sample(), 10);

        table.toggle_sort(1);
        assert_eq!(ids(&table), vec![2, 4, 1, 3]);
        assert_eq!(table.sort_direction(1), Some(SortDirection::Ascending));

        table.toggle_sort(1);
        assert_eq!(ids(&table), vec![3, 1, 4, 2]);

        table.toggle_sort(1);
        assert_eq!(ids(&table), vec![1, 2, 3, 4]);
        assert_eq!(table.sort(), None);
    }

    #[test]
    fn test_other_column_replaces_sort() {
        let mut table = table(sample(), 10);
        table.toggle_sort(1);
        table.toggle_sort(1);

        table.toggle_sort(0);

        assert_eq!(table.sort(), Some((0, SortDirection::Ascending)));
        assert_eq!(table.sort_direction(1), None);
        assert_eq!(ids(&table), vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_unsortable_column_ignored() {
        let mut table = table(sample(), 10);
        table.toggle_sort(2);
        assert_eq!(table.sort(), None);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut table = table(
            vec![row(1, "b", 5), row(2, "a", 5), row(3, "c", 1), row(4, "d", 5)],
            10,
        );

        table.toggle_sort(1);
        assert_eq!(ids(&table), vec![3, 1, 2, 4]);

        table.toggle_sort(1);
        assert_eq!(ids(&table), vec![1, 2, 4, 3]);
    }

    #[test_case(0, 10 => 0 ; "empty")]
    #[test_case(10, 10 => 1 ; "exact")]
    #[test_case(11, 10 => 2 ; "one over")]
    #[test_case(45, 20 => 3 ; "viewer page size")]
    fn test_total_pages(count: u32, page_size: usize) -> usize {
        let records = (0..count).map(|i| row(i, "x", i)).collect();
        table(records, page_size).total_pages()
    }

    #[test_case(23, 10 => 3 ; "remainder")]
    #[test_case(20, 10 => 10 ; "full last page")]
    fn test_last_page_size(count: u32, page_size: usize) -> usize {
        let records = (0..count).map(|i| row(i, "x", i)).collect();
        let mut table = table(records, page_size);
        table.last_page();
        table.page_rows().len()
    }

    #[test]
    fn test_navigation_clamps() {
        let records = (0..25).map(|i| row(i, "x", i)).collect();
        let mut table = table(records, 10);

        table.prev_page();
        assert_eq!(table.page(), 1);
        table.last_page();
        assert_eq!(table.page(), 3);
        table.next_page();
        assert_eq!(table.page(), 3);
        table.set_page(99);
        assert_eq!(table.page(), 3);
        assert!(!table.can_go_forward());
        table.first_page();
        assert!(!table.can_go_back());
    }

    #[test]
    fn test_summary_counts_page_and_filtered() {
        let records = (0..25).map(|i| row(i, if i % 2 == 0 { "even" } else { "odd" }, i)).collect();
        let mut table = table(records, 10);
        assert_eq!(table.summary(), "Showing 10 of 25 entries");

        table.set_search("odd");
        table.last_page();
        assert_eq!(table.summary(), "Showing 2 of 12 entries");
    }

    #[test]
    fn test_page_buttons_with_ellipsis() {
        let records = (0..100).map(|i| row(i, "x", i)).collect();
        let mut table = table(records, 10);
        table.set_page(5);

        assert_eq!(
            table.page_buttons(),
            vec![
                PageButton::Page(1),
                PageButton::Ellipsis,
                PageButton::Page(4),
                PageButton::Page(5),
                PageButton::Page(6),
                PageButton::Ellipsis,
                PageButton::Page(10),
            ]
        );

        table.first_page();
        assert_eq!(
            table.page_buttons(),
            vec![
                PageButton::Page(1),
                PageButton::Page(2),
                PageButton::Ellipsis,
                PageButton::Page(10),
            ]
        );
    }

    #[test]
    fn test_loading_and_empty_states() {
        let mut table = table(Vec::new(), 10).with_empty_message("No characteristics found");
        table.set_loading(true);
        assert_eq!(table.placeholder_rows(), 10);
        assert!(!table.shows_empty_state());

        table.set_records(Vec::new());
        assert_eq!(table.placeholder_rows(), 0);
        assert!(table.shows_empty_state());
        assert_eq!(table.empty_message(), "No characteristics found");
        assert_eq!(table.summary(), "Showing 0 of 0 entries");
    }

    #[test]
    fn test_cells_and_selection() {
        let mut table = table(sample(), 2);

        assert_eq!(
            table.page_cells()[0],
            vec!["Fiber Home".to_string(), "500".to_string(), "Fiber Home (500)".to_string()]
        );

        table.select_next();
        table.select_next();
        assert_eq!(table.selected().unwrap().id, 2);
        table.next_page();
        assert_eq!(table.selected().unwrap().id, 3);
    }

    #[test]
    fn test_nothing_selected_while_loading() {
        let mut table = table(sample(), 10);
        table.select_next();
        assert!(table.selected().is_some());

        table.set_loading(true);
        assert!(table.selected().is_none());

        table.set_records(sample());
        assert_eq!(table.selected().unwrap().id, 2);
    }

    #[test]
    fn test_set_records_clamps_page() {
        let records = (0..30).map(|i| row(i, "x", i)).collect();
        let mut table = table(records, 10);
        table.last_page();

        table.set_records(sample());

        assert_eq!(table.page(), 1);
        assert_eq!(table.page_rows().len(), 4);
    }
}

//! Viewer screen: one table per catalog collection with row actions.

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Tabs, Widget},
};

use crate::application::services::{CatalogResource, CatalogService, Column, DataTable};
use crate::domain::entities::{Characteristic, Offering, Price, Specification};
use crate::domain::errors::ApiError;
use crate::presentation::theme::Theme;
use crate::presentation::widgets::{DataTableView, TextInput};

/// Record picked from one of the tables.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogRecord {
    Characteristic(Characteristic),
    Specification(Specification),
    Price(Price),
    Offering(Offering),
}

impl CatalogRecord {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Characteristic(c) => &c.name,
            Self::Specification(s) => &s.name,
            Self::Price(p) => &p.name,
            Self::Offering(o) => &o.name,
        }
    }

    #[must_use]
    pub const fn resource(&self) -> CatalogResource {
        match self {
            Self::Characteristic(_) => CatalogResource::Characteristics,
            Self::Specification(_) => CatalogResource::Specifications,
            Self::Price(_) => CatalogResource::Prices,
            Self::Offering(_) => CatalogResource::Offerings,
        }
    }
}

/// Result of listing one collection.
#[derive(Debug)]
pub enum LoadedRecords {
    Characteristics(Result<Vec<Characteristic>, ApiError>),
    Specifications(Result<Vec<Specification>, ApiError>),
    Prices(Result<Vec<Price>, ApiError>),
    Offerings(Result<Vec<Offering>, ApiError>),
}

impl LoadedRecords {
    pub async fn fetch(service: &CatalogService, resource: CatalogResource) -> Self {
        match resource {
            CatalogResource::Characteristics => Self::Characteristics(service.characteristics().await),
            CatalogResource::Specifications => Self::Specifications(service.specifications().await),
            CatalogResource::Prices => Self::Prices(service.prices().await),
            CatalogResource::Offerings => Self::Offerings(service.offerings().await),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerAction {
    None,
    Reload(CatalogResource),
    Edit(CatalogRecord),
    Delete(CatalogRecord),
    Publish(Offering),
    Retire(Offering),
}

fn timestamp(value: Option<&DateTime<Utc>>) -> String {
    value.map_or_else(String::new, |t| t.format("%Y-%m-%d %H:%M").to_string())
}

fn characteristic_columns() -> Vec<Column<Characteristic>> {
    vec![
        Column::field("Name", "name").sortable(),
        Column::field("Value", "value").sortable(),
        Column::computed("Unit", |c: &Characteristic| c.unit_of_measure.to_string()).width(10),
        Column::computed("Created", |c: &Characteristic| timestamp(c.created_at.as_ref()))
            .sortable()
            .width(16),
    ]
}

fn specification_columns() -> Vec<Column<Specification>> {
    vec![
        Column::field("Name", "name").sortable(),
        Column::computed("Characteristics", |s: &Specification| {
            s.characteristic_ids.len().to_string()
        })
        .width(16),
        Column::computed("Created", |s: &Specification| timestamp(s.created_at.as_ref()))
            .sortable()
            .width(16),
    ]
}

fn price_columns() -> Vec<Column<Price>> {
    vec![
        Column::field("Name", "name").sortable(),
        Column::field("Value", "value").sortable().width(10),
        Column::field("Currency", "currency").width(9),
        Column::field("Unit", "unit"),
        Column::computed("Status", |p: &Price| {
            let status = if p.locked { "🔒 Locked" } else { "Active" };
            status.to_string()
        })
        .width(10),
    ]
}

fn offering_columns() -> Vec<Column<Offering>> {
    vec![
        Column::field("Name", "name").sortable(),
        Column::field("Status", "lifecycle_status").sortable().width(11),
        Column::computed("Channels", |o: &Offering| {
            o.sales_channels
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        }),
        Column::computed("Specs", |o: &Offering| o.specification_ids.len().to_string()).width(6),
        Column::computed("Prices", |o: &Offering| o.price_ids.len().to_string()).width(6),
        Column::computed("Updated", |o: &Offering| timestamp(o.updated_at.as_ref()))
            .sortable()
            .width(16),
    ]
}

pub struct ViewerScreen {
    resource: CatalogResource,
    characteristics: DataTable<Characteristic>,
    specifications: DataTable<Specification>,
    prices: DataTable<Price>,
    offerings: DataTable<Offering>,
    search: TextInput,
    searching: bool,
    pending_delete: Option<CatalogRecord>,
    theme: Theme,
}

/// Applies `$body` to the table of the active resource.
macro_rules! with_table {
    ($screen:expr, $table:ident => $body:expr) => {
        match $screen.resource {
            CatalogResource::Characteristics => {
                let $table = &mut $screen.characteristics;
                $body
            }
            CatalogResource::Specifications => {
                let $table = &mut $screen.specifications;
                $body
            }
            CatalogResource::Prices => {
                let $table = &mut $screen.prices;
                $body
            }
            CatalogResource::Offerings => {
                let $table = &mut $screen.offerings;
                $body
            }
        }
    };
}

impl ViewerScreen {
    #[must_use]
    pub fn new(theme: Theme, page_size: usize, offering_page_size: usize) -> Self {
        Self {
            resource: CatalogResource::Characteristics,
            characteristics: DataTable::new(characteristic_columns(), page_size)
                .with_empty_message("No characteristics yet"),
            specifications: DataTable::new(specification_columns(), page_size)
                .with_empty_message("No specifications yet"),
            prices: DataTable::new(price_columns(), page_size)
                .with_empty_message("No pricing plans yet"),
            offerings: DataTable::new(offering_columns(), offering_page_size)
                .with_empty_message("No offerings yet"),
            search: TextInput::new(" Search ").placeholder("Type to filter rows..."),
            searching: false,
            pending_delete: None,
            theme,
        }
    }

    #[must_use]
    pub const fn resource(&self) -> CatalogResource {
        self.resource
    }

    #[must_use]
    pub fn pending_delete(&self) -> Option<&CatalogRecord> {
        self.pending_delete.as_ref()
    }

    /// Shows a collection and asks for a fresh listing.
    pub fn show(&mut self, resource: CatalogResource) -> ViewerAction {
        self.resource = resource;
        self.pending_delete = None;
        with_table!(self, table => self.search.set_value(table.search().to_string()));
        self.reload()
    }

    /// Marks the active table as loading and requests its records.
    pub fn reload(&mut self) -> ViewerAction {
        let resource = self.resource;
        self.set_loading(resource);
        ViewerAction::Reload(resource)
    }

    /// Marks a table as loading, e.g. before a background refresh.
    pub fn set_loading(&mut self, resource: CatalogResource) {
        match resource {
            CatalogResource::Characteristics => self.characteristics.set_loading(true),
            CatalogResource::Specifications => self.specifications.set_loading(true),
            CatalogResource::Prices => self.prices.set_loading(true),
            CatalogResource::Offerings => self.offerings.set_loading(true),
        }
    }

    /// Fills a table. A failed listing keeps the previous rows; the toast was already shown.
    pub fn apply(&mut self, loaded: LoadedRecords) {
        match loaded {
            LoadedRecords::Characteristics(Ok(records)) => self.characteristics.set_records(records),
            LoadedRecords::Specifications(Ok(records)) => self.specifications.set_records(records),
            LoadedRecords::Prices(Ok(records)) => self.prices.set_records(records),
            LoadedRecords::Offerings(Ok(records)) => self.offerings.set_records(records),
            LoadedRecords::Characteristics(Err(_)) => self.characteristics.set_loading(false),
            LoadedRecords::Specifications(Err(_)) => self.specifications.set_loading(false),
            LoadedRecords::Prices(Err(_)) => self.prices.set_loading(false),
            LoadedRecords::Offerings(Err(_)) => self.offerings.set_loading(false),
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<CatalogRecord> {
        match self.resource {
            CatalogResource::Characteristics => self
                .characteristics
                .selected()
                .cloned()
                .map(CatalogRecord::Characteristic),
            CatalogResource::Specifications => self
                .specifications
                .selected()
                .cloned()
                .map(CatalogRecord::Specification),
            CatalogResource::Prices => self.prices.selected().cloned().map(CatalogRecord::Price),
            CatalogResource::Offerings => self
                .offerings
                .selected()
                .cloned()
                .map(CatalogRecord::Offering),
        }
    }

    fn selected_offering(&self) -> Option<Offering> {
        match self.resource {
            CatalogResource::Offerings => self.offerings.selected().cloned(),
            _ => None,
        }
    }

    fn handle_search_key(&mut self, key: &KeyEvent) -> ViewerAction {
        match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Down => {
                self.searching = false;
                self.search.set_focused(false);
            }
            _ => {
                if self.search.handle_key(key) {
                    let term = self.search.value().to_string();
                    with_table!(self, table => table.set_search(term));
                }
            }
        }
        ViewerAction::None
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> ViewerAction {
        if let Some(record) = self.pending_delete.take() {
            return match key.code {
                KeyCode::Char('y' | 'Y') => ViewerAction::Delete(record),
                _ => ViewerAction::None,
            };
        }
        if self.searching {
            return self.handle_search_key(key);
        }

        if key.modifiers.contains(KeyModifiers::ALT) {
            if let KeyCode::Char(c @ '1'..='4') = key.code {
                return self.show(CatalogResource::ALL[c as usize - '1' as usize]);
            }
            return ViewerAction::None;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                let index = CatalogResource::ALL
                    .iter()
                    .position(|r| *r == self.resource)
                    .unwrap_or(0);
                let len = CatalogResource::ALL.len();
                let next = if key.code == KeyCode::Tab {
                    (index + 1) % len
                } else {
                    (index + len - 1) % len
                };
                return self.show(CatalogResource::ALL[next]);
            }
            KeyCode::Up | KeyCode::Char('k') => with_table!(self, table => table.select_prev()),
            KeyCode::Down | KeyCode::Char('j') => with_table!(self, table => table.select_next()),
            KeyCode::Left | KeyCode::Char('h') => with_table!(self, table => table.prev_page()),
            KeyCode::Right | KeyCode::Char('l') => with_table!(self, table => table.next_page()),
            KeyCode::Home => with_table!(self, table => table.first_page()),
            KeyCode::End => with_table!(self, table => table.last_page()),
            KeyCode::Char('/') => {
                self.searching = true;
                self.search.set_focused(true);
            }
            KeyCode::Char(c @ '1'..='9') => {
                let column = c as usize - '1' as usize;
                with_table!(self, table => table.toggle_sort(column));
            }
            KeyCode::Char('R') => return self.reload(),
            KeyCode::Char('e') | KeyCode::Enter => {
                return self.selected().map_or(ViewerAction::None, ViewerAction::Edit);
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                self.pending_delete = self.selected();
            }
            KeyCode::Char('p') => {
                return self
                    .selected_offering()
                    .map_or(ViewerAction::None, ViewerAction::Publish);
            }
            KeyCode::Char('r') => {
                return self
                    .selected_offering()
                    .map_or(ViewerAction::None, ViewerAction::Retire);
            }
            _ => {}
        }
        ViewerAction::None
    }

    #[must_use]
    pub fn hints(&self) -> &'static [(&'static str, &'static str)] {
        if self.pending_delete.is_some() {
            return &[("y", "confirm delete"), ("any", "cancel")];
        }
        if self.searching {
            return &[("Enter/Esc", "done"), ("^U", "clear")];
        }
        match self.resource {
            CatalogResource::Offerings => &[
                ("Tab", "table"),
                ("/", "search"),
                ("1-9", "sort"),
                ("←→", "page"),
                ("e", "edit"),
                ("d", "delete"),
                ("p", "publish"),
                ("r", "retire"),
                ("R", "reload"),
            ],
            _ => &[
                ("Tab", "table"),
                ("/", "search"),
                ("1-9", "sort"),
                ("←→", "page"),
                ("e", "edit"),
                ("d", "delete"),
                ("R", "reload"),
            ],
        }
    }

    fn confirm_line(&self) -> Line<'static> {
        match &self.pending_delete {
            Some(record) => Line::from(vec![
                Span::styled(
                    format!(" Delete \"{}\"? ", record.name()),
                    Style::default()
                        .fg(self.theme.error)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("y to confirm, any other key to cancel", self.theme.muted_style()),
            ]),
            None => Line::default(),
        }
    }
}

impl Widget for &ViewerScreen {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [tabs, search, table, confirm] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let selected = CatalogResource::ALL
            .iter()
            .position(|r| *r == self.resource)
            .unwrap_or(0);
        Tabs::new(
            CatalogResource::ALL
                .iter()
                .enumerate()
                .map(|(i, r)| format!(" {} {} ", i + 1, r.title())),
        )
        .select(selected)
        .style(self.theme.muted_style())
        .highlight_style(
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .render(tabs, buf);

        (&self.search).render(search, buf);

        let title = self.resource.title();
        let focused = !self.searching;
        match self.resource {
            CatalogResource::Characteristics => DataTableView::new(&self.characteristics, &self.theme)
                .title(title)
                .focused(focused)
                .render(table, buf),
            CatalogResource::Specifications => DataTableView::new(&self.specifications, &self.theme)
                .title(title)
                .focused(focused)
                .render(table, buf),
            CatalogResource::Prices => DataTableView::new(&self.prices, &self.theme)
                .title(title)
                .focused(focused)
                .render(table, buf),
            CatalogResource::Offerings => DataTableView::new(&self.offerings, &self.theme)
                .title(title)
                .focused(focused)
                .render(table, buf),
        }

        Paragraph::new(self.confirm_line()).render(confirm, buf);
    }
}

//! Public store: filter panel, paged offering list and detail pane.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget, Wrap},
};

use crate::application::services::store_browser::{ERROR_MESSAGE, ERROR_TITLE};
use crate::application::services::{SearchTicket, StoreBrowser};
use crate::domain::entities::{SearchPage, StoreOffering, StorePrice};
use crate::domain::errors::ApiError;
use crate::domain::search::FilterState;
use crate::presentation::theme::Theme;
use crate::presentation::widgets::{FilterPanel, FilterPanelAction};

const DETAIL_CHARACTERISTICS: usize = 3;
const FILTER_PANEL_WIDTH: u16 = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreFocus {
    Filters,
    #[default]
    Results,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    None,
    Search(SearchTicket),
    /// Raw panel edit; debounce before passing to [`StoreScreen::apply_filters`].
    FiltersChanged(FilterState),
}

pub struct StoreScreen {
    browser: StoreBrowser,
    panel: FilterPanel,
    focus: StoreFocus,
    theme: Theme,
}

impl StoreScreen {
    /// Opens the store at `location`, a query string such as `q=fiber&channel=Online`.
    #[must_use]
    pub fn new(theme: Theme, location: &str, page_size: usize) -> Self {
        let browser = StoreBrowser::from_location(location, page_size);
        let panel = FilterPanel::new(browser.filters());
        Self {
            browser,
            panel,
            focus: StoreFocus::Results,
            theme,
        }
    }

    #[must_use]
    pub fn browser(&self) -> &StoreBrowser {
        &self.browser
    }

    #[must_use]
    pub fn location(&self) -> &str {
        self.browser.location()
    }

    #[must_use]
    pub fn focus(&self) -> StoreFocus {
        self.focus
    }

    /// Initial search for the restored location.
    pub fn start(&mut self) -> SearchTicket {
        self.browser.refresh()
    }

    /// Applies debounced filters. Identical filters still search again.
    pub fn apply_filters(&mut self, filters: FilterState) -> SearchTicket {
        self.browser.apply_filters(filters)
    }

    /// Returns `false` when the result belonged to a superseded search.
    pub fn complete(&mut self, ticket: &SearchTicket, result: Result<SearchPage, ApiError>) -> bool {
        self.browser.complete(ticket, result)
    }

    fn set_focus(&mut self, focus: StoreFocus) {
        self.focus = focus;
        self.panel.set_focused(focus == StoreFocus::Filters);
    }

    fn navigate(&mut self, ticket: Option<SearchTicket>) -> StoreAction {
        match ticket {
            Some(ticket) => {
                self.panel.set_filters(self.browser.filters());
                StoreAction::Search(ticket)
            }
            None => StoreAction::None,
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> StoreAction {
        if key.modifiers.contains(KeyModifiers::ALT) {
            return match key.code {
                KeyCode::Left => {
                    let ticket = self.browser.back();
                    self.navigate(ticket)
                }
                KeyCode::Right => {
                    let ticket = self.browser.forward();
                    self.navigate(ticket)
                }
                _ => StoreAction::None,
            };
        }

        if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
            let next = match self.focus {
                StoreFocus::Filters => StoreFocus::Results,
                StoreFocus::Results => StoreFocus::Filters,
            };
            self.set_focus(next);
            return StoreAction::None;
        }

        match self.focus {
            StoreFocus::Filters => {
                if key.code == KeyCode::Esc {
                    self.set_focus(StoreFocus::Results);
                    return StoreAction::None;
                }
                match self.panel.handle_key(key) {
                    Some(FilterPanelAction::Changed(filters)) => StoreAction::FiltersChanged(filters),
                    None => StoreAction::None,
                }
            }
            StoreFocus::Results => self.handle_results_key(key),
        }
    }

    fn handle_results_key(&mut self, key: &KeyEvent) -> StoreAction {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.browser.select_prev();
                StoreAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.browser.select_next();
                StoreAction::None
            }
            KeyCode::Char('m') | KeyCode::Enter => {
                self.browser.load_more().map_or(StoreAction::None, StoreAction::Search)
            }
            KeyCode::Char('r') => StoreAction::Search(self.browser.retry()),
            KeyCode::Char('/') => {
                self.set_focus(StoreFocus::Filters);
                StoreAction::None
            }
            _ => StoreAction::None,
        }
    }

    #[must_use]
    pub fn hints(&self) -> &'static [(&'static str, &'static str)] {
        match self.focus {
            StoreFocus::Filters => &[("Tab", "results"), ("^X", "reset"), ("Alt+←/→", "history")],
            StoreFocus::Results => &[
                ("Tab", "filters"),
                ("↑↓", "select"),
                ("m", "load more"),
                ("r", "retry"),
                ("Alt+←/→", "history"),
            ],
        }
    }
}

fn price_label(price: &StorePrice) -> String {
    if price.unit.is_empty() {
        format!("{:.2} {}", price.value, price.currency)
    } else {
        format!("{:.2} {} / {}", price.value, price.currency, price.unit)
    }
}

impl StoreScreen {
    fn render_location(&self, area: Rect, buf: &mut Buffer) {
        let history = self.browser.history();
        let location = if self.location().is_empty() {
            "/store".to_string()
        } else {
            format!("/store?{}", self.location())
        };
        let arrow = |enabled: bool, symbol: &'static str| {
            if enabled {
                Span::styled(symbol, Style::default().fg(self.theme.accent))
            } else {
                Span::styled(symbol, self.theme.muted_style())
            }
        };
        let line = Line::from(vec![
            arrow(history.can_go_back(), "◀ "),
            arrow(history.can_go_forward(), "▶ "),
            Span::styled(location, Style::default().fg(self.theme.text)),
        ]);
        Paragraph::new(line).render(area, buf);
    }

    fn render_error(&self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::default(),
            Line::styled(
                ERROR_TITLE,
                Style::default().fg(self.theme.error).add_modifier(Modifier::BOLD),
            ),
            Line::from(self.browser.error().unwrap_or(ERROR_MESSAGE).to_string()),
            Line::default(),
            Line::styled("Press r to try again", self.theme.muted_style()),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }

    fn render_results(&self, area: Rect, buf: &mut Buffer) {
        let focused = self.focus == StoreFocus::Results;
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(focused))
            .title(" Offerings ")
            .title_bottom(Line::from(format!(" {} ", self.browser.summary())).right_aligned());
        if self.browser.has_more() && !self.browser.is_loading() {
            block = block.title_bottom(
                Line::styled(" m: load more ", Style::default().fg(self.theme.accent)).left_aligned(),
            );
        }
        let inner = block.inner(area);
        block.render(area, buf);

        if self.browser.error().is_some() && self.browser.items().is_empty() {
            self.render_error(inner, buf);
            return;
        }
        if self.browser.shows_empty_state() {
            Paragraph::new(vec![
                Line::default(),
                Line::styled("No offerings found", Style::default().fg(self.theme.text)),
                Line::styled("Try adjusting your filters", self.theme.muted_style()),
            ])
            .alignment(Alignment::Center)
            .render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .browser
            .items()
            .iter()
            .map(|offering| {
                let price = offering
                    .lowest_price()
                    .map_or_else(|| "No pricing".to_string(), |p| format!("from {}", price_label(p)));
                ListItem::new(Line::from(vec![
                    Span::styled(offering.name.clone(), Style::default().fg(self.theme.text)),
                    Span::raw("  "),
                    Span::styled(price, self.theme.muted_style()),
                ]))
            })
            .collect();
        let list = List::new(items)
            .highlight_style(self.theme.selected_style())
            .highlight_symbol("▶ ");
        let mut state = ListState::default().with_selected(
            (!self.browser.items().is_empty()).then_some(self.browser.selected_index()),
        );
        StatefulWidget::render(list, inner, buf, &mut state);
    }

    fn render_detail(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false))
            .title(" Details ");
        let Some(offering) = self.browser.selected() else {
            block.render(area, buf);
            return;
        };
        Paragraph::new(self.detail_lines(offering))
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }

    fn detail_lines(&self, offering: &StoreOffering) -> Vec<Line<'static>> {
        let heading = Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD);
        let mut lines = vec![Line::styled(
            offering.name.clone(),
            Style::default().fg(self.theme.text).add_modifier(Modifier::BOLD),
        )];
        if let Some(description) = offering.description.as_deref().filter(|d| !d.trim().is_empty()) {
            lines.push(Line::styled(description.to_string(), self.theme.muted_style()));
        }

        lines.push(Line::default());
        lines.push(Line::styled("Pricing", heading));
        if offering.pricing.is_empty() {
            lines.push(Line::styled("No pricing", self.theme.muted_style()));
        }
        for price in &offering.pricing {
            lines.push(Line::from(format!("• {}: {}", price.name, price_label(price))));
        }

        if !offering.sales_channels.is_empty() {
            lines.push(Line::default());
            lines.push(Line::styled("Channels", heading));
            lines.push(Line::from(offering.sales_channels.join(", ")));
        }

        let characteristics = offering.top_characteristics(DETAIL_CHARACTERISTICS);
        if !characteristics.is_empty() {
            lines.push(Line::default());
            lines.push(Line::styled("Highlights", heading));
            for c in characteristics {
                let unit = c.unit_of_measure.as_deref().map(|u| format!(" {u}")).unwrap_or_default();
                lines.push(Line::from(format!("• {}: {}{unit}", c.name, c.value)));
            }
        }
        lines
    }
}

impl Widget for &StoreScreen {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [location, body] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);
        self.render_location(location, buf);

        let [filters, results, detail] = Layout::horizontal([
            Constraint::Length(FILTER_PANEL_WIDTH),
            Constraint::Fill(3),
            Constraint::Fill(2),
        ])
        .areas(body);
        self.panel.render(filters, buf, &self.theme);
        self.render_results(results, buf);
        self.render_detail(detail, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::STORE_PAGE_SIZE;
    use crate::domain::entities::{EntityId, StoreCharacteristic, StoreSpecification};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn alt(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::ALT)
    }

    fn offering(id: &str, name: &str, value: f64) -> StoreOffering {
        StoreOffering {
            id: EntityId::from(id),
            name: name.to_string(),
            description: Some("Symmetric fiber".to_string()),
            sales_channels: vec!["Online".to_string()],
            pricing: vec![StorePrice {
                name: "Monthly".to_string(),
                value,
                currency: "USD".to_string(),
                unit: "month".to_string(),
            }],
            specifications: vec![StoreSpecification {
                name: "Speed".to_string(),
                characteristics: vec![StoreCharacteristic {
                    name: "Download".to_string(),
                    value: "500".to_string(),
                    unit_of_measure: Some("Mbps".to_string()),
                }],
            }],
        }
    }

    fn page(total: u64, items: Vec<StoreOffering>) -> SearchPage {
        SearchPage { total, items }
    }

    fn rendered(screen: &StoreScreen) -> String {
        let area = Rect::new(0, 0, 140, 30);
        let mut buf = Buffer::empty(area);
        screen.render(area, &mut buf);
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol().to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_results_and_details_render() {
        let mut screen = StoreScreen::new(Theme::default(), "q=fiber", STORE_PAGE_SIZE);
        let ticket = screen.start();
        assert!(screen.complete(
            &ticket,
            Ok(page(2, vec![offering("o1", "Fiber 500", 49.0), offering("o2", "Fiber 1000", 79.0)]))
        ));

        let text = rendered(&screen);
        assert!(text.contains("/store?q=fiber"));
        assert!(text.contains("Fiber 1000"));
        assert!(text.contains("from 49.00 USD / month"));
        assert!(text.contains("Showing 2 of 2 results"));
        assert!(text.contains("Download: 500 Mbps"));
    }

    #[test]
    fn test_failed_search_shows_error_panel() {
        let mut screen = StoreScreen::new(Theme::default(), "", STORE_PAGE_SIZE);
        let ticket = screen.start();
        screen.complete(&ticket, Err(ApiError::network("connection refused")));

        let text = rendered(&screen);
        assert!(text.contains(ERROR_TITLE));
        assert!(text.contains("Press r to try again"));
        assert!(matches!(screen.handle_key(&key(KeyCode::Char('r'))), StoreAction::Search(_)));
    }

    #[test]
    fn test_empty_results_message() {
        let mut screen = StoreScreen::new(Theme::default(), "q=nothing", STORE_PAGE_SIZE);
        let ticket = screen.start();
        screen.complete(&ticket, Ok(page(0, Vec::new())));
        assert!(rendered(&screen).contains("No offerings found"));
    }

    #[test]
    fn test_filter_edits_are_reported_for_debounce() {
        let mut screen = StoreScreen::new(Theme::default(), "", STORE_PAGE_SIZE);
        assert_eq!(screen.handle_key(&key(KeyCode::Tab)), StoreAction::None);
        assert_eq!(screen.focus(), StoreFocus::Filters);

        match screen.handle_key(&key(KeyCode::Char('f'))) {
            StoreAction::FiltersChanged(filters) => assert_eq!(filters.q, "f"),
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_load_more_only_when_more_remain() {
        let mut screen = StoreScreen::new(Theme::default(), "", STORE_PAGE_SIZE);
        let ticket = screen.start();
        screen.complete(&ticket, Ok(page(20, vec![offering("o1", "Fiber 500", 49.0)])));

        match screen.handle_key(&key(KeyCode::Char('m'))) {
            StoreAction::Search(next) => assert_eq!(next.skip, STORE_PAGE_SIZE),
            other => panic!("unexpected action: {other:?}"),
        }
        // Still loading.
        assert_eq!(screen.handle_key(&key(KeyCode::Char('m'))), StoreAction::None);
    }

    #[test]
    fn test_history_navigation_resyncs_panel() {
        let mut screen = StoreScreen::new(Theme::default(), "", STORE_PAGE_SIZE);
        screen.apply_filters(FilterState {
            q: "fiber".to_string(),
            ..FilterState::default()
        });
        assert_eq!(screen.location(), "q=fiber");

        assert!(matches!(screen.handle_key(&alt(KeyCode::Left)), StoreAction::Search(_)));
        assert_eq!(screen.location(), "");
        assert_eq!(screen.panel.filters().q, "");

        assert!(matches!(screen.handle_key(&alt(KeyCode::Right)), StoreAction::Search(_)));
        assert_eq!(screen.panel.filters().q, "fiber");
        assert_eq!(screen.handle_key(&alt(KeyCode::Right)), StoreAction::None);
    }
}

//! Store filter panel: keyword, price range and sales channel.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::TextInput;
use crate::domain::entities::SalesChannel;
use crate::domain::search::FilterState;
use crate::presentation::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterField {
    #[default]
    Search,
    MinPrice,
    MaxPrice,
    Channel,
}

impl FilterField {
    const ORDER: [Self; 4] = [Self::Search, Self::MinPrice, Self::MaxPrice, Self::Channel];

    fn step(self, forward: bool) -> Self {
        let index = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let len = Self::ORDER.len();
        let next = if forward { (index + 1) % len } else { (index + len - 1) % len };
        Self::ORDER[next]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPanelAction {
    /// Filters changed; the caller debounces before searching.
    Changed(FilterState),
}

#[derive(Debug, Clone)]
pub struct FilterPanel {
    search: TextInput,
    min_price: TextInput,
    max_price: TextInput,
    channel: String,
    channel_cursor: usize,
    /// Not editable here; carried over from the location so it survives other edits.
    characteristic: Vec<String>,
    field: FilterField,
    focused: bool,
}

impl FilterPanel {
    #[must_use]
    pub fn new(filters: &FilterState) -> Self {
        let mut panel = Self {
            search: TextInput::new(" Search ").placeholder("Search offerings..."),
            min_price: TextInput::new(" Min price ").numeric().placeholder("0"),
            max_price: TextInput::new(" Max price ").numeric().placeholder("Any"),
            channel: String::new(),
            channel_cursor: 0,
            characteristic: Vec::new(),
            field: FilterField::Search,
            focused: false,
        };
        panel.set_filters(filters);
        panel
    }

    /// Replaces the panel contents, e.g. after navigating back in history.
    pub fn set_filters(&mut self, filters: &FilterState) {
        self.search.set_value(filters.q.clone());
        self.min_price.set_value(filters.min_price.clone());
        self.max_price.set_value(filters.max_price.clone());
        self.channel.clone_from(&filters.channel);
        self.characteristic.clone_from(&filters.characteristic);
    }

    #[must_use]
    pub fn filters(&self) -> FilterState {
        FilterState {
            q: self.search.value().to_string(),
            min_price: self.min_price.value().to_string(),
            max_price: self.max_price.value().to_string(),
            channel: self.channel.clone(),
            characteristic: self.characteristic.clone(),
        }
    }

    #[must_use]
    pub fn field(&self) -> FilterField {
        self.field
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        self.sync_focus();
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    fn sync_focus(&mut self) {
        self.search.set_focused(self.focused && self.field == FilterField::Search);
        self.min_price.set_focused(self.focused && self.field == FilterField::MinPrice);
        self.max_price.set_focused(self.focused && self.field == FilterField::MaxPrice);
    }

    fn focus(&mut self, field: FilterField) {
        self.field = field;
        self.sync_focus();
    }

    /// Clicking the active channel clears it.
    fn toggle_channel(&mut self, channel: SalesChannel) {
        if self.channel == channel.as_str() {
            self.channel.clear();
        } else {
            self.channel = channel.as_str().to_string();
        }
    }

    /// Clears every filter.
    pub fn reset(&mut self) -> FilterPanelAction {
        self.set_filters(&FilterState::default());
        FilterPanelAction::Changed(self.filters())
    }

    fn changed(&self) -> Option<FilterPanelAction> {
        Some(FilterPanelAction::Changed(self.filters()))
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<FilterPanelAction> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('x') {
            return Some(self.reset());
        }
        match key.code {
            KeyCode::Down => {
                self.focus(self.field.step(true));
                return None;
            }
            KeyCode::Up => {
                self.focus(self.field.step(false));
                return None;
            }
            _ => {}
        }

        let input = match self.field {
            FilterField::Search => &mut self.search,
            FilterField::MinPrice => &mut self.min_price,
            FilterField::MaxPrice => &mut self.max_price,
            FilterField::Channel => return self.handle_channel_key(key),
        };
        if input.handle_key(key) { self.changed() } else { None }
    }

    fn handle_channel_key(&mut self, key: &KeyEvent) -> Option<FilterPanelAction> {
        let count = SalesChannel::ALL.len();
        match key.code {
            KeyCode::Left => {
                self.channel_cursor = (self.channel_cursor + count - 1) % count;
                None
            }
            KeyCode::Right => {
                self.channel_cursor = (self.channel_cursor + 1) % count;
                None
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.toggle_channel(SalesChannel::ALL[self.channel_cursor % count]);
                self.changed()
            }
            _ => None,
        }
    }

    fn channel_line(&self, theme: &Theme) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, channel) in SalesChannel::ALL.iter().enumerate() {
            let active = self.channel == channel.as_str();
            let mut style = if active {
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            if self.focused && self.field == FilterField::Channel && i == self.channel_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let mark = if active { "●" } else { "○" };
            spans.push(Span::styled(format!("{mark} {channel}"), style));
            spans.push(Span::raw("  "));
        }
        Line::from(spans)
    }
}

impl FilterPanel {
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(self.focused))
            .title(" Filters ");
        let inner = block.inner(area);
        block.render(area, buf);

        let [search, prices, channel, characteristics, hint] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(inner);
        let [min, max] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(prices);

        (&self.search).render(search, buf);
        (&self.min_price).render(min, buf);
        (&self.max_price).render(max, buf);

        let channel_block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(self.focused && self.field == FilterField::Channel))
            .title(" Channel ");
        Paragraph::new(self.channel_line(theme))
            .block(channel_block)
            .render(channel, buf);

        if !self.characteristic.is_empty() {
            let lines: Vec<Line> = std::iter::once(Line::styled("Characteristics", theme.muted_style()))
                .chain(self.characteristic.iter().map(|c| Line::from(format!("• {c}"))))
                .collect();
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .render(characteristics, buf);
        }

        Paragraph::new("↑↓ field  Space channel  ^X reset")
            .style(theme.muted_style())
            .render(hint, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn typed(panel: &mut FilterPanel, text: &str) -> Option<FilterPanelAction> {
        let mut last = None;
        for c in text.chars() {
            last = panel.handle_key(&key(KeyCode::Char(c)));
        }
        last
    }

    #[test]
    fn test_typing_reports_changed_filters() {
        let mut panel = FilterPanel::new(&FilterState::default());

        let action = typed(&mut panel, "fiber");

        assert_eq!(
            action,
            Some(FilterPanelAction::Changed(FilterState {
                q: "fiber".to_string(),
                ..FilterState::default()
            }))
        );
    }

    #[test]
    fn test_price_fields_reject_letters() {
        let mut panel = FilterPanel::new(&FilterState::default());
        panel.handle_key(&key(KeyCode::Down));

        assert_eq!(typed(&mut panel, "a"), None);
        typed(&mut panel, "10");

        assert_eq!(panel.filters().min_price, "10");
    }

    #[test]
    fn test_active_channel_toggles_off() {
        let mut panel = FilterPanel::new(&FilterState::default());
        for _ in 0..3 {
            panel.handle_key(&key(KeyCode::Down));
        }
        assert_eq!(panel.field(), FilterField::Channel);

        panel.handle_key(&key(KeyCode::Char(' ')));
        assert_eq!(panel.filters().channel, "Online");

        panel.handle_key(&key(KeyCode::Char(' ')));
        assert_eq!(panel.filters().channel, "");
    }

    #[test]
    fn test_characteristic_filters_survive_edits() {
        let filters = FilterState::from_query_string("q=tv&characteristic=Storage%3A64");
        let mut panel = FilterPanel::new(&filters);

        typed(&mut panel, "s");

        let current = panel.filters();
        assert_eq!(current.q, "tvs");
        assert_eq!(current.characteristic, vec!["Storage:64".to_string()]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let filters = FilterState::from_query_string("q=tv&channel=Retail&min_price=5");
        let mut panel = FilterPanel::new(&filters);

        let action = panel.handle_key(&KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL));

        assert_eq!(action, Some(FilterPanelAction::Changed(FilterState::default())));
    }
}

//! Checkbox list for choosing several related records.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::application::forms::SelectOption;
use crate::domain::entities::EntityId;
use crate::presentation::theme::Theme;

/// Cursor and focus of a multi-select; the options and selection live in the form.
#[derive(Debug, Clone, Default)]
pub struct MultiSelectState {
    cursor: usize,
    offset: usize,
    focused: bool,
}

impl MultiSelectState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Keeps the cursor inside a list that may have shrunk.
    pub fn clamp(&mut self, len: usize) {
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Moves the cursor, or returns the id to toggle on Space/Enter.
    pub fn handle_key(&mut self, key: &KeyEvent, options: &[SelectOption]) -> Option<EntityId> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if !options.is_empty() {
                    self.cursor = (self.cursor + 1).min(options.len() - 1);
                }
                None
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                options.get(self.cursor).map(|option| option.id.clone())
            }
            _ => None,
        }
    }

    fn scroll_into_view(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }
    }
}

pub struct MultiSelect<'a> {
    label: &'a str,
    options: &'a [SelectOption],
    selected: &'a [EntityId],
    theme: &'a Theme,
    loading: bool,
    error: Option<&'a str>,
}

impl<'a> MultiSelect<'a> {
    #[must_use]
    pub fn new(
        label: &'a str,
        options: &'a [SelectOption],
        selected: &'a [EntityId],
        theme: &'a Theme,
    ) -> Self {
        Self {
            label,
            options,
            selected,
            theme,
            loading: false,
            error: None,
        }
    }

    #[must_use]
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    #[must_use]
    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    pub fn render(self, area: Rect, buf: &mut Buffer, state: &mut MultiSelectState) {
        let border = if self.error.is_some() {
            Style::default().fg(self.theme.error)
        } else {
            self.theme.border_style(state.focused)
        };
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {} ({}) ", self.label, self.selected.len()));
        if let Some(error) = self.error {
            block = block.title_bottom(
                Line::from(format!(" {error} ")).style(Style::default().fg(self.theme.error)),
            );
        }
        let inner = block.inner(area);
        block.render(area, buf);

        if self.loading {
            Paragraph::new("Loading...")
                .style(self.theme.muted_style())
                .render(inner, buf);
            return;
        }
        if self.options.is_empty() {
            Paragraph::new("Nothing to choose from yet")
                .style(self.theme.muted_style())
                .render(inner, buf);
            return;
        }

        let height = inner.height as usize;
        state.clamp(self.options.len());
        state.scroll_into_view(height);

        let lines: Vec<Line> = self
            .options
            .iter()
            .enumerate()
            .skip(state.offset)
            .take(height)
            .map(|(i, option)| {
                let checked = self.selected.contains(&option.id);
                let mark = if checked { "[x] " } else { "[ ] " };
                let style = if state.focused && i == state.cursor {
                    self.theme.selected_style()
                } else if checked {
                    Style::default().fg(self.theme.success)
                } else {
                    Style::default().fg(Color::Reset)
                };
                Line::from(vec![
                    Span::styled(mark, style),
                    Span::styled(option.label.clone(), style),
                ])
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}

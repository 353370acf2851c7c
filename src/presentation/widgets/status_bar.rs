//! Status bar widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Status bar severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl StatusLevel {
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Info => Color::Cyan,
            Self::Success => Color::Green,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// One-line footer: left text, key hints in the middle, right text.
#[derive(Debug, Clone)]
pub struct StatusBar {
    left: String,
    hints: Vec<(String, String)>,
    right: String,
    level: StatusLevel,
}

impl StatusBar {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            left: String::new(),
            hints: Vec::new(),
            right: String::new(),
            level: StatusLevel::Info,
        }
    }

    #[must_use]
    pub fn left(mut self, content: impl Into<String>) -> Self {
        self.left = content.into();
        self
    }

    /// Adds a `key: description` hint.
    #[must_use]
    pub fn hint(mut self, key: impl Into<String>, description: impl Into<String>) -> Self {
        self.hints.push((key.into(), description.into()));
        self
    }

    #[must_use]
    pub fn hints(mut self, hints: &[(&str, &str)]) -> Self {
        self.hints.extend(
            hints
                .iter()
                .map(|(key, description)| ((*key).to_string(), (*description).to_string())),
        );
        self
    }

    #[must_use]
    pub fn right(mut self, content: impl Into<String>) -> Self {
        self.right = content.into();
        self
    }

    #[must_use]
    pub const fn level(mut self, level: StatusLevel) -> Self {
        self.level = level;
        self
    }

    fn hint_spans(&self) -> Vec<Span<'_>> {
        let mut spans = Vec::new();
        for (i, (key, description)) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
            }
            spans.push(Span::styled(
                key.as_str(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!(" {description}"),
                Style::default().fg(Color::DarkGray),
            ));
        }
        spans
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &StatusBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .fg(self.level.color())
            .add_modifier(Modifier::BOLD);

        let width = area.width as usize;
        let hints = self.hint_spans();
        let hints_len: usize = hints.iter().map(|s| s.content.width()).sum();
        let left_len = self.left.width();
        let right_len = self.right.width();

        let center_start = width.saturating_sub(hints_len) / 2;
        let right_start = width.saturating_sub(right_len);

        let mut spans = vec![Span::styled(self.left.as_str(), style)];

        let left_padding = center_start.saturating_sub(left_len).max(usize::from(left_len > 0));
        spans.push(Span::raw(" ".repeat(left_padding)));
        spans.extend(hints);

        let current_len = left_len + left_padding + hints_len;
        let right_padding = right_start.saturating_sub(current_len);
        if right_padding > 0 {
            spans.push(Span::raw(" ".repeat(right_padding)));
        }

        if !self.right.is_empty() {
            spans.push(Span::styled(self.right.as_str(), style));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

//! Text input widget.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Single-line text field. The cursor counts characters, not bytes.
#[derive(Debug, Clone)]
pub struct TextInput {
    value: String,
    cursor: usize,
    focused: bool,
    masked: bool,
    numeric: bool,
    placeholder: String,
    label: String,
    error: Option<String>,
}

impl TextInput {
    /// Creates new input with label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            focused: false,
            masked: false,
            numeric: false,
            placeholder: String::new(),
            label: label.into(),
            error: None,
        }
    }

    /// Enables password masking.
    #[must_use]
    pub fn password(mut self) -> Self {
        self.masked = true;
        self
    }

    /// Accepts only digits, one `.` and a leading `-`.
    #[must_use]
    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    /// Sets placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = text.into();
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Inline validation message shown in the border.
    pub fn set_error(&mut self, error: Option<&str>) {
        self.error = error.map(str::to_string);
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn accepts(&self, c: char) -> bool {
        if !self.numeric {
            return !c.is_control();
        }
        match c {
            '0'..='9' => true,
            '.' => !self.value.contains('.'),
            '-' => self.cursor == 0 && !self.value.starts_with('-'),
            _ => false,
        }
    }

    /// Inserts character at cursor.
    pub fn input_char(&mut self, c: char) {
        if !self.accepts(c) {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Deletes character before cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    /// Deletes character at cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    /// Applies an editing key. Returns true when the value changed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let before = self.value.len();
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let changed = !self.value.is_empty();
                self.clear();
                return changed;
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let snapshot = self.value.clone();
                self.input_char(c);
                return snapshot != self.value;
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_start(),
            KeyCode::End => self.move_end(),
            _ => {}
        }
        before != self.value.len()
    }

    fn display_text(&self) -> String {
        if self.value.is_empty() {
            self.placeholder.clone()
        } else if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

impl Widget for &TextInput {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = match (&self.error, self.focused) {
            (Some(_), _) => Style::default().fg(Color::Red),
            (None, true) => Style::default().fg(Color::Cyan),
            (None, false) => Style::default().fg(Color::Gray),
        };

        let text_style = if self.value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(self.label.as_str());
        if let Some(error) = &self.error {
            block = block.title_bottom(Line::from(format!(" {error} ")).style(Style::default().fg(Color::Red)));
        }

        let inner = block.inner(area);

        let display = self.display_text();
        let paragraph = Paragraph::new(display).style(text_style);

        block.render(area, buf);
        paragraph.render(inner, buf);

        if self.focused && inner.width > 0 {
            let offset = u16::try_from(self.cursor).unwrap_or(u16::MAX);
            let cursor_x = inner.x.saturating_add(offset);
            if cursor_x < inner.x + inner.width {
                buf[(cursor_x, inner.y)]
                    .set_style(Style::default().bg(Color::White).fg(Color::Black));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_text_input_basic() {
        let mut input = TextInput::new("Test");
        assert!(input.value().is_empty());

        input.input_char('a');
        input.input_char('b');
        assert_eq!(input.value(), "ab");

        input.backspace();
        assert_eq!(input.value(), "a");
    }

    #[test]
    fn test_masked_display() {
        let mut input = TextInput::new("Password").password();
        input.set_value("secret");

        assert_eq!(input.display_text(), "••••••");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = TextInput::new("Name");
        input.set_value("Çay");
        input.move_start();
        input.move_right();
        input.input_char('ö');
        assert_eq!(input.value(), "Çöay");

        input.backspace();
        input.backspace();
        assert_eq!(input.value(), "ay");
    }

    #[test]
    fn test_numeric_filter() {
        let mut input = TextInput::new("Price").numeric();
        for c in "-1a2..5".chars() {
            input.handle_key(&key(KeyCode::Char(c)));
        }
        assert_eq!(input.value(), "-12.5");
    }

    #[test]
    fn test_handle_key_reports_changes() {
        let mut input = TextInput::new("Search");
        assert!(input.handle_key(&key(KeyCode::Char('x'))));
        assert!(!input.handle_key(&key(KeyCode::Left)));
        assert!(!input.handle_key(&key(KeyCode::Backspace)));
        input.move_end();
        assert!(input.handle_key(&key(KeyCode::Backspace)));
        assert!(!input.handle_key(&KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
    }
}

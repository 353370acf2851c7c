//! Sign-in screen.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::application::dto::LoginRequest;
use crate::presentation::theme::Theme;
use crate::presentation::widgets::TextInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Input,
    Validating,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginField {
    Username,
    Password,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    None,
    Submit,
    /// Leave sign-in for the public store.
    Cancel,
}

/// Login screen UI.
pub struct LoginScreen {
    username: TextInput,
    password: TextInput,
    field: LoginField,
    state: LoginState,
    error_message: Option<String>,
    theme: Theme,
}

impl LoginScreen {
    /// Creates new login screen.
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        let mut username = TextInput::new(" Username ").placeholder("admin");
        username.set_focused(true);
        let password = TextInput::new(" Password ").password();

        Self {
            username,
            password,
            field: LoginField::Username,
            state: LoginState::Input,
            error_message: None,
            theme,
        }
    }

    /// Returns current state.
    #[must_use]
    pub const fn state(&self) -> LoginState {
        self.state
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Credentials as entered.
    #[must_use]
    pub fn request(&self) -> LoginRequest {
        LoginRequest::new(self.username.value(), self.password.value())
    }

    /// Sets validating state.
    pub fn set_validating(&mut self) {
        self.state = LoginState::Validating;
        self.error_message = None;
    }

    /// Shows the error inline and clears the password.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.state = LoginState::Error;
        self.error_message = Some(message.into());
        self.password.clear();
    }

    fn focus(&mut self, field: LoginField) {
        self.field = field;
        self.username.set_focused(field == LoginField::Username);
        self.password.set_focused(field == LoginField::Password);
    }

    fn current_input(&mut self) -> &mut TextInput {
        match self.field {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    /// Handles key event, returns action.
    pub fn handle_key(&mut self, key: KeyEvent) -> LoginAction {
        if self.state == LoginState::Validating {
            return LoginAction::None;
        }

        match key.code {
            KeyCode::Esc => return LoginAction::Cancel,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                let next = match self.field {
                    LoginField::Username => LoginField::Password,
                    LoginField::Password => LoginField::Username,
                };
                self.focus(next);
            }
            KeyCode::Enter => {
                if self.field == LoginField::Username {
                    self.focus(LoginField::Password);
                } else {
                    return LoginAction::Submit;
                }
            }
            _ => {
                if self.current_input().handle_key(&key) && self.state == LoginState::Error {
                    self.state = LoginState::Input;
                }
            }
        }

        LoginAction::None
    }

    fn render_inner(&self, area: Rect, buf: &mut Buffer) {
        let vertical = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(13),
            Constraint::Fill(1),
        ]);
        let [_, center, _] = vertical.areas(area);

        let horizontal = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Min(50),
            Constraint::Fill(1),
        ]);
        let [_, content_area, _] = horizontal.areas(center);

        Clear.render(content_area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .title(" Catalog Admin Sign In ");

        let inner = block.inner(content_area);
        block.render(content_area, buf);

        let [title, _, username, password, _, status, hints] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        Paragraph::new("Sign in to manage the product catalog")
            .style(Style::default().fg(self.theme.text))
            .render(title, buf);

        (&self.username).render(username, buf);
        (&self.password).render(password, buf);

        let status_line = match self.state {
            LoginState::Input => Line::default(),
            LoginState::Validating => Line::from(Span::styled(
                "Signing in...",
                Style::default()
                    .fg(self.theme.warning)
                    .add_modifier(Modifier::ITALIC),
            )),
            LoginState::Error => {
                let msg = self.error_message.as_deref().unwrap_or("Unknown error");
                Line::from(Span::styled(msg.to_string(), Style::default().fg(self.theme.error)))
            }
        };
        Paragraph::new(status_line).render(status, buf);

        Paragraph::new(Line::from(vec![
            Span::styled("Enter: Sign in", self.theme.muted_style()),
            Span::raw(" | "),
            Span::styled("Tab: Next field", self.theme.muted_style()),
            Span::raw(" | "),
            Span::styled("Esc: Store", self.theme.muted_style()),
        ]))
        .render(hints, buf);
    }
}

impl Default for LoginScreen {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl Widget for &LoginScreen {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.render_inner(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(screen: &mut LoginScreen, text: &str) {
        for c in text.chars() {
            screen.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_initial_state() {
        let screen = LoginScreen::default();
        assert_eq!(screen.state(), LoginState::Input);
        assert!(screen.request().username.is_empty());
    }

    #[test]
    fn test_enter_moves_to_password_then_submits() {
        let mut screen = LoginScreen::default();
        type_text(&mut screen, "admin");
        assert_eq!(screen.handle_key(key(KeyCode::Enter)), LoginAction::None);
        type_text(&mut screen, "secret");
        assert_eq!(screen.handle_key(key(KeyCode::Enter)), LoginAction::Submit);

        let request = screen.request();
        assert_eq!(request.username, "admin");
        assert_eq!(request.password, "secret");
    }

    #[test]
    fn test_validating_ignores_keys() {
        let mut screen = LoginScreen::default();
        screen.set_validating();
        type_text(&mut screen, "x");
        assert!(screen.request().username.is_empty());
    }

    #[test]
    fn test_error_clears_password_and_resets_on_typing() {
        let mut screen = LoginScreen::default();
        screen.handle_key(key(KeyCode::Tab));
        type_text(&mut screen, "wrong");
        screen.set_error("Invalid credentials. Please try again.");

        assert_eq!(screen.state(), LoginState::Error);
        assert!(screen.request().password.is_empty());

        type_text(&mut screen, "r");
        assert_eq!(screen.state(), LoginState::Input);
    }

    #[test]
    fn test_escape_cancels() {
        let mut screen = LoginScreen::default();
        assert_eq!(screen.handle_key(key(KeyCode::Esc)), LoginAction::Cancel);
    }
}

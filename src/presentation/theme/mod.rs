//! Console colors.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::NotificationLevel;
use crate::domain::entities::LifecycleStatus;

/// Color palette shared by every screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(249, 115, 22),
            text: Color::White,
            muted: Color::DarkGray,
            border: Color::Gray,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}

impl Theme {
    #[must_use]
    pub const fn level_color(&self, level: &NotificationLevel) -> Color {
        match level {
            NotificationLevel::Info => self.accent,
            NotificationLevel::Success => self.success,
            NotificationLevel::Warn => self.warning,
            NotificationLevel::Error => self.error,
        }
    }

    #[must_use]
    pub const fn status_color(&self, status: LifecycleStatus) -> Color {
        match status {
            LifecycleStatus::Draft => self.muted,
            LifecycleStatus::Publishing => self.warning,
            LifecycleStatus::Published => self.success,
            LifecycleStatus::Retired => self.error,
        }
    }

    #[must_use]
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.border)
        }
    }

    #[must_use]
    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }
}

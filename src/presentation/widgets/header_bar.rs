use crate::application::services::Route;
use crate::presentation::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Navigable routes with their function key, in tab order.
pub const NAV_ROUTES: [(Route, &str); 3] = [
    (Route::Builder, "F1"),
    (Route::Viewer, "F2"),
    (Route::Store, "F3"),
];

pub struct HeaderBarStyle {
    pub background: Style,
    pub app_name: Style,
    pub version: Style,
    pub tab: Style,
    pub active_tab: Style,
    pub user: Style,
    pub signed_out: Style,
}

impl HeaderBarStyle {
    #[must_use]
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            app_name: Style::default()
                .bg(theme.accent)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            active_tab: Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            user: Style::default()
                .bg(theme.success)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            ..Self::default()
        }
    }
}

impl Default for HeaderBarStyle {
    fn default() -> Self {
        Self {
            background: Style::default(),
            app_name: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            version: Style::default().fg(Color::DarkGray),
            tab: Style::default().fg(Color::Gray),
            active_tab: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user: Style::default().fg(Color::Green),
            signed_out: Style::default().fg(Color::DarkGray),
        }
    }
}

pub struct HeaderBar<'a> {
    app_name: &'a str,
    version: &'a str,
    route: Route,
    username: Option<&'a str>,
    style: HeaderBarStyle,
}

impl<'a> HeaderBar<'a> {
    #[must_use]
    pub fn new(app_name: &'a str, version: &'a str) -> Self {
        Self {
            app_name,
            version,
            route: Route::Store,
            username: None,
            style: HeaderBarStyle::default(),
        }
    }

    #[must_use]
    pub const fn route(mut self, route: Route) -> Self {
        self.route = route;
        self
    }

    #[must_use]
    pub const fn username(mut self, username: Option<&'a str>) -> Self {
        self.username = username;
        self
    }

    #[must_use]
    pub fn style(mut self, style: HeaderBarStyle) -> Self {
        self.style = style;
        self
    }

    fn tab_spans(&self) -> Vec<Span<'static>> {
        let mut spans = Vec::new();
        for (route, key) in NAV_ROUTES {
            let style = if route == self.route {
                self.style.active_tab
            } else {
                self.style.tab
            };
            spans.push(Span::styled(format!(" {key} {} ", route.title()), style));
        }
        spans
    }

    fn session_text(&self) -> (String, Style) {
        match self.username {
            Some(name) => (format!(" ● {name} "), self.style.user),
            None => (" ○ signed out ".to_string(), self.style.signed_out),
        }
    }
}

impl Widget for HeaderBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        for x in area.left()..area.right() {
            buf[(x, area.y)]
                .set_char(' ')
                .set_style(self.style.background);
        }

        let mut left_spans = vec![
            Span::styled(
                format!(" {} ", self.app_name.to_uppercase()),
                self.style.app_name,
            ),
            Span::styled(format!(" v{} ", self.version), self.style.version),
            Span::raw(" "),
        ];
        left_spans.extend(self.tab_spans());
        let left_line = Line::from(left_spans);
        let left_width = u16::try_from(left_line.width()).unwrap_or(u16::MAX);
        Paragraph::new(left_line).render(
            Rect::new(area.x, area.y, left_width.min(area.width), 1),
            buf,
        );

        let (text, style) = self.session_text();
        let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
        if width < area.width.saturating_sub(left_width) {
            let right_x = area.right().saturating_sub(width);
            Paragraph::new(Line::from(Span::styled(text, style)))
                .render(Rect::new(right_x, area.y, width, 1), buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(header: HeaderBar<'_>) -> String {
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        header.render(area, &mut buf);
        (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect()
    }

    #[test]
    fn test_header_shows_tabs_and_user() {
        let text = line(
            HeaderBar::new("catalog", "0.1.0")
                .route(Route::Viewer)
                .username(Some("admin")),
        );

        assert!(text.contains("CATALOG"));
        assert!(text.contains("F2 Viewer"));
        assert!(text.contains("● admin"));
    }

    #[test]
    fn test_header_signed_out() {
        let text = line(HeaderBar::new("catalog", "0.1.0"));
        assert!(text.contains("signed out"));
    }
}

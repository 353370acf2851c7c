//! Table widget over [`DataTable`] state.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};
use serde::Serialize;

use crate::application::services::{DataTable, PageButton, SortDirection};
use crate::presentation::theme::Theme;

const SKELETON: &str = "░░░░░░░░";

pub struct DataTableView<'a, T> {
    table: &'a DataTable<T>,
    theme: &'a Theme,
    title: &'a str,
    focused: bool,
}

impl<'a, T: Serialize> DataTableView<'a, T> {
    #[must_use]
    pub fn new(table: &'a DataTable<T>, theme: &'a Theme) -> Self {
        Self {
            table,
            theme,
            title: "",
            focused: true,
        }
    }

    #[must_use]
    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn header(&self) -> Row<'a> {
        let cells = self.table.columns().iter().enumerate().map(|(i, column)| {
            let marker = match self.table.sort_direction(i) {
                Some(SortDirection::Ascending) => " ▲",
                Some(SortDirection::Descending) => " ▼",
                None if column.is_sortable() => " ↕",
                None => "",
            };
            Cell::from(format!("{}{marker}", column.label()))
        });
        Row::new(cells).style(
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        )
    }

    fn widths(&self) -> Vec<Constraint> {
        self.table
            .columns()
            .iter()
            .map(|c| c.fixed_width().map_or(Constraint::Fill(1), Constraint::Length))
            .collect()
    }

    fn pagination(&self) -> Line<'static> {
        let muted = self.theme.muted_style();
        let enabled = Style::default().fg(self.theme.text);
        let back = if self.table.can_go_back() { enabled } else { muted };
        let forward = if self.table.can_go_forward() { enabled } else { muted };

        let mut spans = vec![Span::styled("« ‹ ", back)];
        for button in self.table.page_buttons() {
            match button {
                PageButton::Page(page) if page == self.table.page() => {
                    spans.push(Span::styled(format!("[{page}]"), self.theme.selected_style()));
                }
                PageButton::Page(page) => spans.push(Span::styled(format!(" {page} "), enabled)),
                PageButton::Ellipsis => spans.push(Span::styled(" … ", muted)),
            }
        }
        spans.push(Span::styled(" › »", forward));
        Line::from(spans)
    }
}

impl<T: Serialize> Widget for DataTableView<'_, T> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused))
            .title(format!(" {} ", self.title))
            .title_bottom(Line::from(format!(" {} ", self.table.summary())).alignment(Alignment::Right));
        let inner = block.inner(area);
        block.render(area, buf);

        let [body, footer] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);

        if self.table.shows_empty_state() {
            let [_, middle, _] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .areas(body);
            Paragraph::new(self.table.empty_message())
                .style(self.theme.muted_style())
                .alignment(Alignment::Center)
                .render(middle, buf);
            return;
        }

        let rows: Vec<Row> = if self.table.is_loading() {
            let columns = self.table.columns().len();
            (0..self.table.placeholder_rows())
                .map(|_| Row::new(vec![Cell::from(SKELETON); columns]).style(self.theme.muted_style()))
                .collect()
        } else {
            let selected = self.table.selected_index();
            self.table
                .page_cells()
                .into_iter()
                .enumerate()
                .map(|(i, cells)| {
                    let row = Row::new(cells);
                    if self.focused && i == selected {
                        row.style(self.theme.selected_style())
                    } else {
                        row
                    }
                })
                .collect()
        };

        Table::new(rows, self.widths())
            .header(self.header())
            .column_spacing(2)
            .render(body, buf);

        if self.table.total_pages() > 1 {
            Paragraph::new(self.pagination())
                .alignment(Alignment::Center)
                .render(footer, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::Column;
    use serde_json::{Value, json};

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render(table: &DataTable<Value>) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        DataTableView::new(table, &theme).title("Prices").render(area, &mut buf);
        buffer_text(&buf)
    }

    #[test]
    fn test_renders_empty_message() {
        let table: DataTable<Value> =
            DataTable::new(vec![Column::field("Name", "name")], 5).with_empty_message("No prices yet");

        let text = render(&table);

        assert!(text.contains("No prices yet"));
        assert!(text.contains("Showing 0 of 0 entries"));
    }

    #[test]
    fn test_renders_rows_and_sort_marker() {
        let mut table = DataTable::new(
            vec![Column::field("Name", "name").sortable(), Column::field("Unit", "unit")],
            5,
        );
        table.set_records(vec![json!({"name": "Basic", "unit": "per month"})]);
        table.toggle_sort(0);

        let text = render(&table);

        assert!(text.contains("Name ▲"));
        assert!(text.contains("Basic"));
        assert!(text.contains("per month"));
    }

    #[test]
    fn test_loading_shows_skeleton_rows() {
        let mut table: DataTable<Value> = DataTable::new(vec![Column::field("Name", "name")], 3);
        table.set_loading(true);

        let text = render(&table);

        assert_eq!(text.matches(SKELETON).count(), 3);
    }
}

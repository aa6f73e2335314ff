//! Bordered tables for the dashboard pages.
//!
//! Renders a [`ratatui::widgets::Table`] with a styled header row and
//! alternating row colours. Cells are pre-formatted strings so the same
//! renderer serves the weekly class tables and the practice-exam table.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::themes::Theme;

/// Data for a table: column headers, their widths and formatted rows.
#[derive(Debug, Clone, Default)]
pub struct TableData {
    pub headers: Vec<&'static str>,
    /// Column widths in terminal cells, one per header.
    pub widths: Vec<u16>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn new(columns: &[(&'static str, u16)]) -> Self {
        Self {
            headers: columns.iter().map(|(h, _)| *h).collect(),
            widths: columns.iter().map(|(_, w)| *w).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Render `data` into `area` within a bordered block titled `title`.
pub fn render_table_view(frame: &mut Frame, area: Rect, title: &str, data: &TableData, theme: &Theme) {
    let header_cells = data
        .headers
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = data
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(row.iter().map(|c| Cell::from(c.clone()))).style(style)
        })
        .collect();

    let widths: Vec<Constraint> = data.widths.iter().map(|w| Constraint::Length(*w)).collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a "no data" placeholder with a short explanation.
pub fn render_no_data(frame: &mut Frame, area: Rect, title: &str, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No data to show", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.dim)),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title)),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

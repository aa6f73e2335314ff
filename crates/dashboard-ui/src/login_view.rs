//! Password prompt shown until the session authenticates.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::themes::Theme;

const MASK: char = '•';

/// Masked credential entry plus the last error message.
#[derive(Debug, Default)]
pub struct LoginForm {
    input: String,
    error: Option<String>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Take the typed credential, leaving the field empty.
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The typed credential with every character replaced by a mask.
    pub fn masked(&self) -> String {
        MASK.to_string().repeat(self.input.chars().count())
    }
}

/// Render the prompt centred in `area`.
pub fn render_login(frame: &mut Frame, area: Rect, form: &LoginForm, theme: &Theme) {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(7),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [_, boxed, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(44),
        Constraint::Fill(1),
    ])
    .areas(middle);

    let mut lines = vec![
        Line::from(Span::styled("Password", theme.label)),
        Line::from(vec![
            Span::styled(form.masked(), theme.input),
            Span::styled("_", theme.dim),
        ]),
        Line::from(""),
    ];
    match form.error() {
        Some(message) => lines.push(Line::from(Span::styled(message.to_string(), theme.error))),
        None => lines.push(Line::from(Span::styled(
            "Enter to submit, Esc to quit",
            theme.dim,
        ))),
    }

    let prompt = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(Span::styled(" Sign in ", theme.header)),
        );
    frame.render_widget(prompt, boxed);
}

// ── Tests ──────────────────────────────────────────────────────────────────────

use crate::themes::Theme;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Minimum width of the `=` separator under the title.
const MIN_SEPARATOR_WIDTH: usize = 60;

/// Dashboard header rendering four lines:
///
/// 1. `"{institution} - Student Dashboard"`.
/// 2. An `=` separator at least 60 columns wide, never narrower than the title.
/// 3. Page and selected student in `[ page | student ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    pub institution: &'a str,
    /// Current page label (e.g. "student", "class").
    pub page: &'a str,
    /// Selected student id, or `None` before data is loaded.
    pub student: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        institution: &'a str,
        page: &'a str,
        student: Option<&'a str>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            institution,
            page,
            student,
            theme,
        }
    }

    /// Title text for line 1.
    pub fn title(&self) -> String {
        format!("{} - Student Dashboard", self.institution)
    }

    /// Render the header as a `Vec<Line>` containing exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let title = self.title();
        let separator = "=".repeat(title.width().max(MIN_SEPARATOR_WIDTH));

        vec![
            Line::from(Span::styled(title, self.theme.header)),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.page.to_lowercase(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(
                    self.student.unwrap_or("no student").to_string(),
                    self.theme.header_accent,
                ),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::Theme;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_to_lines_count() {
        let theme = Theme::dark();
        let header = Header::new("Institution UMHB", "student", Some("S1"), &theme);
        assert_eq!(header.to_lines().len(), 4, "header must produce exactly 4 lines");
    }

    #[test]
    fn test_header_title_line_content() {
        let theme = Theme::dark();
        let header = Header::new("Institution UMHB", "student", Some("S1"), &theme);
        let lines = header.to_lines();
        assert_eq!(text(&lines[0]), "Institution UMHB - Student Dashboard");
    }

    #[test]
    fn test_header_info_line() {
        let theme = Theme::dark();
        let header = Header::new("X", "Class", Some("S042"), &theme);
        let lines = header.to_lines();

        assert_eq!(text(&lines[2]), "[ class | S042 ]");
        assert_eq!(lines[2].spans.len(), 5);
    }

    #[test]
    fn test_header_without_student() {
        let theme = Theme::dark();
        let header = Header::new("X", "student", None, &theme);
        assert_eq!(text(&header.to_lines()[2]), "[ student | no student ]");
    }

    #[test]
    fn test_header_separator_line() {
        let theme = Theme::dark();
        let header = Header::new("X", "student", None, &theme);
        let sep = text(&header.to_lines()[1]);
        assert_eq!(sep.chars().count(), 60, "separator must be 60 chars wide");
        assert!(sep.chars().all(|c| c == '='));
    }

    #[test]
    fn test_header_separator_grows_with_title() {
        let theme = Theme::dark();
        let long = "Université de Médecine et Sciences Appliquées du Grand Ouest";
        let header = Header::new(long, "student", None, &theme);
        let lines = header.to_lines();
        assert_eq!(
            text(&lines[1]).chars().count(),
            text(&lines[0]).width(),
            "separator must match the title's display width"
        );
    }

    #[test]
    fn test_header_empty_fourth_line() {
        let theme = Theme::dark();
        let header = Header::new("X", "student", None, &theme);
        assert!(text(&header.to_lines()[3]).is_empty());
    }
}

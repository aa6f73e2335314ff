//! Main application state and TUI event loop for the tutoring dashboard.
//!
//! [`App`] owns the theme, the current page, the login form and the
//! [`DashboardSession`]. Key handling is kept separate from terminal I/O so
//! it can be exercised directly in tests.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame, Terminal,
};

use dashboard_core::error::DashboardError;
use dashboard_runtime::DashboardSession;

use crate::class_view;
use crate::components::header::Header;
use crate::login_view::{self, LoginForm};
use crate::student_view;
use crate::table_view;
use crate::themes::Theme;

// ── Page ──────────────────────────────────────────────────────────────────────

/// Which page the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// One student's charts and practice exams.
    Student,
    /// Class-wide weekly averages and the narrative summary.
    Class,
}

impl Page {
    /// Parse a page name; anything other than `"class"` is the student page.
    pub fn from_name(name: &str) -> Self {
        match name {
            "class" => Page::Class,
            _ => Page::Student,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Page::Student => "student",
            Page::Class => "class",
        }
    }

    fn toggled(self) -> Self {
        match self {
            Page::Student => Page::Class,
            Page::Class => Page::Student,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub page: Page,
    pub institution: String,
    pub session: DashboardSession,
    /// Student to select once data is loaded.
    pub preferred_student: Option<String>,
    pub login: LoginForm,
    /// Load failure shown in place of the page body.
    pub status: Option<String>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Raised from outside the event loop, e.g. by a signal handler.
    shutdown: Arc<AtomicBool>,
    secret: String,
}

impl App {
    pub fn new(
        theme_name: &str,
        page: Page,
        institution: String,
        session: DashboardSession,
        secret: String,
    ) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            page,
            institution,
            session,
            preferred_student: None,
            login: LoginForm::new(),
            status: None,
            should_quit: false,
            shutdown: Arc::new(AtomicBool::new(false)),
            secret,
        }
    }

    pub fn with_preferred_student(mut self, student: Option<String>) -> Self {
        self.preferred_student = student;
        self
    }

    /// Flag that stops [`run`](Self::run) within one tick once set.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// `true` once the user quit or the shutdown flag was raised.
    pub fn quit_requested(&self) -> bool {
        self.should_quit || self.shutdown.load(Ordering::Relaxed)
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the TUI until the user quits or the shutdown flag is raised.
    ///
    /// Blocks the calling thread, polling `crossterm` events with a 250 ms
    /// timeout. Returns the id of the student selected when the loop ended,
    /// if any.
    pub fn run(mut self) -> io::Result<Option<String>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.quit_requested() {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result.map(|()| self.session.selected_student_id().map(str::to_string))
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Apply one key press to the application state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if !self.session.is_authenticated() {
            self.handle_login_key(key.code);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => self.page = self.page.toggled(),
            KeyCode::Down | KeyCode::Char('j') => self.session.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.session.select_previous(),
            KeyCode::Char('r') if self.status.is_some() => self.retry(),
            _ => {}
        }
    }

    fn handle_login_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => {
                let credential = self.login.take_input();
                self.submit(credential);
            }
            KeyCode::Backspace => self.login.backspace(),
            KeyCode::Char(c) => self.login.push(c),
            _ => {}
        }
    }

    /// Authenticate (or, once authenticated, retry a failed load).
    fn submit(&mut self, credential: String) {
        match self.session.authenticate(&credential, &self.secret) {
            Ok(()) => {
                self.login.clear_error();
                self.status = None;
                self.session
                    .select_preferred(self.preferred_student.as_deref());
            }
            Err(DashboardError::AuthenticationFailed) => {
                self.login.set_error(DashboardError::AuthenticationFailed.to_string());
            }
            Err(e) => {
                tracing::error!(error = %e, "dashboard data unavailable");
                self.status = Some(e.to_string());
            }
        }
    }

    fn retry(&mut self) {
        match self.session.retry_load() {
            Ok(()) => {
                self.status = None;
                self.session
                    .select_preferred(self.preferred_student.as_deref());
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        if !self.session.is_authenticated() {
            login_view::render_login(frame, area, &self.login, &self.theme);
            return;
        }

        let [head, body, help] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

        let header = Header::new(
            &self.institution,
            self.page.as_str(),
            self.session.selected_student_id(),
            &self.theme,
        );
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), head);

        if let Some(status) = &self.status {
            table_view::render_no_data(frame, body, "Error", status, &self.theme);
        } else {
            self.render_page(frame, body);
        }

        let hint = match self.page {
            _ if self.status.is_some() => "r: retry   q: quit",
            Page::Student => "Tab: class page   Up/Down: change student   q: quit",
            Page::Class => "Tab: student page   q: quit",
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(hint, self.theme.dim))),
            help,
        );
    }

    fn render_page(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        match self.page {
            Page::Student => match self.session.student() {
                Some(series) => student_view::render_student_view(frame, area, series, &self.theme),
                None => table_view::render_no_data(
                    frame,
                    area,
                    "Student",
                    "No students found in the engagement data.",
                    &self.theme,
                ),
            },
            Page::Class => match (self.session.class(), self.session.summary()) {
                (Some(class), Some(summary)) => {
                    class_view::render_class_view(frame, area, class, summary, &self.theme)
                }
                _ => table_view::render_no_data(
                    frame,
                    area,
                    "Class",
                    "Class data has not been loaded.",
                    &self.theme,
                ),
            },
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::auth::AuthState;
    use ratatui::backend::TestBackend;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const ENGAGEMENT: &str = "\
student_id,week,start_date,end_date,num_attended_large_session,num_scheduled_large_session,num_attended_small_session,num_scheduled_small_session,completed_lessons,completed_mandatory_lessons,percentage_mandatory_complete,total_completed_passages_discrete_sets,sciences_accuracy,cars_accuracy,class_accuracy,time_spent
A,1,2024-01-01,2024-01-07,1,2,1,1,3,2,0.5,4,0.80,0.50,0.7,01:30:00
B,1,2024-01-01,2024-01-07,2,2,0,1,5,3,0.6,2,0.60,0.40,0.5,02:00:00
A,2,2024-01-08,2024-01-14,2,2,0,0,4,2,0.75,6,0.85,0.65,0.75,00:45:00
";

    const TESTS: &str = "\
student_id,test_name,test_date,actual_exam_score,low_predicted_exam_score,high_predicted_exam_score
A,FL1,2024-01-10,500,495,505
";

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    fn make_app(page: Page) -> (App, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let e = write(&dir, "engagement.csv", ENGAGEMENT);
        let t = write(&dir, "tests.csv", TESTS);
        let session = DashboardSession::new(e, t);
        let app = App::new("dark", page, "Institution UMHB".to_string(), session, "pw".to_string());
        (app, dir)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // ── Page ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_page_from_name() {
        assert_eq!(Page::from_name("class"), Page::Class);
        assert_eq!(Page::from_name("student"), Page::Student);
        assert_eq!(Page::from_name("anything"), Page::Student);
        assert_eq!(Page::Class.as_str(), "class");
    }

    // ── Login ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_wrong_password_shows_error() {
        let (mut app, _dir) = make_app(Page::Student);
        type_str(&mut app, "guess");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.session.auth_state(), AuthState::Rejected);
        assert_eq!(app.login.error(), Some("Password incorrect"));
        assert!(app.session.class().is_none());
        assert!(draw(&app, 80, 20).contains("Password incorrect"));
    }

    #[test]
    fn test_q_types_into_password_field() {
        let (mut app, _dir) = make_app(Page::Student);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.login.masked(), "•");
    }

    #[test]
    fn test_correct_password_loads_and_selects_preferred() {
        let (app, _dir) = make_app(Page::Student);
        let mut app = app.with_preferred_student(Some("B".to_string()));
        type_str(&mut app, "pw");
        press(&mut app, KeyCode::Enter);

        assert!(app.session.is_authenticated());
        assert!(app.login.error().is_none());
        assert_eq!(app.session.selected_student_id(), Some("B"));
    }

    #[test]
    fn test_missing_data_file_sets_status() {
        let dir = TempDir::new().unwrap();
        let session = DashboardSession::new(dir.path().join("missing.csv"), dir.path().join("t.csv"));
        let mut app = App::new("dark", Page::Student, "X".to_string(), session, "pw".to_string());
        type_str(&mut app, "pw");
        press(&mut app, KeyCode::Enter);

        assert!(app.session.is_authenticated());
        assert!(app.status.as_deref().unwrap().contains("missing.csv"));
    }

    // ── Navigation ────────────────────────────────────────────────────────────

    #[test]
    fn test_tab_and_selection_keys() {
        let (mut app, _dir) = make_app(Page::Student);
        type_str(&mut app, "pw");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Down);
        assert_eq!(app.session.selected_student_id(), Some("B"));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.session.selected_student_id(), Some("A"));

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.page, Page::Class);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.page, Page::Student);
    }

    #[test]
    fn test_shutdown_handle_requests_quit() {
        let (app, _dir) = make_app(Page::Student);
        assert!(!app.quit_requested());

        app.shutdown_handle().store(true, Ordering::Relaxed);
        assert!(app.quit_requested());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _dir) = make_app(Page::Student);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);

        let (mut app, _dir) = make_app(Page::Student);
        type_str(&mut app, "pw");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_pages_after_login() {
        let (mut app, _dir) = make_app(Page::Class);
        type_str(&mut app, "pw");
        press(&mut app, KeyCode::Enter);

        let class_page = draw(&app, 140, 40);
        assert!(class_page.contains("Institution UMHB - Student Dashboard"));
        assert!(class_page.contains("Over the course of 2 weeks:"));

        press(&mut app, KeyCode::Tab);
        let student_page = draw(&app, 140, 50);
        assert!(student_page.contains("[ student | A ]"));
        assert!(student_page.contains("Completed Lessons"));
    }
}

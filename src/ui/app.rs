use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tracing::error;

use crate::models::Contact;

use super::controller::{Action, Controller, Outcome, Warning};
use super::forms::{ContactForm, FormField};
use super::helpers::{centered_rect, mailto_uri, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Title bar plus its border.
const TITLE_HEIGHT: u16 = 3;
/// Four field lines plus the block border.
const FORM_HEIGHT: u16 = 6;
/// Rows skipped by PageUp/PageDown in the contact list.
const PAGE_STEP: isize = 5;
/// Width of the right-aligned `Label: ` prefix rendered by `build_line`.
const FIELD_PREFIX_WIDTH: u16 = 10;

/// Which half of the screen receives plain key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form,
    List,
}

/// A blocking warning dialog swallows all input until dismissed.
enum Mode {
    Normal,
    Warning(Warning),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Terminal front-end state wrapped around the [`Controller`].
pub struct App {
    controller: Controller,
    focus: Focus,
    cursor: usize,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            focus: Focus::Form,
            cursor: 0,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Hand the controller back so the caller can close it explicitly.
    pub fn into_controller(self) -> Controller {
        self.controller
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Handle a key pressed without modifiers. Returns `true` when the user
    /// asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        if let Mode::Warning(_) = self.mode {
            if matches!(code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.mode = Mode::Normal;
            }
            return Ok(false);
        }

        match self.focus {
            Focus::Form => self.handle_form_key(code),
            Focus::List => self.handle_list_key(code),
        }
    }

    /// Handle `Ctrl+<ch>` shortcuts, which work regardless of focus.
    pub fn handle_ctrl(&mut self, ch: char) -> Result<bool> {
        if let Mode::Warning(_) = self.mode {
            return Ok(false);
        }

        let action = match ch.to_ascii_lowercase() {
            'q' | 'c' => return Ok(true),
            'a' => Action::Add,
            'u' => Action::Update,
            'd' => Action::Delete,
            'f' => Action::Search,
            'r' => Action::Refresh,
            'n' => Action::Clear,
            _ => return Ok(false),
        };
        self.run_action(action);
        Ok(false)
    }

    fn handle_form_key(&mut self, code: KeyCode) -> Result<bool> {
        let form = self.controller.form_mut();
        match code {
            KeyCode::Esc => {
                self.focus = Focus::List;
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::Enter => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_list_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Form,
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-PAGE_STEP),
            KeyCode::PageDown => self.move_cursor(PAGE_STEP),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.controller.rows().len().saturating_sub(1),
            KeyCode::Enter => {
                if let Some(id) = self.current_row().map(|contact| contact.id) {
                    self.run_action(Action::Select(id));
                    self.focus = Focus::Form;
                } else {
                    self.set_status("No contact to select.", StatusKind::Error);
                }
            }
            KeyCode::Char('m') | KeyCode::Char('M') => self.open_mail(),
            _ => {}
        }
        Ok(false)
    }

    /// Dispatch through the controller and reflect the outcome on screen.
    /// Storage faults abort the action and land on the status line.
    fn run_action(&mut self, action: Action) {
        match self.controller.dispatch(action) {
            Ok(outcome) => self.apply_outcome(outcome),
            Err(err) => {
                let detail = format!("{err:#}");
                error!(?action, error = %detail, "action failed");
                self.set_status(surface_error(&err), StatusKind::Error);
            }
        }
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Added(contact) => {
                self.focus_row(contact.id);
                self.set_status(format!("Added {}.", contact.name), StatusKind::Info);
            }
            Outcome::Updated(id) => {
                self.focus_row(id);
                self.set_status("Contact updated.", StatusKind::Info);
            }
            Outcome::Deleted(_) => {
                self.clamp_cursor();
                self.set_status("Contact deleted.", StatusKind::Info);
            }
            Outcome::Selected(id) => {
                let name = self
                    .controller
                    .rows()
                    .iter()
                    .find(|contact| contact.id == id)
                    .map(|contact| contact.name.clone())
                    .unwrap_or_default();
                self.set_status(format!("Editing {name}."), StatusKind::Info);
            }
            Outcome::Searched(count) => {
                self.cursor = 0;
                let noun = if count == 1 { "contact" } else { "contacts" };
                self.set_status(
                    format!("{count} matching {noun}. Ctrl+R shows all."),
                    StatusKind::Info,
                );
            }
            Outcome::Refreshed(count) => {
                self.clamp_cursor();
                self.set_status(format!("Showing all {count} contacts."), StatusKind::Info);
            }
            Outcome::Cleared => {
                self.controller.form_mut().focus(FormField::Name);
                self.focus = Focus::Form;
                self.clear_status();
            }
            Outcome::Unchanged => {}
            Outcome::Rejected(warning) => {
                self.clear_status();
                self.mode = Mode::Warning(warning);
            }
        }
    }

    fn open_mail(&mut self) {
        let Some(contact) = self.current_row().cloned() else {
            return;
        };
        match mailto_uri(&contact.email) {
            None => self.set_status(
                format!("{} has no email address.", contact.name),
                StatusKind::Error,
            ),
            Some(uri) => match open_link(&uri) {
                Ok(()) => {
                    self.set_status(format!("Writing to {}.", contact.email), StatusKind::Info)
                }
                Err(err) => self.set_status(
                    format!("Failed to open mail client: {err}"),
                    StatusKind::Error,
                ),
            },
        }
    }

    fn current_row(&self) -> Option<&Contact> {
        self.controller.rows().get(self.cursor)
    }

    fn move_cursor(&mut self, offset: isize) {
        let len = self.controller.rows().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let target = self.cursor as isize + offset;
        self.cursor = target.clamp(0, len as isize - 1) as usize;
    }

    fn focus_row(&mut self, id: i64) {
        match self.controller.rows().iter().position(|contact| contact.id == id) {
            Some(index) => self.cursor = index,
            None => self.clamp_cursor(),
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.controller.rows().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TITLE_HEIGHT),
                Constraint::Length(FORM_HEIGHT),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_title(frame, chunks[0]);
        self.draw_form(frame, chunks[1]);
        self.draw_action_bar(frame, chunks[2]);
        self.draw_table(frame, chunks[3]);
        self.draw_footer(frame, chunks[4]);

        if let Mode::Warning(warning) = &self.mode {
            self.draw_warning(frame, area, warning);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let title = Paragraph::new(Span::styled(
            "Contact Book",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(title, area);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect) {
        let form = self.controller.form();
        let title = match self.controller.selection() {
            Some(id) => format!("Edit Contact #{id}"),
            None => "New Contact".to_string(),
        };
        let border_style = if self.focus == Focus::Form {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let focused = self.focus == Focus::Form;
        let lines: Vec<Line> = FormField::ALL
            .iter()
            .map(|field| form.build_line(*field, focused))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);

        if focused && matches!(self.mode, Mode::Normal) && inner.height > 0 {
            let (cursor_x, cursor_y) = form_cursor(inner, form);
            if cursor_y < inner.bottom() {
                frame.set_cursor_position((cursor_x, cursor_y));
            }
        }
    }

    fn draw_action_bar(&self, frame: &mut Frame, area: Rect) {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let line = Line::from(vec![
            Span::styled("[^A]", key_style),
            Span::raw(" Add   "),
            Span::styled("[^U]", key_style),
            Span::raw(" Update   "),
            Span::styled("[^D]", key_style),
            Span::raw(" Delete   "),
            Span::styled("[^F]", key_style),
            Span::raw(" Search   "),
            Span::styled("[^R]", key_style),
            Span::raw(" Show All   "),
            Span::styled("[^N]", key_style),
            Span::raw(" Clear"),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let rows = self.controller.rows();
        let border_style = if self.focus == Focus::List {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(format!("Contacts ({})", rows.len()))
            .borders(Borders::ALL)
            .border_style(border_style);

        if rows.is_empty() {
            let message = Paragraph::new("No contacts yet. Fill in the form and press Ctrl+A.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let selection = self.controller.selection();
        let table_rows: Vec<Row> = rows
            .iter()
            .map(|contact| {
                let row = Row::new(vec![
                    contact.name.clone(),
                    contact.phone.clone(),
                    contact.email.clone(),
                    contact.address.clone(),
                ]);
                if selection == Some(contact.id) {
                    row.style(Style::default().fg(Color::Green))
                } else {
                    row
                }
            })
            .collect();

        let header = Row::new(vec!["Name", "Phone", "Email", "Address"])
            .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));
        let widths = [
            Constraint::Percentage(22),
            Constraint::Percentage(18),
            Constraint::Percentage(28),
            Constraint::Percentage(32),
        ];
        let highlight = if self.focus == Focus::List {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let table = Table::new(table_rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(highlight)
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(Some(self.cursor));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match self.focus {
            Focus::Form => Line::from(vec![
                Span::styled("[Tab/↑↓]", key_style),
                Span::raw(" Field   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" List   "),
                Span::styled("[^Q]", key_style),
                Span::raw(" Quit"),
            ]),
            Focus::List => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Move   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Select   "),
                Span::styled("[m]", key_style),
                Span::raw(" Email   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Form   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_warning(&self, frame: &mut Frame, area: Rect, warning: &Warning) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Warning")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                warning.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter to dismiss",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }
}

/// Cursor position after the text of the active field, pinned to the last
/// column of `inner` when the value is wider than the panel.
fn form_cursor(inner: Rect, form: &ContactForm) -> (u16, u16) {
    let width = u16::try_from(form.value_width(form.active)).unwrap_or(u16::MAX);
    let x = inner
        .x
        .saturating_add(FIELD_PREFIX_WIDTH)
        .saturating_add(width)
        .min(inner.right().saturating_sub(1));
    let y = inner.y.saturating_add(form.active.index() as u16);
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::ui::controller::Verb;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tempfile::TempDir;

    fn app() -> App {
        App::new(Controller::new(open_in_memory().unwrap()).unwrap())
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn add_contact(app: &mut App, name: &str, phone: &str) {
        type_text(app, name);
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(app, phone);
        app.handle_ctrl('a').unwrap();
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn typing_and_ctrl_a_adds_a_contact() {
        let mut app = app();

        add_contact(&mut app, "Alice", "555-1000");

        let rows = app.controller.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields(), ("Alice", "555-1000", "", ""));
        assert!(app.controller.form().name.is_empty());
    }

    #[test]
    fn warning_dialog_blocks_input_until_dismissed() {
        let mut app = app();

        app.handle_ctrl('u').unwrap();
        assert!(matches!(
            app.mode,
            Mode::Warning(Warning::NoSelection(Verb::Update))
        ));

        type_text(&mut app, "ignored");
        app.handle_ctrl('a').unwrap();
        assert!(app.controller.form().name.is_empty());
        assert!(app.controller.rows().is_empty());

        app.handle_key(KeyCode::Enter).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn enter_in_list_selects_row_for_editing() {
        let mut app = app();
        add_contact(&mut app, "Alice", "555-1000");

        app.handle_key(KeyCode::Esc).unwrap();
        assert_eq!(app.focus(), Focus::List);
        app.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(app.focus(), Focus::Form);
        let id = app.controller.rows()[0].id;
        assert_eq!(app.controller.selection(), Some(id));
        assert_eq!(app.controller.form().name, "Alice");

        // Append to the name, then save.
        type_text(&mut app, "2");
        app.handle_ctrl('u').unwrap();
        assert_eq!(app.controller.rows()[0].name, "Alice2");
        assert_eq!(app.controller.rows()[0].id, id);
    }

    #[test]
    fn delete_from_the_list_removes_the_row() {
        let mut app = app();
        add_contact(&mut app, "Alice", "555-1000");
        add_contact(&mut app, "Bob", "555-2000");

        app.handle_key(KeyCode::Esc).unwrap();
        app.handle_key(KeyCode::Home).unwrap();
        let doomed = app.controller.rows()[0].id;
        app.handle_key(KeyCode::Enter).unwrap();
        app.handle_ctrl('d').unwrap();

        assert_eq!(app.controller.rows().len(), 1);
        assert!(app.controller.rows().iter().all(|c| c.id != doomed));
    }

    #[test]
    fn list_cursor_stays_in_bounds() {
        let mut app = app();
        add_contact(&mut app, "Alice", "555-1000");
        add_contact(&mut app, "Bob", "555-2000");
        app.handle_key(KeyCode::Esc).unwrap();

        app.handle_key(KeyCode::PageDown).unwrap();
        assert_eq!(app.cursor, 1);
        app.handle_key(KeyCode::PageUp).unwrap();
        assert_eq!(app.cursor, 0);
        app.handle_key(KeyCode::Up).unwrap();
        assert_eq!(app.cursor, 0);
        app.handle_key(KeyCode::End).unwrap();
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn q_quits_only_from_the_list() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Char('q')).unwrap());
        assert_eq!(app.controller.form().name, "q");

        app.handle_key(KeyCode::Esc).unwrap();
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
        assert!(app.handle_ctrl('q').unwrap());
    }

    #[test]
    fn search_then_refresh_restores_full_list() {
        let mut app = app();
        add_contact(&mut app, "Alice", "555-1000");
        add_contact(&mut app, "Bob", "555-2000");

        type_text(&mut app, "bo");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "none");
        app.handle_ctrl('f').unwrap();
        assert_eq!(app.controller.rows().len(), 1);
        assert_eq!(app.controller.rows()[0].name, "Bob");
        assert_eq!(app.controller.form().name, "bo");

        app.handle_ctrl('r').unwrap();
        assert_eq!(app.controller.rows().len(), 2);
    }

    #[test]
    fn draw_shows_form_table_and_warning() {
        let mut app = app();
        add_contact(&mut app, "Alice", "555-1000");

        let screen = render(&app);
        assert!(screen.contains("Contact Book"));
        assert!(screen.contains("New Contact"));
        assert!(screen.contains("Alice"));
        assert!(screen.contains("555-1000"));
        assert!(!screen.contains("Warning"));

        app.handle_ctrl('d').unwrap();
        let screen = render(&app);
        assert!(screen.contains("Warning"));
        assert!(screen.contains("Select a contact to delete."));
    }

    #[test]
    fn storage_fault_keeps_the_app_running_and_reports_in_red() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("contacts.db");
        let mut app = App::new(Controller::open(&db_path).unwrap());
        rusqlite::Connection::open(&db_path)
            .unwrap()
            .execute("DROP TABLE contacts", [])
            .unwrap();

        type_text(&mut app, "Alice");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "555-1000");
        assert!(!app.handle_ctrl('a').unwrap());

        let status = app.status.as_ref().expect("status should be set");
        assert!(matches!(status.kind, StatusKind::Error));
        assert!(status.text.contains("no such table"), "{}", status.text);
        assert_eq!(app.controller.form().name, "Alice");
        assert_eq!(app.controller.form().phone, "555-1000");
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn mail_shortcut_without_email_reports_an_error() {
        let mut app = app();
        add_contact(&mut app, "Alice", "555-1000");

        app.handle_key(KeyCode::Esc).unwrap();
        app.handle_key(KeyCode::Char('m')).unwrap();

        let status = app.status.as_ref().expect("status should be set");
        assert!(matches!(status.kind, StatusKind::Error));
        assert_eq!(status.text, "Alice has no email address.");
    }

    #[test]
    fn form_cursor_follows_display_width() {
        let inner = Rect::new(1, 1, 60, 4);
        let mut form = ContactForm::default();
        form.set(FormField::Name, "山田");
        assert_eq!(form_cursor(inner, &form), (1 + FIELD_PREFIX_WIDTH + 4, 1));

        form.focus(FormField::Address);
        assert_eq!(form_cursor(inner, &form), (1 + FIELD_PREFIX_WIDTH, 4));
    }

    #[test]
    fn form_cursor_is_pinned_for_huge_values() {
        let inner = Rect::new(1, 1, 60, 4);
        let mut form = ContactForm::default();
        form.set(FormField::Name, "x".repeat(70_000));
        assert_eq!(form_cursor(inner, &form), (60, 1));

        let mut app = app();
        app.controller
            .form_mut()
            .set(FormField::Name, "x".repeat(70_000));
        let screen = render(&app);
        assert!(screen.contains("Contact Book"));
    }

    #[test]
    fn draw_handles_an_empty_book() {
        let app = app();
        let screen = render(&app);
        assert!(screen.contains("No contacts yet."));
    }
}

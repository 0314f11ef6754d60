//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which manages the TUI state,
//! handles user input, and renders the task list, the timer panel and the
//! statistics chart.

use std::time::Instant;

use chrono::Local;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::error::TrackerError;
use crate::fields::{Priority, StatusFilter};
use crate::storage::KeyValueStore;
use crate::task::{Task, TaskId};
use crate::tracker::Tracker;
use crate::tui::{
    colors::{phase_color, priority_color, rgb, DARK_RED, SLATE},
    enums::{next_priority_filter, next_status_filter, AppState},
    task_form::{TaskForm, DEADLINE_FIELD, DESCRIPTION_FIELD, FIELD_LABELS, PRIORITY_FIELD, TITLE_FIELD},
    utils::centered_rect,
};
use crate::view::{task_rows, TaskAction, TaskRow};

/// Main application state for the terminal user interface.
pub struct App<S: KeyValueStore> {
    state: AppState,
    tracker: Tracker<S>,
    task_list_state: TableState,
    /// Ids of the rows currently shown, in display order.
    visible: Vec<TaskId>,
    task_form: TaskForm,
    status_message: String,
    priority_filter: Option<Priority>,
    status_filter: Option<StatusFilter>,
    /// Row action waiting for confirmation.
    pending_action: Option<TaskAction>,
    notice: String,
    notice_return: AppState,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(tracker: Tracker<S>) -> Self {
        let mut app = App {
            state: AppState::TaskList,
            tracker,
            task_list_state: TableState::default(),
            visible: Vec::new(),
            task_form: TaskForm::new(),
            status_message: String::new(),
            priority_filter: None,
            status_filter: None,
            pending_action: None,
            notice: String::new(),
            notice_return: AppState::TaskList,
        };
        app.update_visible();
        app
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn tracker(&self) -> &Tracker<S> {
        &self.tracker
    }

    pub fn visible(&self) -> &[TaskId] {
        &self.visible
    }

    /// Recompute the visible rows from the filters, keeping the selection on
    /// the same task when it is still shown.
    fn update_visible(&mut self) {
        let old_selected = self.selected_id();
        self.visible = self
            .tracker
            .filtered(self.priority_filter, self.status_filter)
            .iter()
            .map(|t| t.id)
            .collect();

        let new_index = old_selected
            .and_then(|id| self.visible.iter().position(|&v| v == id))
            .or_else(|| {
                let last = self.visible.len().checked_sub(1)?;
                Some(self.task_list_state.selected().unwrap_or(0).min(last))
            });
        self.task_list_state.select(new_index);
    }

    fn selected_id(&self) -> Option<TaskId> {
        self.task_list_state
            .selected()
            .and_then(|i| self.visible.get(i))
            .copied()
    }

    /// Display row of the selected task, carrying its actions.
    fn selected_row(&self) -> Option<TaskRow> {
        let task = self.tracker.db().get(self.selected_id()?)?;
        Some(TaskRow::from_task(task, Local::now().date_naive()))
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    /// Show a blocking message over the current screen.
    fn show_notice(&mut self, msg: impl Into<String>) {
        self.notice = msg.into();
        if self.state != AppState::Notice {
            self.notice_return = self.state;
        }
        self.state = AppState::Notice;
    }

    /// Advance the timer to `now`. Returns the number of phase changes.
    pub fn on_tick(&mut self, now: Instant) -> usize {
        match self.tracker.advance(now) {
            Ok(events) => {
                if let Some(last) = events.last() {
                    self.show_notice(last.message());
                    self.update_visible();
                }
                events.len()
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to record timer progress");
                self.show_notice(format!("Could not save progress: {e}"));
                0
            }
        }
    }

    /// Run a row action on a task.
    fn perform(&mut self, action: TaskAction, now: Instant) {
        match action {
            TaskAction::StartTimer(id) => match self.tracker.start_timer(id, now) {
                Ok(()) => {
                    let title = self.tracker.current_task().map(|t| t.title.clone()).unwrap_or_default();
                    self.set_status_message(format!("Timer started for '{title}'"));
                }
                Err(e) => self.show_notice(e.to_string()),
            },
            TaskAction::Delete(id) => match self.tracker.delete_task(id) {
                Ok(task) => {
                    self.update_visible();
                    self.set_status_message(format!("Deleted '{}'", task.title));
                }
                Err(e) => self.show_notice(e.to_string()),
            },
        }
    }

    /// Handle one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers, now: Instant) -> bool {
        if modifiers.contains(KeyModifiers::CONTROL) && matches!(key, KeyCode::Char('c') | KeyCode::Char('q')) {
            return true;
        }
        self.status_message.clear();
        match self.state {
            AppState::TaskList => return self.handle_task_list_input(key, now),
            AppState::AddTask => self.handle_form_input(key),
            AppState::Help => {
                if matches!(key, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::Char('?')) {
                    self.state = AppState::TaskList;
                }
            }
            AppState::Confirm => self.handle_confirm_input(key, now),
            AppState::Notice => {
                self.state = self.notice_return;
                self.notice.clear();
            }
        }
        false
    }

    fn handle_task_list_input(&mut self, key: KeyCode, now: Instant) -> bool {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(selected) = self.task_list_state.selected() {
                    self.task_list_state.select(Some(selected.saturating_sub(1)));
                } else if !self.visible.is_empty() {
                    self.task_list_state.select(Some(0));
                }
            }
            KeyCode::Down | KeyCode::Char('j') => match self.task_list_state.selected() {
                Some(selected) if selected + 1 < self.visible.len() => {
                    self.task_list_state.select(Some(selected + 1));
                }
                None if !self.visible.is_empty() => self.task_list_state.select(Some(0)),
                _ => {}
            },
            KeyCode::Char('a') => {
                self.task_form = TaskForm::new();
                self.state = AppState::AddTask;
            }
            KeyCode::Enter | KeyCode::Char('t') => {
                if let Some(TaskRow { actions: [start, _], .. }) = self.selected_row() {
                    self.perform(start, now);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(TaskRow { actions: [_, delete], .. }) = self.selected_row() {
                    self.pending_action = Some(delete);
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('c') | KeyCode::Char(' ') => {
                if let Some(id) = self.selected_id() {
                    match self.tracker.toggle_completed(id) {
                        Ok(done) => {
                            self.update_visible();
                            self.set_status_message(if done { "Marked completed" } else { "Marked pending" });
                        }
                        Err(e) => self.show_notice(e.to_string()),
                    }
                }
            }
            KeyCode::Char('g') => match self.tracker.resume_timer(now) {
                Ok(true) => self.set_status_message("Timer running"),
                Ok(false) => self.set_status_message("Select a task and press Enter to start the timer"),
                Err(e) => self.show_notice(e.to_string()),
            },
            KeyCode::Char('r') => {
                self.tracker.reset_timer();
                self.set_status_message("Timer reset");
            }
            KeyCode::Char('p') => {
                self.priority_filter = next_priority_filter(self.priority_filter);
                self.update_visible();
            }
            KeyCode::Char('s') => {
                self.status_filter = next_status_filter(self.status_filter);
                self.update_visible();
            }
            KeyCode::Char('h') | KeyCode::Char('?') => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn handle_form_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.state = AppState::TaskList,
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        match self.tracker.add_task(self.task_form.to_draft()) {
            Ok(id) => {
                self.state = AppState::TaskList;
                self.update_visible();
                if let Some(index) = self.visible.iter().position(|&v| v == id) {
                    self.task_list_state.select(Some(index));
                }
                self.set_status_message("Task created");
            }
            Err(e @ TrackerError::Validation(_)) => {
                self.show_notice(format!("Please fill in all required fields: {e}"))
            }
            Err(e) => {
                tracing::error!(error = %e, "could not save new task");
                self.show_notice(e.to_string());
            }
        }
    }

    fn handle_confirm_input(&mut self, key: KeyCode, now: Instant) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.state = AppState::TaskList;
                if let Some(action) = self.pending_action.take() {
                    self.perform(action, now);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = AppState::TaskList;
                self.pending_action = None;
            }
            _ => {}
        }
    }

    fn filter_summary(&self) -> String {
        format!(
            "Priority: {}  Status: {}",
            self.priority_filter.map_or("All", Priority::as_str),
            self.status_filter.map_or("All", StatusFilter::as_str),
        )
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let header = Paragraph::new(Line::from(vec![
            Span::styled("POMO", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(self.filter_summary(), Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC)),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    /// Render the task table; the whole table is rebuilt every frame.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let today = Local::now().date_naive();
        let bound = self.tracker.timer().task();
        let tasks: Vec<&Task> = self.visible.iter().filter_map(|&id| self.tracker.db().get(id)).collect();

        let header = Row::new(["ID", "Priority", "Deadline", "Due", "Status", "Pomo", "Title"].map(|h| {
            Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))
        }))
        .style(Style::default().bg(SLATE).fg(Color::White))
        .height(1);

        let rows: Vec<Row> = tasks
            .iter()
            .zip(task_rows(tasks.iter().copied(), today))
            .map(|(task, row)| {
                let style = if task.completed {
                    Style::default().fg(Color::DarkGray)
                } else if bound == Some(task.id) {
                    Style::default().fg(phase_color(self.tracker.timer().phase())).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                Row::new(vec![
                    Cell::from(row.id.to_string()),
                    Cell::from(row.priority).style(Style::default().fg(priority_color(task.priority))),
                    Cell::from(row.deadline),
                    Cell::from(row.due),
                    Cell::from(row.status),
                    Cell::from(row.pomodoros.to_string()),
                    Cell::from(row.title),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(4),  // ID
            Constraint::Length(9),  // Priority
            Constraint::Length(11), // Deadline
            Constraint::Length(10), // Due
            Constraint::Length(10), // Status
            Constraint::Length(5),  // Pomo
            Constraint::Min(20),    // Title
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{}) - Press 'h' for help",
                self.visible.len(),
                self.tracker.tasks().len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.task_list_state);
    }

    fn render_timer(&self, f: &mut Frame, area: Rect) {
        let timer = self.tracker.timer();
        let color = phase_color(timer.phase());
        let task_line = match self.tracker.current_task() {
            Some(task) => format!("Task: {}", task.title),
            None => "No task selected".to_string(),
        };
        let run_state = if timer.is_running() { "Running" } else { "Paused" };

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                timer.display(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("{} session - {run_state}", timer.phase().label())),
            Line::from(""),
            Line::from(task_line),
        ];
        let panel = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Pomodoro").border_style(Style::default().fg(color)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(panel, area);
    }

    /// Render the statistics bar chart; bar widths follow the panel size.
    fn render_stats(&self, f: &mut Frame, area: Rect) {
        let chart = self.tracker.stats().chart();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(if chart.show_legend { 2 } else { 0 })])
            .split(area);

        let bars: Vec<Bar> = chart
            .bars
            .iter()
            .map(|b| {
                Bar::default()
                    .value(b.value)
                    .label(Line::from(b.label))
                    .style(Style::default().fg(rgb(b.color)))
                    .value_style(Style::default().fg(Color::Black).bg(rgb(b.color)))
            })
            .collect();

        let gap = 2u16;
        let bar_width = if chart.responsive {
            (chunks[0].width.saturating_sub(2 + gap) / 2).clamp(3, 30)
        } else {
            10
        };
        let widget = BarChart::default()
            .block(Block::default().borders(Borders::ALL).title(chart.title))
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width)
            .bar_gap(gap);
        f.render_widget(widget, chunks[0]);

        if chart.show_legend {
            let legend: Vec<Span> = chart
                .bars
                .iter()
                .flat_map(|b| {
                    [
                        Span::styled("■ ", Style::default().fg(rgb(b.color))),
                        Span::raw(format!("{}  ", b.label)),
                    ]
                })
                .collect();
            f.render_widget(Paragraph::new(Line::from(legend)).wrap(Wrap { trim: true }), chunks[1]);
        }
    }

    fn render_task_form(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 60, area);
        f.render_widget(Clear, area);
        let block = Block::default().borders(Borders::ALL).title("Add Task (Enter to save, Esc to cancel)");
        let inner = block.inner(area);
        f.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3); 4])
            .split(inner);

        let form = &self.task_form;
        for (index, label) in FIELD_LABELS.iter().enumerate() {
            let focused = form.current_field == index;
            let value = match index {
                TITLE_FIELD => form.title.value.clone(),
                DESCRIPTION_FIELD => form.description.value.clone(),
                PRIORITY_FIELD => format!("< {} >", form.selected_priority()),
                DEADLINE_FIELD => {
                    if form.deadline.value.is_empty() && !focused {
                        "YYYY-MM-DD, tomorrow, next friday, in 3d".to_string()
                    } else {
                        form.deadline.value.clone()
                    }
                }
                _ => String::new(),
            };
            let border = if focused { Style::default().fg(Color::Yellow) } else { Style::default() };
            let widget = Paragraph::new(value)
                .block(Block::default().borders(Borders::ALL).title(*label).border_style(border));
            f.render_widget(widget, rows[index]);
        }

        let cursor_field = match form.current_field {
            TITLE_FIELD => Some(&form.title),
            DESCRIPTION_FIELD => Some(&form.description),
            DEADLINE_FIELD => Some(&form.deadline),
            _ => None,
        };
        if let Some(input) = cursor_field {
            let row = rows[form.current_field];
            f.set_cursor_position((row.x + 1 + input.cursor as u16, row.y + 1));
        }
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let keys = [
            ("Up/Down, j/k", "Move selection"),
            ("a", "Add task"),
            ("Enter, t", "Start timer for selected task"),
            ("g", "Start timer for current task"),
            ("r", "Reset timer"),
            ("c, Space", "Toggle completed"),
            ("d, Del", "Delete task"),
            ("p", "Cycle priority filter"),
            ("s", "Cycle status filter"),
            ("h, ?", "Toggle help"),
            ("q, Esc", "Quit"),
        ];
        let text: Vec<Line> = keys
            .iter()
            .map(|(k, d)| {
                Line::from(vec![
                    Span::styled(format!("{k:<14}"), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(*d),
                ])
            })
            .collect();
        let area = centered_rect(60, 60, area);
        f.render_widget(Clear, area);
        f.render_widget(Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Help")), area);
    }

    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let title = self
            .pending_action
            .and_then(|action| self.tracker.db().get(action.task_id()))
            .map(|t| t.title.as_str())
            .unwrap_or("");
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("Delete this task?", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(title.to_string()),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);
        let paragraph = Paragraph::new(text)
            .block(Block::default().title("Confirm Action").borders(Borders::ALL).style(Style::default().bg(DARK_RED)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_notice(&self, f: &mut Frame, area: Rect) {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(self.notice.clone(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("Press any key to continue"),
        ];
        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);
        let paragraph = Paragraph::new(text)
            .block(Block::default().title("Notice").borders(Borders::ALL))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => format!(
                    "Tasks: {} | Enter start | g resume | r reset | a add | h help",
                    self.visible.len()
                ),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
                AppState::Notice => "Notice".to_string(),
            }
        };
        f.render_widget(Paragraph::new(text).style(Style::default().bg(SLATE).fg(Color::White)), area);
    }

    /// Draw the whole screen.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[1]);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(6)])
            .split(body[1]);

        self.render_header(f, chunks[0]);
        self.render_task_list(f, body[0]);
        self.render_timer(f, side[0]);
        self.render_stats(f, side[1]);

        match self.state {
            AppState::TaskList => {}
            AppState::AddTask => self.render_task_form(f, chunks[1]),
            AppState::Help => self.render_help(f, chunks[1]),
            AppState::Confirm => self.render_confirm(f, chunks[1]),
            AppState::Notice => self.render_notice(f, chunks[1]),
        }

        self.render_status_bar(f, chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStore;
    use crate::task::TaskDraft;
    use crate::timer::{SessionDurations, WORK_SECS};
    use ratatui::{backend::TestBackend, Terminal};
    use rstest::{fixture, rstest};
    use std::time::Duration;

    #[fixture]
    fn app() -> App<MemoryStore> {
        let mut tracker = Tracker::new(MemoryStore::new(), SessionDurations::default());
        tracker.add_task(TaskDraft::new("Write", Priority::High, "2026-10-20")).unwrap();
        tracker.add_task(TaskDraft::new("Read", Priority::Low, "2026-10-21")).unwrap();
        tracker.add_task(TaskDraft::new("Review", Priority::High, "2026-10-22")).unwrap();
        App::new(tracker)
    }

    fn press<S: KeyValueStore>(app: &mut App<S>, key: KeyCode) -> bool {
        app.handle_key(key, KeyModifiers::NONE, Instant::now())
    }

    fn type_text<S: KeyValueStore>(app: &mut App<S>, text: &str) {
        text.chars().for_each(|c| {
            press(app, KeyCode::Char(c));
        });
    }

    fn screen<S: KeyValueStore>(app: &mut App<S>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        terminal.backend().buffer().content.iter().map(|c| c.symbol()).collect()
    }

    #[rstest]
    fn quits_on_q(mut app: App<MemoryStore>) {
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[rstest]
    fn adds_task_through_form(mut app: App<MemoryStore>) {
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state(), AppState::AddTask);
        type_text(&mut app, "Plan");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2026-11-01");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state(), AppState::TaskList);
        let task = app.tracker().tasks().last().unwrap();
        assert_eq!(task.title, "Plan");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(app.selected_id(), Some(task.id));
    }

    #[rstest]
    fn invalid_form_shows_notice_and_keeps_list(mut app: App<MemoryStore>) {
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "No deadline");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state(), AppState::Notice);
        assert_eq!(app.tracker().tasks().len(), 3);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.state(), AppState::AddTask);
    }

    /// Store that rejects every write.
    #[derive(Debug, Default)]
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::other("read-only file system"),
            })
        }
    }

    #[test]
    fn storage_failure_on_add_is_reported_as_is() {
        let mut app = App::new(Tracker::new(ReadOnlyStore, SessionDurations::default()));
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Plan");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2026-11-01");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state(), AppState::Notice);
        assert!(app.tracker().tasks().is_empty());
        assert!(app.notice.contains("read-only file system"));
        assert!(!app.notice.contains("required fields"));
    }

    #[rstest]
    fn missing_field_notice_names_required_fields(mut app: App<MemoryStore>) {
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);
        assert!(app.notice.starts_with("Please fill in all required fields"));
    }

    #[rstest]
    fn row_actions_target_the_selected_task(mut app: App<MemoryStore>) {
        press(&mut app, KeyCode::Char('j'));
        let row = app.selected_row().unwrap();
        assert_eq!(row.actions, [TaskAction::StartTimer(2), TaskAction::Delete(2)]);

        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.tracker().timer().task(), Some(2));
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.pending_action, Some(TaskAction::Delete(2)));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.visible(), [1, 3]);
        assert_eq!(app.tracker().timer().task(), None);
    }

    #[rstest]
    fn filtered_delete_removes_selected_task(mut app: App<MemoryStore>) {
        press(&mut app, KeyCode::Char('p')); // Low
        assert_eq!(app.visible(), [2]);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.state(), AppState::Confirm);
        press(&mut app, KeyCode::Char('y'));

        let titles: Vec<&str> = app.tracker().tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Write", "Review"]);
    }

    #[rstest]
    fn cancel_delete_keeps_task(mut app: App<MemoryStore>) {
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.state(), AppState::TaskList);
        assert_eq!(app.tracker().tasks().len(), 3);
    }

    #[rstest]
    fn status_filter_follows_completion_toggle(mut app: App<MemoryStore>) {
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('s')); // Pending
        assert_eq!(app.visible(), [2, 3]);
        press(&mut app, KeyCode::Char('s')); // Completed
        assert_eq!(app.visible(), [1]);
        press(&mut app, KeyCode::Char('s')); // All
        assert_eq!(app.visible(), [1, 2, 3]);
    }

    #[rstest]
    fn timer_runs_for_selected_task(mut app: App<MemoryStore>) {
        let t0 = Instant::now();
        app.handle_key(KeyCode::Down, KeyModifiers::NONE, t0);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE, t0);
        assert_eq!(app.tracker().timer().task(), Some(2));

        let mut changes = 0;
        for n in 1..=WORK_SECS {
            changes += app.on_tick(t0 + Duration::from_secs(n as u64));
        }
        assert_eq!(changes, 1);
        assert_eq!(app.state(), AppState::Notice);
        assert_eq!(app.tracker().db().get(2).unwrap().pomodoros, 1);

        let text = screen(&mut app);
        assert!(text.contains("Work session completed!"));
        assert!(text.contains("05:00"));
    }

    #[rstest]
    fn reset_key_stops_timer(mut app: App<MemoryStore>) {
        let t0 = Instant::now();
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE, t0);
        app.on_tick(t0 + Duration::from_secs(1));
        press(&mut app, KeyCode::Char('r'));
        assert!(!app.tracker().timer().is_running());
        assert_eq!(app.tracker().timer().remaining(), WORK_SECS);
    }

    #[rstest]
    fn renders_list_timer_and_stats(mut app: App<MemoryStore>) {
        let text = screen(&mut app);
        assert!(text.contains("Tasks (3/3)"));
        assert!(text.contains("Review"));
        assert!(text.contains("25:00"));
        assert!(text.contains("No task selected"));
        assert!(text.contains("Statistics"));
        assert!(text.contains("Completed Tasks"));
        assert!(text.contains("Pomodoro Sessions"));
    }
}

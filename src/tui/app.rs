//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which manages the TUI state,
//! handles user input, renders the interface, and coordinates between
//! the screens (task list, detail, forms, dialogs). The list is a derived
//! view: it is recomputed whenever the store reports a change or the
//! filter/search inputs move.

use std::io;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use chrono::Utc;
use log::debug;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};
use uuid::Uuid;

use crate::fields::*;
use crate::storage::KeyValueStore;
use crate::store::{StoreEvent, TaskStore};
use crate::task::Task;
use crate::tui::{
    colors::priority_color,
    enums::{AppState, InputMode},
    input::InputField,
    task_form::{TaskForm, DEADLINE_ORDER, DESCRIPTION_ORDER, PRIORITY_ORDER, TITLE_ORDER},
    utils::{centered_rect, input_cursor},
};
use crate::util::{format_deadline_relative, format_timestamp, short_id};
use crate::view::{derive_view, ViewQuery};

/// Main application state for the terminal user interface.
pub struct App<S: KeyValueStore> {
    state: AppState,
    return_state: AppState,
    store: TaskStore<S>,
    events: Receiver<StoreEvent>,
    query: ViewQuery,
    input_mode: InputMode,
    visible: Vec<Uuid>,
    task_list_state: TableState,
    selected_task: Option<Uuid>,
    task_form: TaskForm,
    status_message: String,
    confirm_delete: Option<Uuid>,
}

impl<S: KeyValueStore> App<S> {
    /// Create a new App over an already loaded store.
    pub fn new(mut store: TaskStore<S>) -> Self {
        let events = store.subscribe();
        debug!("event=tui_start revision={} count={}", store.revision(), store.tasks().len());
        let mut app = App {
            state: AppState::TaskList,
            return_state: AppState::TaskList,
            store,
            events,
            query: ViewQuery::default(),
            input_mode: InputMode::None,
            visible: Vec::new(),
            task_list_state: TableState::default(),
            selected_task: None,
            task_form: TaskForm::new(),
            status_message: String::new(),
            confirm_delete: None,
        };
        app.update_visible_tasks();
        app
    }

    /// Drain store notices and recompute the view if anything changed.
    fn sync_with_store(&mut self) {
        let mut changed = false;
        while let Ok(StoreEvent::Changed { revision }) = self.events.try_recv() {
            debug!("event=view_refresh revision={revision}");
            changed = true;
        }
        if changed {
            self.update_visible_tasks();
        }
    }

    /// Recompute the derived view and keep the selection on the same task when possible.
    fn update_visible_tasks(&mut self) {
        let old_selected_id = self
            .task_list_state
            .selected()
            .and_then(|idx| self.visible.get(idx))
            .copied();

        self.visible = derive_view(self.store.tasks(), &self.query)
            .into_iter()
            .map(|t| t.id)
            .collect();

        let restored = old_selected_id.and_then(|id| self.visible.iter().position(|&v| v == id));
        let fallback = if self.visible.is_empty() { None } else { Some(0) };
        self.task_list_state.select(restored.or(fallback));
    }

    fn highlighted_task_id(&self) -> Option<Uuid> {
        self.task_list_state
            .selected()
            .and_then(|idx| self.visible.get(idx))
            .copied()
    }

    /// Get a reference to the task opened in the detail view.
    fn get_selected_task(&self) -> Option<&Task> {
        self.selected_task.and_then(|id| self.store.get(id))
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn set_filter(&mut self, filter: FilterOption) {
        self.query.filter = filter;
        self.update_visible_tasks();
    }

    fn open_add_form(&mut self) {
        self.task_form = TaskForm::new();
        self.return_state = self.state;
        self.state = AppState::AddTask;
    }

    fn open_edit_form(&mut self, id: Uuid) {
        if let Some(task) = self.store.get(id) {
            self.task_form = TaskForm::from_task(task);
            self.selected_task = Some(id);
            self.return_state = self.state;
            self.state = AppState::EditTask;
        }
    }

    fn ask_delete(&mut self, id: Uuid) {
        self.confirm_delete = Some(id);
        self.return_state = self.state;
        self.state = AppState::Confirm;
    }

    fn toggle(&mut self, id: Uuid) {
        if self.store.toggle_completion(id) {
            let done = self.store.get(id).map(|t| t.completed).unwrap_or(false);
            self.set_status_message(if done { "Marked done" } else { "Marked open" });
        }
        self.sync_with_store();
    }

    fn move_selection(&mut self, down: bool) {
        if self.visible.is_empty() {
            return;
        }
        let next = match self.task_list_state.selected() {
            Some(i) if down => (i + 1).min(self.visible.len() - 1),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.task_list_state.select(Some(next));
    }

    /// Handle a key on the list screen. Returns `true` to quit.
    fn handle_task_list_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if self.input_mode == InputMode::Search {
            match key {
                KeyCode::Esc => {
                    self.input_mode = InputMode::None;
                    self.query.search.clear();
                    self.update_visible_tasks();
                }
                KeyCode::Enter => {
                    self.input_mode = InputMode::None;
                    if !self.query.search.is_empty() {
                        let msg = format!(
                            "Search applied: '{}' ({} tasks)",
                            self.query.search,
                            self.visible.len()
                        );
                        self.set_status_message(msg);
                    }
                }
                KeyCode::Backspace => {
                    self.query.search.pop();
                    self.update_visible_tasks();
                }
                KeyCode::Char(c) => {
                    self.query.search.push(c);
                    self.update_visible_tasks();
                }
                _ => {}
            }
            return false;
        }

        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.query.search.is_empty() {
                    return true;
                }
                self.query.search.clear();
                self.update_visible_tasks();
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Tab | KeyCode::Right => self.set_filter(self.query.filter.next()),
            KeyCode::BackTab | KeyCode::Left => self.set_filter(self.query.filter.previous()),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.set_filter(FilterOption::ALL[idx]);
            }
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Search;
            }
            KeyCode::Enter => {
                if let Some(id) = self.highlighted_task_id() {
                    self.selected_task = Some(id);
                    self.state = AppState::TaskDetail;
                }
            }
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('e') => {
                if let Some(id) = self.highlighted_task_id() {
                    self.open_edit_form(id);
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(id) = self.highlighted_task_id() {
                    self.toggle(id);
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.highlighted_task_id() {
                    self.ask_delete(id);
                }
            }
            KeyCode::Char('h') | KeyCode::Char('?') => {
                self.return_state = self.state;
                self.state = AppState::Help;
            }
            _ => {}
        }
        false
    }

    fn handle_detail_input(&mut self, key: KeyCode) -> bool {
        let Some(id) = self.selected_task.filter(|&id| self.store.get(id).is_some()) else {
            self.state = AppState::TaskList;
            return false;
        };
        match key {
            KeyCode::Esc | KeyCode::Char('q') => self.state = AppState::TaskList,
            KeyCode::Char('e') => self.open_edit_form(id),
            KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle(id),
            KeyCode::Char('d') => self.ask_delete(id),
            _ => {}
        }
        false
    }

    fn handle_form_input(&mut self, key: KeyCode, is_edit: bool) -> bool {
        match key {
            KeyCode::Esc => {
                self.state = self.return_state;
                self.set_status_message("Cancelled");
            }
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Enter => {
                if is_edit {
                    self.update_task();
                } else {
                    self.create_task();
                }
            }
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
        false
    }

    fn create_task(&mut self) {
        match self.task_form.values() {
            Ok(v) => {
                let id = self.store.create(v.title, v.description, v.priority, v.deadline);
                self.sync_with_store();
                if let Some(idx) = self.visible.iter().position(|&v| v == id) {
                    self.task_list_state.select(Some(idx));
                }
                self.state = AppState::TaskList;
                self.set_status_message(format!("Added {}", short_id(id)));
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    fn update_task(&mut self) {
        let Some(mut task) = self.get_selected_task().cloned() else {
            self.state = AppState::TaskList;
            self.set_status_message("Task no longer exists");
            return;
        };
        match self.task_form.values() {
            Ok(v) => {
                task.title = v.title;
                task.description = v.description;
                task.priority = v.priority;
                task.deadline = v.deadline;
                self.store.update(task);
                self.sync_with_store();
                self.state = self.return_state;
                self.set_status_message("Saved");
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    fn handle_confirm_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(id) = self.confirm_delete.take() {
                    self.store.delete(id);
                    self.sync_with_store();
                    if self.selected_task == Some(id) {
                        self.selected_task = None;
                    }
                    self.set_status_message("Deleted");
                }
                self.state = AppState::TaskList;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_delete = None;
                self.state = self.return_state;
            }
            _ => {}
        }
        false
    }

    fn handle_help_input(&mut self, key: KeyCode) -> bool {
        if matches!(key, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::Char('?')) {
            self.state = self.return_state;
        }
        false
    }

    /// Dispatch a key to the current screen. Returns `true` to quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        self.status_message.clear();
        match self.state {
            AppState::TaskList => self.handle_task_list_input(key, modifiers),
            AppState::TaskDetail => self.handle_detail_input(key),
            AppState::AddTask => self.handle_form_input(key, false),
            AppState::EditTask => self.handle_form_input(key, true),
            AppState::Help => self.handle_help_input(key),
            AppState::Confirm => self.handle_confirm_input(key),
        }
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code, key.modifiers));
                }
            }
        }
        Ok(false)
    }

    /// Render the main task list view with filter tabs and table.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let now = Utc::now();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let selected_tab = FilterOption::ALL
            .iter()
            .position(|&o| o == self.query.filter)
            .unwrap_or(0);
        let tabs = Tabs::new(
            FilterOption::ALL
                .iter()
                .enumerate()
                .map(|(i, &o)| format!("{} {}", i + 1, format_filter(o))),
        )
        .select(selected_tab)
        .block(Block::default().borders(Borders::ALL).title(Span::styled(
            " TO-DO LIST ",
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .divider("|");
        f.render_widget(tabs, chunks[0]);

        if self.visible.is_empty() {
            let msg = if self.query.search.is_empty() {
                "No tasks yet. Press 'a' to add one.".to_string()
            } else {
                format!("No results for '{}'", self.query.search)
            };
            let empty = Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Tasks"));
            f.render_widget(empty, chunks[1]);
            return;
        }

        let header_cells = ["", "Priority", "Deadline", "Title"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(Color::Blue).fg(Color::White))
            .height(1);

        let rows: Vec<Row> = self
            .visible
            .iter()
            .filter_map(|&id| self.store.get(id))
            .map(|task| {
                let check = if task.completed { "[x]" } else { "[ ]" };
                let overdue = task.is_overdue_at(now);
                let deadline_style = if overdue {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let title_style = if task.completed {
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default().fg(Color::White)
                };
                let mut title = vec![Span::styled(task.title.clone(), title_style)];
                if !task.description.is_empty() {
                    title.push(Span::styled(
                        format!("  {}", task.description.lines().next().unwrap_or_default()),
                        Style::default().fg(Color::DarkGray),
                    ));
                }

                Row::new(vec![
                    Cell::from(check),
                    Cell::from(Span::styled(
                        format_priority(task.priority),
                        Style::default().fg(priority_color(task.priority)),
                    )),
                    Cell::from(Span::styled(
                        format_deadline_relative(task.deadline, now),
                        deadline_style,
                    )),
                    Cell::from(Line::from(title)),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(4),  // Done
            Constraint::Length(9),  // Priority
            Constraint::Length(12), // Deadline
            Constraint::Min(20),    // Title
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{}) - Press 'h' for help",
                self.visible.len(),
                self.store.tasks().len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[1], &mut self.task_list_state);
    }

    /// Render the detailed view of a single task.
    fn render_task_detail(&mut self, f: &mut Frame, area: Rect) {
        let Some(task) = self.get_selected_task() else {
            let gone = Paragraph::new("Task no longer exists")
                .block(Block::default().borders(Borders::ALL).title("Detail"));
            f.render_widget(gone, area);
            return;
        };
        let now = Utc::now();
        let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

        let status = if task.completed {
            Span::styled("Done", Style::default().fg(Color::Green))
        } else {
            Span::styled("In progress", Style::default().fg(Color::Yellow))
        };
        let mut status_line = vec![Span::styled("Status:    ", label), status];
        if task.is_overdue_at(now) {
            status_line.push(Span::styled(
                "  OVERDUE",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }

        let deadline = match task.deadline {
            Some(d) => format!("{} ({})", format_timestamp(d), format_deadline_relative(Some(d), now)),
            None => "-".to_string(),
        };
        let description = if task.description.is_empty() {
            "No description".to_string()
        } else {
            task.description.clone()
        };

        let mut text = vec![
            Line::from(Span::styled(
                task.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(status_line),
            Line::from(vec![
                Span::styled("Priority:  ", label),
                Span::styled(
                    format_priority(task.priority),
                    Style::default().fg(priority_color(task.priority)),
                ),
            ]),
            Line::from(vec![
                Span::styled("Created:   ", label),
                Span::raw(format_timestamp(task.created_at)),
            ]),
            Line::from(vec![Span::styled("Deadline:  ", label), Span::raw(deadline)]),
            Line::from(vec![Span::styled("ID:        ", label), Span::raw(task.id.to_string())]),
            Line::from(""),
            Line::from(Span::styled("Description", label)),
        ];
        text.extend(description.lines().map(|l| Line::from(l.to_string())));
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            "[e] edit  [space] toggle done  [d] delete  [esc] back",
            Style::default().fg(Color::DarkGray),
        )));

        let detail = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Detail"))
            .wrap(Wrap { trim: false });
        f.render_widget(detail, area);
    }

    /// Render the add/edit form.
    fn render_task_form(&mut self, f: &mut Frame, area: Rect, is_edit: bool) {
        let title = if is_edit { "Edit Task" } else { "New Task" };
        let outer = Block::default().borders(Borders::ALL).title(title);
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        let form = &self.task_form;
        let fields: [(&str, &InputField, usize); 3] = [
            ("Title", &form.title, TITLE_ORDER),
            ("Description (optional)", &form.description, DESCRIPTION_ORDER),
            ("Deadline (optional: today, tomorrow, in 3d, 2026-05-01 17:30)", &form.deadline, DEADLINE_ORDER),
        ];
        let mut cursor = None;
        for (i, (label, field, order)) in fields.iter().enumerate() {
            let style = if form.current_field == *order {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let width = chunks[i].width.saturating_sub(2);
            let (column, scroll) = input_cursor(field, width);
            let widget = Paragraph::new(field.value.as_str())
                .scroll((0, scroll))
                .block(Block::default().borders(Borders::ALL).title(*label).border_style(style));
            f.render_widget(widget, chunks[i]);
            if field.active {
                cursor = Some((chunks[i].x + 1 + column, chunks[i].y + 1));
            }
        }

        let priority_spans: Vec<Span> = form
            .priorities
            .iter()
            .enumerate()
            .flat_map(|(i, &p)| {
                let mut style = Style::default().fg(priority_color(p));
                if i == form.priority {
                    style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
                }
                [Span::styled(format!(" {} ", format_priority(p)), style), Span::raw(" ")]
            })
            .collect();
        let priority_style = if form.current_field == PRIORITY_ORDER {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let priority = Paragraph::new(Line::from(priority_spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Priority (←/→)")
                .border_style(priority_style),
        );
        f.render_widget(priority, chunks[3]);

        let hint_style = if form.can_submit() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Red)
        };
        let hint = if form.can_submit() {
            "[enter] save  [tab] next field  [esc] cancel"
        } else {
            "Enter a title to save  [tab] next field  [esc] cancel"
        };
        f.render_widget(Paragraph::new(hint).style(hint_style), chunks[4]);

        if let Some(pos) = cursor {
            f.set_cursor_position(pos);
        }
    }

    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let keys = [
            ("↑/↓ j/k", "Move selection"),
            ("Tab/←/→ 1-4", "Switch filter: all, active, completed, overdue"),
            ("/", "Search titles and descriptions"),
            ("Enter", "Open task detail"),
            ("a", "Add task"),
            ("e", "Edit task"),
            ("Space / x", "Toggle done"),
            ("d", "Delete task"),
            ("h / ?", "Toggle this help"),
            ("q / Esc", "Quit (Esc clears an active search first)"),
        ];
        let text: Vec<Line> = keys
            .iter()
            .map(|(k, d)| {
                Line::from(vec![
                    Span::styled(format!("{k:<14}"), Style::default().fg(Color::Cyan)),
                    Span::raw(*d),
                ])
            })
            .collect();
        let popup = centered_rect(70, 60, area);
        f.render_widget(Clear, popup);
        f.render_widget(
            Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Help")),
            popup,
        );
    }

    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let title = self
            .confirm_delete
            .and_then(|id| self.store.get(id))
            .map(|t| t.title.clone())
            .unwrap_or_default();
        let popup = centered_rect(50, 20, area);
        f.render_widget(Clear, popup);
        let text = vec![
            Line::from(format!("Delete '{title}'?")),
            Line::from(""),
            Line::from("[y] yes   [n] no"),
        ];
        f.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Confirm")),
            popup,
        );
    }

    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if self.input_mode == InputMode::Search {
            format!("Search: {} (Esc to clear, Enter to confirm)", self.query.search)
        } else if !self.query.search.is_empty() {
            format!(
                "Tasks: {} (search '{}') | Press 'h' for help",
                self.visible.len(),
                self.query.search
            )
        } else {
            match self.state {
                AppState::TaskList => format!("Tasks: {} | Press 'h' for help", self.visible.len()),
                AppState::TaskDetail => "Task Details".to_string(),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::EditTask => "Edit Task".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(Color::Blue).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to appropriate view renderers.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        match self.state {
            AppState::TaskList => self.render_task_list(f, chunks[0]),
            AppState::TaskDetail => self.render_task_detail(f, chunks[0]),
            AppState::AddTask => self.render_task_form(f, chunks[0], false),
            AppState::EditTask => self.render_task_form(f, chunks[0], true),
            AppState::Help => {
                self.render_task_list(f, chunks[0]);
                self.render_help(f, chunks[0]);
            }
            AppState::Confirm => {
                self.render_task_list(f, chunks[0]);
                self.render_confirm(f, chunks[0]);
            }
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Handles rendering and input processing until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.sync_with_store();
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use ratatui::backend::TestBackend;

    fn app_with(titles: &[(&str, Priority)]) -> App<MemoryStore> {
        let mut store = TaskStore::with_defaults(MemoryStore::new(), Vec::new);
        store.load();
        for (title, priority) in titles {
            store.create(*title, "", *priority, None);
        }
        App::new(store)
    }

    fn press(app: &mut App<MemoryStore>, key: KeyCode) -> bool {
        app.handle_key(key, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App<MemoryStore>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn visible_titles(app: &App<MemoryStore>) -> Vec<String> {
        app.visible
            .iter()
            .filter_map(|&id| app.store.get(id))
            .map(|t| t.title.clone())
            .collect()
    }

    #[test]
    fn test_list_follows_priority_order() {
        let app = app_with(&[("low", Priority::Low), ("high", Priority::High), ("mid", Priority::Medium)]);
        assert_eq!(visible_titles(&app), vec!["high", "mid", "low"]);
        assert_eq!(app.task_list_state.selected(), Some(0));
    }

    #[test]
    fn test_add_form_refuses_empty_title() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state, AppState::AddTask);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::AddTask);
        assert!(app.store.tasks().is_empty());
        assert_eq!(app.status_message, "Title is required");
    }

    #[test]
    fn test_add_then_toggle_moves_between_filters() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Buy milk");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(visible_titles(&app), vec!["Buy milk"]);

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.query.filter, FilterOption::Active);
        assert!(app.visible.is_empty());

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(visible_titles(&app), vec!["Buy milk"]);
    }

    #[test]
    fn test_search_narrows_and_escape_clears() {
        let mut app = app_with(&[("Yağ Al", Priority::High), ("Job Center", Priority::Medium)]);
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "YAĞ");
        assert_eq!(visible_titles(&app), vec!["Yağ Al"]);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.visible.len(), 2);
        assert_eq!(app.input_mode, InputMode::None);
    }

    #[test]
    fn test_edit_updates_selected_task() {
        let mut app = app_with(&[("Draft", Priority::Low)]);
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.state, AppState::EditTask);
        type_text(&mut app, " v2");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);

        let task = &app.store.tasks()[0];
        assert_eq!(task.title, "Draft v2");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(app.state, AppState::TaskList);
    }

    #[test]
    fn test_title_edit_leaves_deadline_alone() {
        let deadline = Utc::now() + chrono::Duration::seconds(3 * 3600 + 27);
        let mut store = TaskStore::with_defaults(MemoryStore::new(), Vec::new);
        store.load();
        let id = store.create("Call", "", Priority::Medium, Some(deadline));
        let mut app = App::new(store);

        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, " back");
        press(&mut app, KeyCode::Enter);

        let task = app.store.get(id).unwrap();
        assert_eq!(task.title, "Call back");
        assert_eq!(task.deadline, Some(deadline));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut app = app_with(&[("Keep", Priority::Low), ("Drop", Priority::High)]);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.store.tasks().len(), 2);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.state, AppState::Confirm);
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(visible_titles(&app), vec!["Keep"]);
        assert_eq!(app.task_list_state.selected(), Some(0));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app_with(&[]);
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
    }

    #[test]
    fn test_renders_every_screen() {
        let mut app = app_with(&[("Job Center", Priority::Medium)]);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|f| app.render(f)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Job Center"));
        assert!(screen.contains("Tasks (1/1)"));

        for key in [KeyCode::Enter, KeyCode::Char('e'), KeyCode::Esc, KeyCode::Char('d')] {
            press(&mut app, key);
            terminal.draw(|f| app.render(f)).unwrap();
        }
        assert_eq!(app.state, AppState::Confirm);
    }
}

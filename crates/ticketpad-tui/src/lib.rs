// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use ticketpad_app::{
    AppCommand, AppEvent, AppState, CopyTarget, EntryId, FormField, HistoryEntry, Location,
    history_label,
};
use tracing::{debug, info, warn};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const DEFAULT_COPIED_DURATION: Duration = Duration::from_secs(2);
const COPIED_MARK: &str = "✓";
const CURSOR_MARK: &str = "›";

/// Side effects the form needs from its host.
pub trait AppRuntime {
    fn load_history(&mut self) -> Result<Vec<HistoryEntry>>;
    fn persist_history(&mut self, history: &[HistoryEntry]) -> Result<()>;
    fn copy_text(&mut self, text: &str) -> Result<()>;
}

/// Modifier that turns a right-click (or `d`) on a history row into a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteModifier {
    #[default]
    Ctrl,
    Alt,
    Shift,
}

impl DeleteModifier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ctrl => "ctrl",
            Self::Alt => "alt",
            Self::Shift => "shift",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Self::Ctrl),
            "alt" | "option" => Some(Self::Alt),
            "shift" => Some(Self::Shift),
            _ => None,
        }
    }

    const fn key_modifiers(self) -> KeyModifiers {
        match self {
            Self::Ctrl => KeyModifiers::CONTROL,
            Self::Alt => KeyModifiers::ALT,
            Self::Shift => KeyModifiers::SHIFT,
        }
    }

    fn held(self, modifiers: KeyModifiers) -> bool {
        modifiers.contains(self.key_modifiers())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    pub copied_duration: Duration,
    pub delete_modifier: DeleteModifier,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            copied_duration: DEFAULT_COPIED_DURATION,
            delete_modifier: DeleteModifier::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    ClearCopied { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Field(FormField),
    History,
}

impl Default for Focus {
    fn default() -> Self {
        Self::Field(FormField::Email)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    focus: Focus,
    history_cursor: usize,
    copied: Option<CopyTarget>,
    copied_token: u64,
    status_token: u64,
    help_visible: bool,
    frame_area: Rect,
    options: UiOptions,
    /// Startup load failed; the in-memory history is not the stored one and
    /// must never be written over it.
    history_unavailable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenLayout {
    history: Option<Rect>,
    fields: [(FormField, Rect); 6],
    status: Rect,
}

impl ScreenLayout {
    fn field_area(&self, field: FormField) -> Rect {
        self.fields
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, area)| *area)
            .unwrap_or_default()
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData {
        options,
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    load_initial_history(state, runtime, &mut view_data, &internal_tx);
    let result = event_loop(
        &mut terminal,
        state,
        runtime,
        &mut view_data,
        &internal_tx,
        &internal_rx,
    );

    disable_raw_mode().context("disable raw mode")?;
    execute!(
        io::stdout(),
        DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )
    .context("leave alternate screen")?;
    result
}

fn event_loop<R: AppRuntime>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    internal_rx: &Receiver<InternalEvent>,
) -> Result<()> {
    loop {
        process_internal_events(state, view_data, internal_rx);

        let completed = terminal
            .draw(|frame| render(frame, state, view_data))
            .context("draw frame")?;
        view_data.frame_area = completed.area;

        if !event::poll(Duration::from_millis(120)).context("poll event")? {
            continue;
        }
        match event::read().context("read event")? {
            Event::Key(key) => {
                if handle_key_event(state, runtime, view_data, internal_tx, key) {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => {
                handle_mouse_event(state, runtime, view_data, internal_tx, mouse);
            }
            _ => {}
        }
    }
}

fn load_initial_history<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match runtime.load_history() {
        Ok(entries) => {
            debug!(count = entries.len(), "history loaded at startup");
            view_data.history_unavailable = false;
            state.dispatch(AppCommand::SetHistory(entries));
        }
        Err(error) => {
            warn!(error = %format!("{error:#}"), "history load failed; saving disabled");
            view_data.history_unavailable = true;
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("load failed: {error}; changes are not saved"),
            );
        }
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearCopied { token } if token == view_data.copied_token => {
                view_data.copied = None;
            }
            InternalEvent::ClearStatus { .. } | InternalEvent::ClearCopied { .. } => {}
        }
    }
}

fn schedule(internal_tx: &Sender<InternalEvent>, after: Duration, event: InternalEvent) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(after);
        let _ = sender.send(event);
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule(
        internal_tx,
        STATUS_CLEAR_AFTER,
        InternalEvent::ClearStatus {
            token: view_data.status_token,
        },
    );
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('q') {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1)) {
            view_data.help_visible = false;
        }
        return false;
    }

    match key.code {
        KeyCode::F(1) => {
            view_data.help_visible = true;
            return false;
        }
        KeyCode::F(2) => {
            copy_to_clipboard(state, runtime, view_data, internal_tx, CopyTarget::Username);
            return false;
        }
        KeyCode::F(3) => {
            copy_to_clipboard(state, runtime, view_data, internal_tx, CopyTarget::Summary);
            return false;
        }
        KeyCode::F(4) => {
            copy_to_clipboard(
                state,
                runtime,
                view_data,
                internal_tx,
                CopyTarget::ComputerName,
            );
            return false;
        }
        KeyCode::F(5) => {
            copy_to_clipboard(
                state,
                runtime,
                view_data,
                internal_tx,
                CopyTarget::Information,
            );
            return false;
        }
        KeyCode::Char('s') if ctrl => {
            save_and_clear(state, runtime, view_data, internal_tx);
            return false;
        }
        KeyCode::Char('r') if ctrl => {
            dispatch_and_persist(
                state,
                runtime,
                view_data,
                internal_tx,
                AppCommand::ToggleHistory,
            );
            return false;
        }
        KeyCode::Tab => {
            move_focus(state, view_data, 1);
            return false;
        }
        KeyCode::BackTab => {
            move_focus(state, view_data, -1);
            return false;
        }
        _ => {}
    }

    match view_data.focus {
        Focus::History => handle_history_key(state, runtime, view_data, internal_tx, key),
        Focus::Field(FormField::Location) => {
            handle_location_key(state, runtime, view_data, internal_tx, key);
        }
        Focus::Field(field) => {
            handle_text_key(state, runtime, view_data, internal_tx, field, key);
        }
    }
    false
}

fn handle_text_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    field: FormField,
    key: KeyEvent,
) {
    let current = state.form.value(field);
    let next = match (key.code, key.modifiers) {
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => String::new(),
        (KeyCode::Char(c), modifiers)
            if modifiers == KeyModifiers::NONE || modifiers == KeyModifiers::SHIFT =>
        {
            let mut value = current.to_owned();
            value.push(c);
            value
        }
        (KeyCode::Backspace, _) => {
            let mut value = current.to_owned();
            value.pop();
            value
        }
        (KeyCode::Enter, _) if field.is_multiline() => {
            let mut value = current.to_owned();
            value.push('\n');
            value
        }
        (KeyCode::Enter, _) => {
            move_focus(state, view_data, 1);
            return;
        }
        _ => return,
    };

    dispatch_and_persist(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::UpdateInput { field, data: next },
    );
}

fn handle_location_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let location = match key.code {
        KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => state.form.location.toggled(),
        KeyCode::Char('o') | KeyCode::Char('O') => Location::OnSite,
        KeyCode::Char('r') | KeyCode::Char('R') => Location::Remote,
        KeyCode::Enter => {
            move_focus(state, view_data, 1);
            return;
        }
        _ => return,
    };

    dispatch_and_persist(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::UpdateInput {
            field: FormField::Location,
            data: location.as_str().to_owned(),
        },
    );
}

fn handle_history_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let delete_modifier = view_data.options.delete_modifier;
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.history_cursor = view_data.history_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let last = state.history.len().saturating_sub(1);
            view_data.history_cursor = (view_data.history_cursor + 1).min(last);
        }
        KeyCode::Enter => {
            let index = view_data.history_cursor;
            load_history_entry(state, runtime, view_data, internal_tx, index);
        }
        KeyCode::Char(c) if c.eq_ignore_ascii_case(&'d') && delete_modifier.held(key.modifiers) => {
            let index = view_data.history_cursor;
            delete_history_entry(state, runtime, view_data, internal_tx, index);
        }
        _ => {}
    }
}

fn handle_mouse_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mouse: MouseEvent,
) {
    if view_data.help_visible {
        return;
    }

    let layout = screen_layout(view_data.frame_area, state.show_history);
    let position = Position::new(mouse.column, mouse.row);

    if let Some(history_area) = layout.history
        && history_area.contains(position)
    {
        let Some(index) = history_row_at(
            history_area,
            view_data.history_cursor,
            state.history.len(),
            mouse.row,
        ) else {
            return;
        };
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                view_data.focus = Focus::History;
                load_history_entry(state, runtime, view_data, internal_tx, index);
            }
            // Plain right-clicks are consumed so nothing else reacts to them.
            MouseEventKind::Down(MouseButton::Right)
                if view_data.options.delete_modifier.held(mouse.modifiers) =>
            {
                delete_history_entry(state, runtime, view_data, internal_tx, index);
            }
            _ => {}
        }
        return;
    }

    if mouse.kind == MouseEventKind::Down(MouseButton::Left)
        && let Some((field, _)) = layout
            .fields
            .iter()
            .find(|(_, area)| area.contains(position))
    {
        view_data.focus = Focus::Field(*field);
    }
}

fn load_history_entry<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    index: usize,
) {
    let Some(entry) = state.history.get(index).cloned() else {
        return;
    };
    view_data.history_cursor = index;
    let label = history_label(&entry);
    dispatch_and_persist(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::Load(entry),
    );
    emit_status(state, view_data, internal_tx, format!("editing {label}"));
}

fn delete_history_entry<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    index: usize,
) {
    let Some(entry) = state.history.get(index) else {
        return;
    };
    let id = entry.id;
    let label = history_label(entry);
    let (_, stored) = dispatch_and_persist(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::Delete { id },
    );
    info!(%id, "history entry deleted");
    if stored {
        emit_status(state, view_data, internal_tx, format!("deleted {label}"));
    }
}

fn save_and_clear<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let (events, stored) = dispatch_and_persist(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::SaveAndClear {
            id: EntryId::generate(),
        },
    );
    view_data.focus = Focus::Field(FormField::Email);
    if !stored {
        return;
    }

    let message = events.iter().find_map(|event| match event {
        AppEvent::EntryAppended(id) => {
            info!(%id, "history entry saved");
            Some("saved")
        }
        AppEvent::EntryUpdated(id) => {
            info!(%id, "history entry updated");
            Some("updated")
        }
        _ => None,
    });
    if let Some(message) = message {
        emit_status(state, view_data, internal_tx, message);
    }
}

fn copy_to_clipboard<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    target: CopyTarget,
) {
    let text = target.text(&state.form);
    match runtime.copy_text(&text) {
        Ok(()) => {
            debug!(target = target.label(), "copied to clipboard");
            view_data.copied = Some(target);
            view_data.copied_token = view_data.copied_token.saturating_add(1);
            schedule(
                internal_tx,
                view_data.options.copied_duration,
                InternalEvent::ClearCopied {
                    token: view_data.copied_token,
                },
            );
        }
        Err(error) => {
            warn!(error = %format!("{error:#}"), "clipboard write failed");
            view_data.copied = None;
            emit_status(state, view_data, internal_tx, format!("copy failed: {error}"));
        }
    }
}

/// Applies `command` and writes the history back when it changed. The flag is
/// false when a needed write was skipped or failed.
fn dispatch_and_persist<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) -> (Vec<AppEvent>, bool) {
    let events = state.dispatch(command);

    let mut stored = true;
    if events.iter().any(AppEvent::changes_history) {
        if view_data.history_unavailable {
            stored = false;
            warn!("history was never loaded; refusing to overwrite stored history");
            emit_status(
                state,
                view_data,
                internal_tx,
                "history not loaded; changes are not saved",
            );
        } else if let Err(error) = runtime.persist_history(&state.history) {
            stored = false;
            warn!(error = %format!("{error:#}"), "history save failed");
            emit_status(state, view_data, internal_tx, format!("save failed: {error}"));
        }
    }

    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule(
            internal_tx,
            STATUS_CLEAR_AFTER,
            InternalEvent::ClearStatus {
                token: view_data.status_token,
            },
        );
    }

    sync_view_data(state, view_data);
    (events, stored)
}

fn sync_view_data(state: &AppState, view_data: &mut ViewData) {
    view_data.history_cursor = view_data
        .history_cursor
        .min(state.history.len().saturating_sub(1));
    if view_data.focus == Focus::History && !state.show_history {
        view_data.focus = Focus::default();
    }
}

fn focus_ring(show_history: bool) -> Vec<Focus> {
    let mut ring: Vec<Focus> = FormField::ALL.iter().copied().map(Focus::Field).collect();
    if show_history {
        ring.push(Focus::History);
    }
    ring
}

fn move_focus(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let ring = focus_ring(state.show_history);
    let current = ring
        .iter()
        .position(|focus| *focus == view_data.focus)
        .unwrap_or(0) as isize;
    let len = ring.len() as isize;
    let next = (current + delta).rem_euclid(len) as usize;
    view_data.focus = ring[next];
}

fn screen_layout(area: Rect, show_history: bool) -> ScreenLayout {
    let (history, main) = if show_history {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25), Constraint::Min(40)])
            .split(area);
        (Some(columns[0]), columns[1])
    } else {
        (None, area)
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(main);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(25),
            Constraint::Percentage(35),
        ])
        .split(rows[0]);
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    ScreenLayout {
        history,
        fields: [
            (FormField::Email, top[0]),
            (FormField::Summary, middle[0]),
            (FormField::PhoneNumber, top[1]),
            (FormField::Location, top[2]),
            (FormField::ComputerName, middle[1]),
            (FormField::Notes, rows[2]),
        ],
        status: rows[3],
    }
}

/// First visible history row so the cursor stays on screen.
fn history_scroll_offset(cursor: usize, visible_rows: usize) -> usize {
    if visible_rows == 0 {
        return cursor;
    }
    (cursor + 1).saturating_sub(visible_rows)
}

fn history_row_at(area: Rect, cursor: usize, len: usize, row: u16) -> Option<usize> {
    let inner_top = area.y.saturating_add(1);
    let inner_height = area.height.saturating_sub(2);
    if row < inner_top || row >= inner_top.saturating_add(inner_height) {
        return None;
    }
    let offset = history_scroll_offset(cursor, usize::from(inner_height));
    let index = offset + usize::from(row - inner_top);
    (index < len).then_some(index)
}

fn display_value(state: &AppState, field: FormField) -> String {
    let value = state.form.value(field);
    match field {
        FormField::Email => value.to_lowercase(),
        FormField::ComputerName => value.to_uppercase(),
        _ => value.to_owned(),
    }
}

fn copy_hint(field: FormField) -> Option<(&'static str, CopyTarget)> {
    match field {
        FormField::Email => Some(("F2", CopyTarget::Username)),
        FormField::Summary => Some(("F3", CopyTarget::Summary)),
        FormField::ComputerName => Some(("F4", CopyTarget::ComputerName)),
        _ => None,
    }
}

fn field_title(field: FormField, view_data: &ViewData) -> String {
    match copy_hint(field) {
        Some((_, target)) if view_data.copied == Some(target) => {
            format!("{} {COPIED_MARK} copied", field.label())
        }
        Some((key, target)) => format!("{} [{key} copy {}]", field.label(), target.label()),
        None => field.label().to_owned(),
    }
}

fn location_text(location: Location) -> String {
    Location::ALL
        .iter()
        .map(|option| {
            let mark = if *option == location { "(•)" } else { "( )" };
            format!("{mark} {}", option.as_str())
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = screen_layout(frame.area(), state.show_history);

    if let Some(history_area) = layout.history {
        render_history(frame, history_area, state, view_data);
    }

    for (field, area) in layout.fields {
        render_field(frame, area, state, view_data, field);
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("ticketpad"));
    frame.render_widget(status, layout.status);

    if view_data.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text(view_data.options.delete_modifier))
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_field(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
    field: FormField,
) {
    let focused = view_data.focus == Focus::Field(field);
    let border_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(field_title(field, view_data))
        .border_style(border_style);

    if field == FormField::Location {
        frame.render_widget(
            Paragraph::new(location_text(state.form.location)).block(block),
            area,
        );
        return;
    }

    let value = display_value(state, field);
    let inner_height = usize::from(area.height.saturating_sub(2));
    let line_count = value.split('\n').count();
    let scroll = line_count.saturating_sub(inner_height.max(1));

    let paragraph = if value.is_empty() {
        Paragraph::new(Span::styled(
            field.label(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(value.clone()).scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0))
    };
    frame.render_widget(paragraph.block(block), area);

    if focused {
        let last_line = value.rsplit('\n').next().unwrap_or_default();
        let column = u16::try_from(last_line.chars().count()).unwrap_or(u16::MAX);
        let row = u16::try_from(line_count.saturating_sub(1) - scroll).unwrap_or(0);
        let max_x = area.x + area.width.saturating_sub(2);
        let max_y = area.y + area.height.saturating_sub(2);
        frame.set_cursor_position(Position::new(
            (area.x + 1).saturating_add(column).min(max_x),
            (area.y + 1).saturating_add(row).min(max_y),
        ));
    }
}

fn render_history(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let focused = view_data.focus == Focus::History;
    let border_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("History ({})", state.history.len()))
        .border_style(border_style);

    let visible = usize::from(area.height.saturating_sub(2));
    let offset = history_scroll_offset(view_data.history_cursor, visible);
    let lines: Vec<Line<'_>> = history_lines(state, view_data)
        .into_iter()
        .skip(offset)
        .take(visible)
        .map(|(text, active, selected)| {
            let mut style = Style::default();
            if active {
                style = style.fg(Color::Black).bg(Color::Cyan);
            }
            if selected && focused {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(text, style))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// One row per entry: label, whether it is being edited, whether the cursor
/// is on it.
fn history_lines(state: &AppState, view_data: &ViewData) -> Vec<(String, bool, bool)> {
    state
        .history
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let selected = index == view_data.history_cursor;
            let marker = if selected && view_data.focus == Focus::History {
                CURSOR_MARK
            } else {
                " "
            };
            (
                format!("{marker} {}", history_label(entry)),
                state.is_active(entry.id),
                selected,
            )
        })
        .collect()
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let mode = match state.active_id {
        Some(id) => state
            .history
            .iter()
            .find(|entry| entry.id == id)
            .map_or_else(|| "EDIT".to_owned(), |entry| format!("EDIT {}", history_label(entry))),
        None => "NEW".to_owned(),
    };

    let mut parts = vec![mode];
    if let Some(target) = view_data.copied {
        parts.push(format!("{COPIED_MARK} copied {}", target.label()));
    }
    if let Some(status) = &state.status_line {
        parts.push(status.clone());
    }
    let history_hint = if state.show_history {
        "ctrl+r hide history"
    } else {
        "ctrl+r history"
    };
    parts.push(format!(
        "F5 copy information | ctrl+s save & clear | {history_hint} | F1 help | ctrl+q"
    ));
    parts.join(" | ")
}

fn help_overlay_text(delete_modifier: DeleteModifier) -> String {
    let modifier = delete_modifier.as_str();
    [
        "tab / shift+tab   move between fields",
        "enter             next field (newline in description)",
        "ctrl+u            clear the focused field",
        "space / ← →       switch On-Site / Remote",
        "",
        "F2                copy username",
        "F3                copy summary",
        "F4                copy computer name",
        "F5                copy information block",
        "ctrl+s            save & clear",
        "ctrl+r            show / hide history",
        "",
        "history: j/k move, enter or click to edit",
    ]
    .iter()
    .map(|line| (*line).to_owned())
    .chain([
        format!("history: {modifier}+d or {modifier}+right-click to delete"),
        String::new(),
        "esc / F1 close help   ctrl+q quit".to_owned(),
    ])
    .collect::<Vec<_>>()
    .join("\n")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

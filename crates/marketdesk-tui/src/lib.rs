// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use marketdesk_app::{
    AppCommand, AppEvent, AppState, Buyer, Column, DeleteDialog, FetchError, Field, FieldDialog,
    FieldDraft, FieldId, FieldInput, FieldType, MenuInput, MutationError, PartyDraft, PartyEditor,
    PartyInput, PartyKind, Request, Response, RowAction, RowActionMenu, RowContext, ScreenEntity,
    SelectionMark, Seller, SortDirection, TabKind, TableCommand, TableRecord, TableScreen,
    TableView, ViewState, visibility_menu,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const SORT_ASC: &str = " ↑";
const SORT_DESC: &str = " ↓";
const FILTER_MARK: &str = "▼";

/// Network seam for the terminal loop. Every method is one blocking call
/// against the upstream API.
pub trait AppRuntime {
    fn list_buyers(&mut self) -> Result<Vec<Buyer>, FetchError>;
    fn list_sellers(&mut self) -> Result<Vec<Seller>, FetchError>;
    fn list_fields(&mut self) -> Result<Vec<Field>, FetchError>;
    fn load_party(&mut self, kind: PartyKind, id: &str) -> Result<PartyDraft, FetchError>;
    fn add_party(&mut self, kind: PartyKind, draft: &PartyDraft) -> Result<(), MutationError>;
    fn update_party(
        &mut self,
        kind: PartyKind,
        id: &str,
        draft: &PartyDraft,
    ) -> Result<(), MutationError>;
    fn delete_party(&mut self, kind: PartyKind, id: &str) -> Result<(), MutationError>;
    fn add_field(&mut self, draft: &FieldDraft) -> Result<(), MutationError>;
    fn update_field(&mut self, field: &Field) -> Result<(), MutationError>;
    fn delete_field(&mut self, id: &FieldId) -> Result<(), MutationError>;

    fn execute(&mut self, request: Request) -> Response {
        match request {
            Request::ListBuyers => Response::Buyers(self.list_buyers()),
            Request::ListSellers => Response::Sellers(self.list_sellers()),
            Request::ListFields => Response::Fields(self.list_fields()),
            Request::LoadParty { kind, id } => {
                let result = self.load_party(kind, &id);
                Response::PartyLoaded { kind, id, result }
            }
            Request::AddParty { kind, draft } => Response::PartyAdded {
                kind,
                result: self.add_party(kind, &draft),
            },
            Request::UpdateParty { kind, id, draft } => {
                let result = self.update_party(kind, &id, &draft);
                Response::PartyUpdated { kind, id, result }
            }
            Request::DeleteParty { kind, id } => {
                let result = self.delete_party(kind, &id);
                Response::PartyDeleted { kind, id, result }
            }
            Request::AddField(draft) => Response::FieldAdded(self.add_field(&draft)),
            Request::UpdateField(field) => {
                let result = self.update_field(&field);
                Response::FieldUpdated { field, result }
            }
            Request::DeleteField(id) => {
                let result = self.delete_field(&id);
                Response::FieldDeleted { id, result }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputTarget {
    Global,
    Column { id: &'static str, header: String },
}

/// Line editor for the global search or one column filter. Every keystroke
/// is applied to the table immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InputLine {
    target: InputTarget,
    buffer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ColumnMenuUiState {
    cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    pending: VecDeque<Request>,
    input: Option<InputLine>,
    column_menu: Option<ColumnMenuUiState>,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    dispatch_command(state, &mut view_data, &internal_tx, AppCommand::Start);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        // One request per frame, so loading and in-flight states are on
        // screen while the call blocks.
        if !view_data.pending.is_empty() {
            run_next_request(state, runtime, &mut view_data, &internal_tx);
            continue;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if handle_key_event(state, &mut view_data, &internal_tx, key) {
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearNotification);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

/// Queues requests and arms the notification timer for `events`.
fn absorb_events(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>, events: Vec<AppEvent>) {
    for event in events {
        match event {
            AppEvent::Requested(request) => view_data.pending.push_back(request),
            AppEvent::Notified(_) => {
                view_data.status_token = view_data.status_token.saturating_add(1);
                schedule_status_clear(internal_tx, view_data.status_token);
            }
            AppEvent::TabChanged(tab) => {
                info!(tab = tab.label(), "tab changed");
                view_data.input = None;
                view_data.column_menu = None;
            }
            AppEvent::EditorOpened(_)
            | AppEvent::EditorClosed
            | AppEvent::FieldDialogOpened
            | AppEvent::FieldDialogClosed
            | AppEvent::NotificationCleared => {}
        }
    }
}

fn dispatch_command(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    absorb_events(view_data, internal_tx, events);
}

fn run_next_request<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) -> bool {
    let Some(request) = view_data.pending.pop_front() else {
        return false;
    };
    debug!(?request, "running request");
    let response = runtime.execute(request);
    let events = state.apply(response);
    absorb_events(view_data, internal_tx, events);
    true
}

fn handle_key_event(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if state.editor.is_some() {
        handle_editor_key(state, view_data, internal_tx, key);
        return false;
    }

    if state.field_dialog.is_some() {
        handle_field_dialog_key(state, view_data, internal_tx, key);
        return false;
    }

    if view_data.input.is_some() {
        handle_input_key(state, view_data, internal_tx, key);
        return false;
    }

    if view_data.column_menu.is_some() {
        handle_column_menu_key(state, view_data, internal_tx, key);
        return false;
    }

    if let Some(command) = overlay_command_for_key(state, key) {
        dispatch_command(state, view_data, internal_tx, AppCommand::Table(command));
        return false;
    }
    if state.has_overlay() {
        return false;
    }

    let command = match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
            return false;
        }
        (KeyCode::Char('/'), _) => {
            let buffer = active_view(state).global_filter.clone();
            view_data.input = Some(InputLine {
                target: InputTarget::Global,
                buffer,
            });
            return false;
        }
        (KeyCode::Char('c'), KeyModifiers::NONE) => {
            view_data.column_menu = Some(ColumnMenuUiState::default());
            return false;
        }
        (KeyCode::Tab, _) | (KeyCode::Char(']'), _) => AppCommand::NextTab,
        (KeyCode::BackTab, _) | (KeyCode::Char('['), _) => AppCommand::PrevTab,
        (KeyCode::Char(digit @ '1'..='3'), _) => {
            let index = digit as usize - '1' as usize;
            AppCommand::SelectTab(TabKind::ALL[index])
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => AppCommand::Refresh,
        (KeyCode::Char('a'), KeyModifiers::NONE) => AppCommand::OpenAdd,
        _ => match table_command_for_key(key) {
            Some(command) => AppCommand::Table(command),
            None => return false,
        },
    };
    dispatch_command(state, view_data, internal_tx, command);
    false
}

/// Keys for the row menu and the delete confirmation. While either is
/// open nothing else reaches the table.
fn overlay_command_for_key(state: &AppState, key: KeyEvent) -> Option<TableCommand> {
    let (menu_open, delete_open) = active_overlays(state);
    if delete_open {
        return match key.code {
            KeyCode::Enter | KeyCode::Char('y') => Some(TableCommand::ConfirmDelete),
            KeyCode::Esc | KeyCode::Char('n') => Some(TableCommand::CancelDelete),
            _ => None,
        };
    }
    if menu_open {
        let input = match key.code {
            KeyCode::Char('j') | KeyCode::Down => MenuInput::Down,
            KeyCode::Char('k') | KeyCode::Up => MenuInput::Up,
            KeyCode::Enter => MenuInput::Choose,
            KeyCode::Esc | KeyCode::Char('q') => MenuInput::Close,
            _ => return None,
        };
        return Some(TableCommand::Menu(input));
    }
    None
}

fn table_command_for_key(key: KeyEvent) -> Option<TableCommand> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(TableCommand::CursorDown),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(TableCommand::CursorUp),
        (KeyCode::Char('n'), _) | (KeyCode::Char('l'), _) | (KeyCode::Right, _) => {
            Some(TableCommand::NextPage)
        }
        (KeyCode::Char('p'), _) | (KeyCode::Char('h'), _) | (KeyCode::Left, _) => {
            Some(TableCommand::PrevPage)
        }
        (KeyCode::Char('s'), KeyModifiers::NONE) => Some(TableCommand::ToggleSort),
        (KeyCode::Char(' '), _) => Some(TableCommand::ToggleRow),
        (KeyCode::Char('*'), _) => Some(TableCommand::TogglePage),
        (KeyCode::Enter, _) | (KeyCode::Char('m'), _) => Some(TableCommand::OpenRowMenu),
        _ => None,
    }
}

fn handle_editor_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(editor) = state.editor.as_mut() else {
        return;
    };
    let command = match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => Some(AppCommand::CloseEditor),
        (KeyCode::Char('s'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(AppCommand::SubmitEditor)
        }
        (KeyCode::Enter, _) if editor.focus.is_multiline() => {
            editor.type_char('\n');
            None
        }
        (KeyCode::Enter, _) => Some(AppCommand::SubmitEditor),
        (KeyCode::Tab, _) | (KeyCode::Down, _) => {
            editor.focus_next();
            None
        }
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => {
            editor.focus_prev();
            None
        }
        (KeyCode::Left, _) | (KeyCode::Right, _) if editor.focus == PartyInput::Status => {
            editor.type_char(' ');
            None
        }
        (KeyCode::Backspace, _) => {
            editor.backspace();
            None
        }
        (KeyCode::Char(ch), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
            editor.type_char(ch);
            None
        }
        _ => None,
    };
    if let Some(command) = command {
        dispatch_command(state, view_data, internal_tx, command);
    }
}

fn handle_field_dialog_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(dialog) = state.field_dialog.as_mut() else {
        return;
    };
    let on_choice = matches!(dialog.focus, FieldInput::Category | FieldInput::Type);
    let command = match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => Some(AppCommand::CloseFieldDialog),
        (KeyCode::Char('s'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(AppCommand::SubmitFieldDialog)
        }
        (KeyCode::Enter, _) if dialog.focus == FieldInput::Description => {
            dialog.type_char('\n');
            None
        }
        (KeyCode::Enter, _) => Some(AppCommand::SubmitFieldDialog),
        (KeyCode::Tab, _) | (KeyCode::Down, _) => {
            dialog.focus_next();
            None
        }
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => {
            dialog.focus_prev();
            None
        }
        (KeyCode::Left, _) if dialog.focus == FieldInput::Type => {
            dialog.move_type_cursor(-1);
            None
        }
        (KeyCode::Right, _) if dialog.focus == FieldInput::Type => {
            dialog.move_type_cursor(1);
            None
        }
        (KeyCode::Char(' '), _) if on_choice => {
            dialog.toggle_choice();
            None
        }
        (KeyCode::Backspace, _) => {
            dialog.backspace();
            None
        }
        (KeyCode::Char(ch), modifiers)
            if !on_choice && !modifiers.contains(KeyModifiers::CONTROL) =>
        {
            dialog.type_char(ch);
            None
        }
        _ => None,
    };
    if let Some(command) = command {
        dispatch_command(state, view_data, internal_tx, command);
    }
}

fn filter_command(target: &InputTarget, value: String) -> TableCommand {
    match target {
        InputTarget::Global => TableCommand::SetGlobalFilter(value),
        InputTarget::Column { id, .. } => TableCommand::SetColumnFilter { column: *id, value },
    }
}

fn handle_input_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(input) = view_data.input.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Enter => {
            view_data.input = None;
            return;
        }
        KeyCode::Esc => {
            let command = filter_command(&input.target, String::new());
            view_data.input = None;
            dispatch_command(state, view_data, internal_tx, AppCommand::Table(command));
            return;
        }
        KeyCode::Backspace => {
            input.buffer.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            input.buffer.push(ch);
        }
        _ => return,
    }
    let command = filter_command(&input.target, input.buffer.clone());
    dispatch_command(state, view_data, internal_tx, AppCommand::Table(command));
}

fn handle_column_menu_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let entries = active_visibility_entries(state);
    let Some(menu) = view_data.column_menu.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc | KeyCode::Char('c') => view_data.column_menu = None,
        KeyCode::Char('j') | KeyCode::Down => {
            menu.cursor = (menu.cursor + 1).min(entries.len().saturating_sub(1));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            menu.cursor = menu.cursor.saturating_sub(1);
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some((id, _, _)) = entries.get(menu.cursor) {
                let command = AppCommand::Table(TableCommand::ToggleColumn(*id));
                dispatch_command(state, view_data, internal_tx, command);
            }
        }
        KeyCode::Char('f') => {
            if let Some((id, header, _)) = entries.get(menu.cursor) {
                let buffer = active_view(state)
                    .column_filters
                    .get(id)
                    .cloned()
                    .unwrap_or_default();
                view_data.column_menu = None;
                view_data.input = Some(InputLine {
                    target: InputTarget::Column {
                        id: *id,
                        header: header.clone(),
                    },
                    buffer,
                });
            }
        }
        _ => {}
    }
}

fn active_view(state: &AppState) -> &ViewState {
    match state.active_tab {
        TabKind::Buyers => &state.buyers.view,
        TabKind::Sellers => &state.sellers.view,
        TabKind::Fields => &state.fields.view,
    }
}

/// `(row menu open, delete confirmation open)` on the active tab.
fn active_overlays(state: &AppState) -> (bool, bool) {
    match state.active_tab {
        TabKind::Buyers => (state.buyers.menu.is_some(), state.buyers.delete.is_some()),
        TabKind::Sellers => (state.sellers.menu.is_some(), state.sellers.delete.is_some()),
        TabKind::Fields => (state.fields.menu.is_some(), state.fields.delete.is_some()),
    }
}

fn active_visibility_entries(state: &AppState) -> Vec<(&'static str, String, bool)> {
    match state.active_tab {
        TabKind::Buyers => visibility_menu(state.buyers.columns(), &state.buyers.view),
        TabKind::Sellers => visibility_menu(state.sellers.columns(), &state.sellers.view),
        TabKind::Fields => visibility_menu(state.fields.columns(), &state.fields.view),
    }
}

fn title_case(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn tab_title(tab: TabKind, state: &AppState) -> String {
    let view = match tab {
        TabKind::Buyers => &state.buyers.view,
        TabKind::Sellers => &state.sellers.view,
        TabKind::Fields => &state.fields.view,
    };
    let filtered = !view.global_filter.is_empty() || !view.column_filters.is_empty();
    if tab == state.active_tab && filtered {
        format!(" {} {FILTER_MARK} ", title_case(tab.label()))
    } else {
        format!(" {} ", title_case(tab.label()))
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tab_titles = TabKind::ALL
        .iter()
        .map(|tab| tab_title(*tab, state))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("marketdesk").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    if let Some(editor) = &state.editor {
        render_editor(frame, layout[1], editor);
    } else {
        match state.active_tab {
            TabKind::Buyers => render_screen(frame, layout[1], &state.buyers, view_data),
            TabKind::Sellers => render_screen(frame, layout[1], &state.sellers, view_data),
            TabKind::Fields => render_screen(frame, layout[1], &state.fields, view_data),
        }
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(status_style(state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, layout[2]);

    if let Some(dialog) = &state.field_dialog {
        let area = centered_rect(60, 50, frame.area());
        frame.render_widget(Clear, area);
        let body = Paragraph::new(render_field_dialog_text(dialog))
            .wrap(Wrap { trim: false })
            .block(Block::default().title(dialog.title()).borders(Borders::ALL));
        frame.render_widget(body, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_screen<R: ScreenEntity>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    screen: &TableScreen<R>,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let search = Paragraph::new(search_line_text(
        R::TAB,
        &screen.view,
        view_data.input.as_ref(),
    ))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(search, layout[0]);

    let projection = screen.projection();
    render_table(frame, layout[1], &projection, &screen.view, screen.cursor());

    let footer = footer_segments(&projection)
        .into_iter()
        .map(|(text, enabled)| {
            let style = if enabled {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!("{text}   "), style)
        })
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(Line::from(footer)), layout[2]);

    if let Some(menu) = &screen.menu {
        let area = centered_rect(24, 20, frame.area());
        frame.render_widget(Clear, area);
        let body = Paragraph::new(render_row_menu_text(menu))
            .block(Block::default().title(menu.row_name.as_str()).borders(Borders::ALL));
        frame.render_widget(body, area);
    }

    if let Some(dialog) = &screen.delete {
        let area = centered_rect(56, 30, frame.area());
        frame.render_widget(Clear, area);
        let body = Paragraph::new(render_delete_dialog_text(R::TAB, dialog))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(format!("Delete {}", R::NOUN))
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(body, area);
    }

    if let Some(menu) = view_data.column_menu {
        let entries = visibility_menu(screen.columns(), &screen.view);
        let area = centered_rect(44, 40, frame.area());
        frame.render_widget(Clear, area);
        let body = Paragraph::new(render_column_menu_text(&entries, &screen.view, menu.cursor))
            .block(Block::default().title("columns").borders(Borders::ALL));
        frame.render_widget(body, area);
    }
}

fn render_table<R: ScreenEntity>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    projection: &TableView<'_, R>,
    view: &ViewState,
    cursor: usize,
) {
    let widths = projection
        .columns
        .iter()
        .map(|column| match column {
            Column::Label(_) => Constraint::Min(10),
            Column::Computed(_) => Constraint::Length(3),
        })
        .collect::<Vec<_>>();

    let header = Row::new(projection.columns.iter().map(|column| {
        Cell::from(header_label(*column, view, projection.header_mark)).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows: Vec<Row<'_>> = match projection.body.placeholder() {
        Some(placeholder) => {
            let first_label = projection
                .columns
                .iter()
                .position(|column| matches!(column, Column::Label(_)))
                .unwrap_or(0);
            let cells = (0..projection.columns.len()).map(|index| {
                if index == first_label {
                    Cell::from(placeholder).style(Style::default().fg(Color::DarkGray))
                } else {
                    Cell::from("")
                }
            });
            vec![Row::new(cells)]
        }
        None => projection
            .rows()
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let context = RowContext {
                    selected: view.is_selected(record.row_key()),
                };
                let cells = projection
                    .columns
                    .iter()
                    .map(|column| Cell::from(column.value(record, context).display()));
                let mut style = Style::default();
                if context.selected {
                    style = style.fg(Color::Cyan);
                }
                if index == cursor {
                    style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
                }
                Row::new(cells).style(style)
            })
            .collect(),
    };

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_editor(frame: &mut ratatui::Frame<'_>, area: Rect, editor: &PartyEditor) {
    let text = render_editor_text(editor);
    let lines = text
        .lines()
        .map(|line| {
            let style = if line.starts_with("  ! ") {
                Style::default().fg(Color::Red)
            } else if line.starts_with('>') {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            Line::styled(line.to_owned(), style)
        })
        .collect::<Vec<_>>();
    let body = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .block(Block::default().title(editor.title()).borders(Borders::ALL));
    frame.render_widget(body, area);
}

fn header_label<R>(column: &Column<R>, view: &ViewState, mark: SelectionMark) -> String {
    match column {
        Column::Computed(computed) if computed.id == marketdesk_app::SELECT_COLUMN => {
            match mark {
                SelectionMark::Checked => "[x]",
                SelectionMark::Indeterminate => "[-]",
                SelectionMark::Unchecked => "[ ]",
            }
            .to_owned()
        }
        Column::Computed(_) => String::new(),
        Column::Label(_) => {
            let mut label = column.header().to_owned();
            if let Some(sort) = view.sort().filter(|sort| sort.column == column.id()) {
                label.push_str(match sort.direction {
                    SortDirection::Asc => SORT_ASC,
                    SortDirection::Desc => SORT_DESC,
                });
            }
            label
        }
    }
}

fn search_placeholder(tab: TabKind) -> &'static str {
    match tab {
        TabKind::Buyers | TabKind::Sellers => "Search by name, phone...",
        TabKind::Fields => "Search by title, category...",
    }
}

fn search_line_text(tab: TabKind, view: &ViewState, input: Option<&InputLine>) -> String {
    if let Some(InputLine {
        target: InputTarget::Column { header, .. },
        buffer,
    }) = input
    {
        return format!("{header} contains: {buffer}_");
    }

    let editing = input.is_some();
    let mut text = if view.global_filter.is_empty() && !editing {
        search_placeholder(tab).to_owned()
    } else {
        format!("/{}", view.global_filter)
    };
    if editing {
        text.push('_');
    }
    for (column, value) in &view.column_filters {
        text.push_str(&format!("   {column}~{value}"));
    }
    text
}

/// Footer pieces with whether each is active.
fn footer_segments<R>(projection: &TableView<'_, R>) -> Vec<(String, bool)> {
    vec![
        (projection.selection_summary(), true),
        (
            format!(
                "Page {} of {}",
                projection.page_index + 1,
                projection.page_count
            ),
            true,
        ),
        ("[p] Previous".to_owned(), projection.can_previous),
        ("[n] Next".to_owned(), projection.can_next),
    ]
}

fn render_row_menu_text(menu: &RowActionMenu) -> String {
    RowAction::ALL
        .iter()
        .map(|action| {
            let marker = if *action == menu.highlighted() { ">" } else { " " };
            format!("{marker} {}", action.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_delete_dialog_text(tab: TabKind, dialog: &DeleteDialog) -> String {
    let question = match tab {
        TabKind::Fields => format!("Are you sure you want to delete \"{}\"?", dialog.name),
        TabKind::Buyers | TabKind::Sellers => {
            format!("Are you sure you want to delete {}'s information?", dialog.name)
        }
    };
    let action = if dialog.delete_enabled() {
        "[enter] Delete"
    } else {
        "Deleting..."
    };
    format!("{question} This action cannot be undone.\n\n[esc] Cancel    {action}")
}

fn render_column_menu_text(
    entries: &[(&'static str, String, bool)],
    view: &ViewState,
    cursor: usize,
) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(index, (id, header, visible))| {
            let marker = if index == cursor { ">" } else { " " };
            let check = if *visible { "[x]" } else { "[ ]" };
            match view.column_filters.get(id) {
                Some(value) => format!("{marker} {check} {header}  ~{value}"),
                None => format!("{marker} {check} {header}"),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn input_placeholder(kind: PartyKind, input: PartyInput) -> String {
    let noun = kind.noun().to_lowercase();
    match input {
        PartyInput::Name => format!("Enter {noun} name"),
        PartyInput::Email => format!("Enter {noun} email"),
        PartyInput::Phone => "Enter 10-digit phone number".to_owned(),
        PartyInput::Status => "Select status".to_owned(),
        PartyInput::About => format!("Enter details about the {noun}"),
    }
}

fn render_editor_text(editor: &PartyEditor) -> String {
    if editor.is_loading() {
        return marketdesk_app::LOADING_PLACEHOLDER.to_owned();
    }

    let mut lines = Vec::new();
    for input in PartyInput::ALL {
        let marker = if editor.focus == input { ">" } else { " " };
        let text = editor.form.text(input);
        let value = if text.is_empty() {
            format!("({})", input_placeholder(editor.kind(), input))
        } else if input == PartyInput::Status {
            format!("< {text} >")
        } else {
            text.replace('\n', "\n    ")
        };
        lines.push(format!("{marker} {}: {value}", input.label()));
        if let Some(error) = editor.form.errors().get(input) {
            lines.push(format!("  ! {error}"));
        }
    }

    lines.push(String::new());
    let submit = if editor.form.is_submitting() {
        "Saving...".to_owned()
    } else if editor.submit_enabled() {
        "[enter] Save".to_owned()
    } else {
        "[enter] Save (fix the errors above)".to_owned()
    };
    lines.push(format!("{submit}    [esc] Back"));
    lines.join("\n")
}

fn render_field_dialog_text(dialog: &FieldDialog) -> String {
    let mut lines = Vec::new();
    for input in FieldInput::ALL {
        let marker = if dialog.focus == input { ">" } else { " " };
        let value = match input {
            FieldInput::Title | FieldInput::Description => {
                let text = dialog.form.text(input);
                if text.is_empty() {
                    format!("(Field {})", input.label().to_lowercase())
                } else {
                    text.replace('\n', "\n    ")
                }
            }
            FieldInput::Category => match dialog.form.text(input) {
                "" => "(Select a category)".to_owned(),
                label => format!("< {label} >"),
            },
            FieldInput::Type => FieldType::ALL
                .iter()
                .map(|field_type| {
                    let check = if dialog.form.is_type_checked(*field_type) {
                        "[x]"
                    } else {
                        "[ ]"
                    };
                    let cursor = dialog.focus == FieldInput::Type
                        && dialog.type_cursor() == *field_type;
                    if cursor {
                        format!("»{check} {}", field_type.label())
                    } else {
                        format!(" {check} {}", field_type.label())
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        };
        lines.push(format!("{marker} {}: {value}", input.label()));
    }

    lines.push(String::new());
    let submit = if dialog.form.is_submitting() {
        "Saving...".to_owned()
    } else {
        format!("[enter] {}", dialog.submit_label())
    };
    lines.push(format!("{submit}    [esc] Cancel"));
    lines.join("\n")
}

fn status_style(state: &AppState) -> Style {
    match &state.notification {
        Some(note) if note.is_error() => Style::default().fg(Color::Red),
        Some(_) => Style::default().fg(Color::Green),
        None => Style::default().fg(Color::DarkGray),
    }
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if let Some(notification) = &state.notification {
        return notification.message.clone();
    }
    if state.editor.is_some() {
        return "tab/shift+tab move | space/←/→ status | enter save | esc back".to_owned();
    }
    if state.field_dialog.is_some() {
        return "tab/shift+tab move | ←/→ type | space choose | enter save | esc cancel".to_owned();
    }
    if view_data.input.is_some() {
        return "type to filter | enter keep | esc clear".to_owned();
    }
    if view_data.column_menu.is_some() {
        return "j/k move | space show/hide | f filter | esc close".to_owned();
    }
    match active_overlays(state) {
        (_, true) => "enter delete | esc cancel".to_owned(),
        (true, false) => "j/k move | enter choose | esc close".to_owned(),
        (false, false) => {
            "j/k rows | n/p page | s sort | space select | / search | c columns | enter actions | a add | r refresh | ? help | q quit"
                .to_owned()
        }
    }
}

fn help_overlay_text() -> &'static str {
    "tabs: tab/shift+tab [ ] 1-3\n\
rows: j/k move, space select, * select page\n\
pages: n/l next, p/h previous\n\
sort: s (name or title, toggles direction)\n\
search: / global, c then f for a column filter\n\
columns: c show/hide\n\
row actions: enter or m, then edit or delete\n\
records: a add, r refresh\n\
quit: q or ctrl+q"
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

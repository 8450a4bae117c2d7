use std::cell::RefCell;
use std::io::{self, Stdout, stdout};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use tracing::{info, warn};

use crate::io::config_io::read_config;
use crate::io::state::{ThemeMode, UiState, ViewMode, read_ui_state, write_ui_state};
use crate::io::storage::JsonFileStorage;
use crate::model::config::Config;
use crate::model::task::{Task, TaskStatus};
use crate::ops::board::timeline_rows;
use crate::ops::gesture::{ProgressGesture, ResizeGesture};
use crate::ops::store::{StoreEvent, TaskStore};
use crate::ops::task_ops::TaskError;
use crate::ops::timeline::TimelineAxis;

use super::input;
use super::render;
use super::theme::Theme;

/// Which top-level view is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Board,
    Timeline,
}

impl From<ViewMode> for View {
    fn from(mode: ViewMode) -> Self {
        match mode {
            ViewMode::Board => View::Board,
            ViewMode::Timeline => View::Timeline,
        }
    }
}

impl From<View> for ViewMode {
    fn from(view: View) -> Self {
        match view {
            View::Board => ViewMode::Board,
            View::Timeline => ViewMode::Timeline,
        }
    }
}

/// Interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// A one-line prompt in the status row
    Edit,
    Confirm,
}

/// Board sections, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Inbox,
    Ongoing,
    History,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Inbox, Section::Ongoing, Section::History];

    pub fn status(self) -> TaskStatus {
        match self {
            Section::Inbox => TaskStatus::Inbox,
            Section::Ongoing => TaskStatus::Ongoing,
            Section::History => TaskStatus::Completed,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Section::Inbox => 0,
            Section::Ongoing => 1,
            Section::History => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Inbox => "Inbox",
            Section::Ongoing => "Ongoing",
            Section::History => "History",
        }
    }

    fn for_status(status: TaskStatus) -> Option<Section> {
        match status {
            TaskStatus::Inbox => Some(Section::Inbox),
            TaskStatus::Ongoing => Some(Section::Ongoing),
            TaskStatus::Completed => Some(Section::History),
            TaskStatus::Archived => None,
        }
    }
}

/// Rows of the detail overlay the cursor can sit on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailRow {
    Title,
    Description,
    Start,
    End,
    Deadline,
    Progress,
    Subtask(usize),
}

pub fn detail_rows(task: &Task) -> Vec<DetailRow> {
    let mut rows = vec![
        DetailRow::Title,
        DetailRow::Description,
        DetailRow::Start,
        DetailRow::End,
        DetailRow::Deadline,
        DetailRow::Progress,
    ];
    rows.extend((0..task.subtasks.len()).map(DetailRow::Subtask));
    rows
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailState {
    pub task_id: String,
    pub cursor: usize,
}

/// What a status-row prompt is collecting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    NewTaskTitle,
    NewTaskDeadline { title: String },
    Field { task_id: String, row: DetailRow },
    NewSubtask { task_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub target: EditTarget,
    pub buffer: String,
    /// Byte offset into `buffer`
    pub cursor: usize,
}

impl EditState {
    pub fn new(target: EditTarget, initial: String) -> Self {
        let cursor = initial.len();
        EditState {
            target,
            buffer: initial,
            cursor,
        }
    }

    pub fn label(&self) -> &'static str {
        match &self.target {
            EditTarget::NewTaskTitle => "new task",
            EditTarget::NewTaskDeadline { .. } => "end date (empty = today)",
            EditTarget::NewSubtask { .. } => "subtask",
            EditTarget::Field { row, .. } => match row {
                DetailRow::Title => "title",
                DetailRow::Description => "description",
                DetailRow::Start => "start",
                DetailRow::End => "end",
                DetailRow::Deadline => "deadline (empty = none)",
                DetailRow::Progress => "progress",
                DetailRow::Subtask(_) => "subtask",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteTask { task_id: String },
}

/// Screen positions recorded by the last render, for mouse hit-testing
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    pub timeline: Option<TimelineHit>,
    pub progress_bars: Vec<ProgressHit>,
    pub rows: Vec<RowHit>,
}

/// The chart area of the timeline: column 0 of the chart is axis position 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineHit {
    pub x: u16,
    pub width: u16,
    /// Screen row of each task bar
    pub rows: Vec<(u16, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressHit {
    pub task_id: String,
    pub x: u16,
    pub y: u16,
    pub width: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowHit {
    pub task_id: String,
    pub area: Rect,
}

impl RowHit {
    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.area.x
            && col < self.area.x + self.area.width
            && row >= self.area.y
            && row < self.area.y + self.area.height
    }
}

/// Main application state
pub struct App {
    pub store: TaskStore,
    pub config: Config,
    /// Where UI state is saved; None keeps it in memory only
    pub data_dir: Option<PathBuf>,
    pub view: View,
    pub mode: Mode,
    pub theme_mode: ThemeMode,
    pub theme: Theme,
    pub section: Section,
    pub board_cursors: [usize; 3],
    pub timeline_cursor: usize,
    pub detail: Option<DetailState>,
    pub edit: Option<EditState>,
    pub confirm: Option<ConfirmAction>,
    pub status_message: Option<String>,
    pub status_is_error: bool,
    pub show_help: bool,
    pub should_quit: bool,
    pub resize: ResizeGesture,
    pub progress_drag: ProgressGesture,
    pub hits: HitMap,
    store_events: Rc<RefCell<Vec<StoreEvent>>>,
}

impl App {
    pub fn new(mut store: TaskStore, config: Config) -> Self {
        let store_events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&store_events);
        store.subscribe(move |event, _| sink.borrow_mut().push(event.clone()));

        let theme_mode = ThemeMode::default();
        let theme = Theme::from_config(theme_mode, &config.ui);
        App {
            store,
            config,
            data_dir: None,
            view: View::Board,
            mode: Mode::Navigate,
            theme_mode,
            theme,
            section: Section::Inbox,
            board_cursors: [0; 3],
            timeline_cursor: 0,
            detail: None,
            edit: None,
            confirm: None,
            status_message: None,
            status_is_error: false,
            show_help: false,
            should_quit: false,
            resize: ResizeGesture::new(),
            progress_drag: ProgressGesture::new(),
            hits: HitMap::default(),
            store_events,
        }
    }

    pub fn with_data_dir(mut self, data_dir: &Path) -> Self {
        self.data_dir = Some(data_dir.to_path_buf());
        self
    }

    pub fn axis(&self) -> TimelineAxis {
        TimelineAxis::from_config(self.store.today(), &self.config.timeline)
    }

    pub fn section_tasks(&self, section: Section) -> Vec<&Task> {
        let status = section.status();
        self.store
            .tasks()
            .iter()
            .filter(|t| t.status == status)
            .collect()
    }

    fn section_counts(&self) -> [usize; 3] {
        Section::ALL.map(|s| self.section_tasks(s).len())
    }

    /// The task under the cursor: the detail overlay's task when open,
    /// otherwise the cursor row of the current view.
    pub fn selected_task(&self) -> Option<&Task> {
        if let Some(detail) = &self.detail {
            return self.store.get(&detail.task_id);
        }
        match self.view {
            View::Board => self
                .section_tasks(self.section)
                .get(self.board_cursors[self.section.index()])
                .copied(),
            View::Timeline => timeline_rows(self.store.tasks())
                .get(self.timeline_cursor)
                .copied(),
        }
    }

    pub fn selected_task_id(&self) -> Option<String> {
        self.selected_task().map(|t| t.id.clone())
    }

    /// Put the cursor on `id` in every view that shows it
    pub fn select_task(&mut self, id: &str) {
        let Some(task) = self.store.get(id) else {
            return;
        };
        if let Some(section) = Section::for_status(task.status) {
            let index = self
                .section_tasks(section)
                .iter()
                .position(|t| t.id == id)
                .unwrap_or(0);
            self.section = section;
            self.board_cursors[section.index()] = index;
        }
        if let Some(index) = timeline_rows(self.store.tasks())
            .iter()
            .position(|t| t.id == id)
        {
            self.timeline_cursor = index;
        }
    }

    pub fn move_cursor(&mut self, down: bool) {
        match self.view {
            View::Timeline => {
                let count = timeline_rows(self.store.tasks()).len();
                self.timeline_cursor = if down {
                    (self.timeline_cursor + 1).min(count.saturating_sub(1))
                } else {
                    self.timeline_cursor.saturating_sub(1)
                };
            }
            View::Board => self.move_board_cursor(down),
        }
    }

    /// j/k on the board walk through all three sections in order
    fn move_board_cursor(&mut self, down: bool) {
        let counts = self.section_counts();
        let s = self.section.index();
        let cur = self.board_cursors[s];
        if down {
            if cur + 1 < counts[s] {
                self.board_cursors[s] = cur + 1;
            } else if let Some(next) = (s + 1..3).find(|&i| counts[i] > 0) {
                self.section = Section::ALL[next];
                self.board_cursors[next] = 0;
            }
        } else if cur > 0 && counts[s] > 0 {
            self.board_cursors[s] = (cur - 1).min(counts[s] - 1);
        } else if let Some(prev) = (0..s).rev().find(|&i| counts[i] > 0) {
            self.section = Section::ALL[prev];
            self.board_cursors[prev] = counts[prev] - 1;
        }
    }

    pub fn jump_cursor(&mut self, to_end: bool) {
        match self.view {
            View::Timeline => {
                let count = timeline_rows(self.store.tasks()).len();
                self.timeline_cursor = if to_end { count.saturating_sub(1) } else { 0 };
            }
            View::Board => {
                let counts = self.section_counts();
                let found = if to_end {
                    (0..3).rev().find(|&i| counts[i] > 0)
                } else {
                    (0..3).find(|&i| counts[i] > 0)
                };
                if let Some(i) = found {
                    self.section = Section::ALL[i];
                    self.board_cursors[i] = if to_end { counts[i] - 1 } else { 0 };
                }
            }
        }
    }

    fn clamp_cursors(&mut self) {
        let counts = self.section_counts();
        for (cursor, count) in self.board_cursors.iter_mut().zip(counts) {
            *cursor = (*cursor).min(count.saturating_sub(1));
        }
        let rows = timeline_rows(self.store.tasks()).len();
        self.timeline_cursor = self.timeline_cursor.min(rows.saturating_sub(1));

        let detail_len = self
            .detail
            .as_ref()
            .and_then(|d| self.store.get(&d.task_id))
            .map(|t| detail_rows(t).len());
        if let (Some(detail), Some(len)) = (&mut self.detail, detail_len) {
            detail.cursor = detail.cursor.min(len.saturating_sub(1));
        }
    }

    /// Apply what the store reported since the last call: close the detail
    /// overlay of a deleted task and keep cursors in range.
    pub fn sync_store_events(&mut self) {
        let events: Vec<StoreEvent> = self.store_events.borrow_mut().drain(..).collect();
        if events.is_empty() {
            return;
        }
        for event in &events {
            if let StoreEvent::Deleted(id) = event
                && self.detail.as_ref().is_some_and(|d| &d.task_id == id)
            {
                self.detail = None;
            }
        }
        self.clamp_cursors();
    }

    pub fn open_detail(&mut self) {
        if let Some(task_id) = self.selected_task_id() {
            self.detail = Some(DetailState { task_id, cursor: 0 });
        }
    }

    pub fn detail_row(&self) -> Option<DetailRow> {
        let detail = self.detail.as_ref()?;
        let task = self.store.get(&detail.task_id)?;
        detail_rows(task).get(detail.cursor).copied()
    }

    pub fn begin_edit(&mut self, target: EditTarget, initial: String) {
        self.edit = Some(EditState::new(target, initial));
        self.mode = Mode::Edit;
    }

    pub fn gesture_active(&self) -> bool {
        self.resize.is_active() || self.progress_drag.is_active()
    }

    pub fn set_view(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.save_ui_state();
        }
    }

    pub fn toggle_theme(&mut self) {
        self.set_theme(self.theme_mode.toggled());
        self.save_ui_state();
    }

    fn set_theme(&mut self, mode: ThemeMode) {
        self.theme_mode = mode;
        self.theme = Theme::from_config(mode, &self.config.ui);
    }

    pub fn restore_ui_state(&mut self) {
        let Some(dir) = &self.data_dir else {
            return;
        };
        if let Some(state) = read_ui_state(dir) {
            self.view = state.view.into();
            self.set_theme(state.theme);
        }
    }

    pub fn save_ui_state(&self) {
        let Some(dir) = &self.data_dir else {
            return;
        };
        let state = UiState {
            view: self.view.into(),
            theme: self.theme_mode,
        };
        if let Err(e) = write_ui_state(dir, &state) {
            warn!(error = %e, "could not save UI state");
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_is_error = true;
    }

    /// Show a store result in the status row
    pub fn report(&mut self, result: Result<(), TaskError>, success: impl Into<String>) {
        match result {
            Ok(()) => self.set_status(success),
            Err(e) => self.set_error(e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Terminal lifecycle
// ---------------------------------------------------------------------------

/// Raw mode, the alternate screen, mouse capture and focus reporting, held
/// for as long as the TUI runs. Dropping it hands the terminal back.
struct TerminalGuard;

impl TerminalGuard {
    fn acquire() -> io::Result<Self> {
        // Built first so a failure halfway still restores what was enabled
        let guard = TerminalGuard;
        enable_raw_mode()?;
        execute!(
            stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange
        )?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = restore_terminal() {
            warn!(error = %e, "could not restore terminal");
        }
    }
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        stdout(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )
}

/// Run the TUI against the tasks in `data_dir`
pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = read_config(data_dir)?;
    let mut store = TaskStore::new(Box::new(JsonFileStorage::new(data_dir)))
        .with_id_prefix(&config.ids.prefix);
    store.load_from_storage();

    let mut app = App::new(store, config).with_data_dir(data_dir);
    app.restore_ui_state();
    info!(data_dir = %data_dir.display(), "tui started");

    // Hand the terminal back before the panic message prints
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let guard = TerminalGuard::acquire()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let result = run_event_loop(&mut terminal, &mut app);
    drop(guard);
    terminal.show_cursor()?;

    app.save_ui_state();
    result.map_err(Into::into)
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                }
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                Event::FocusLost => input::handle_focus_lost(app),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn board_cursor_walks_across_sections() {
        let mut app = app_with_tasks(sample_tasks());
        assert_eq!(app.selected_task_id().as_deref(), Some("T-001"));
        app.move_cursor(true);
        assert_eq!(app.section, Section::Ongoing);
        assert_eq!(app.selected_task_id().as_deref(), Some("T-002"));
        app.move_cursor(true);
        app.move_cursor(true);
        assert_eq!(app.section, Section::History);
        assert_eq!(app.selected_task_id().as_deref(), Some("T-004"));
        // Bottom stays put
        app.move_cursor(true);
        assert_eq!(app.selected_task_id().as_deref(), Some("T-004"));
        app.move_cursor(false);
        assert_eq!(app.selected_task_id().as_deref(), Some("T-003"));
    }

    #[test]
    fn timeline_cursor_skips_closed_tasks() {
        let mut app = app_with_tasks(sample_tasks());
        app.view = View::Timeline;
        app.jump_cursor(true);
        // T-004 is completed, so the last row is T-003
        assert_eq!(app.selected_task_id().as_deref(), Some("T-003"));
    }

    #[test]
    fn select_task_follows_status() {
        let mut app = app_with_tasks(sample_tasks());
        app.store.promote("T-001").unwrap();
        app.select_task("T-001");
        assert_eq!(app.section, Section::Ongoing);
        assert_eq!(app.selected_task_id().as_deref(), Some("T-001"));
    }

    #[test]
    fn deleting_detail_task_closes_overlay() {
        let mut app = app_with_tasks(sample_tasks());
        app.select_task("T-002");
        app.open_detail();
        assert!(app.detail.is_some());
        app.store.delete_task("T-002").unwrap();
        app.sync_store_events();
        assert!(app.detail.is_none());
        assert!(app.store.get("T-002").is_none());
    }

    #[test]
    fn cursors_clamp_after_delete() {
        let mut app = app_with_tasks(sample_tasks());
        app.select_task("T-003");
        assert_eq!(app.board_cursors[1], 1);
        app.store.delete_task("T-003").unwrap();
        app.sync_store_events();
        assert_eq!(app.board_cursors[1], 0);
    }

    #[test]
    fn ui_state_round_trips_through_data_dir() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(sample_tasks()).with_data_dir(tmp.path());
        app.set_view(View::Timeline);
        app.toggle_theme();
        let mode = app.theme_mode;

        let mut fresh = app_with_tasks(sample_tasks()).with_data_dir(tmp.path());
        fresh.restore_ui_state();
        assert_eq!(fresh.view, View::Timeline);
        assert_eq!(fresh.theme_mode, mode);
        assert_eq!(fresh.theme, Theme::from_config(mode, &fresh.config.ui));
    }

    #[test]
    fn detail_rows_list_subtasks_last() {
        let tasks = sample_tasks();
        let rows = detail_rows(&tasks[2]);
        assert_eq!(rows.len(), 6 + tasks[2].subtasks.len());
        assert_eq!(rows[6], DetailRow::Subtask(0));
    }
}

use crate::config::Config;
use crate::model::EventRecord;
use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Screen {
    Menu,
    UrlInput,
    EventBrowser,
    NoteInput,
}

/// One row of the event browser. Blocked/note status is not stored here; it
/// is looked up in the config on every render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserEntry {
    pub title: String,
    pub start: DateTime<Utc>,
    pub description: String,
}

impl BrowserEntry {
    /// `None` for records the upcoming index would never return.
    pub fn from_record(rec: &EventRecord) -> Option<Self> {
        Some(Self {
            title: rec.title.clone(),
            start: rec.start?,
            description: rec.description.clone(),
        })
    }
}

pub struct AppState {
    // Data
    pub config: Config,
    pub events: Vec<BrowserEntry>,

    // UI State
    pub screen: Screen,
    pub list_state: ListState,
    /// Event the note editor is attached to.
    pub selected_idx: Option<usize>,
    pub message: String,
    pub unsaved_changes: bool,

    // Input Buffer
    pub input_buffer: String,
    pub cursor_position: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            events: vec![],
            screen: Screen::Menu,
            list_state: ListState::default(),
            selected_idx: None,
            message: String::new(),
            unsaved_changes: false,
            input_buffer: String::new(),
            cursor_position: 0,
        }
    }

    pub fn get_selected_event(&self) -> Option<&BrowserEntry> {
        self.list_state.selected().and_then(|idx| self.events.get(idx))
    }

    pub fn is_blocked(&self, entry: &BrowserEntry) -> bool {
        self.config.is_blocked(&entry.title)
    }

    pub fn note_for(&self, entry: &BrowserEntry) -> Option<&str> {
        self.config.note(&entry.title)
    }

    pub fn set_events(&mut self, events: Vec<BrowserEntry>) {
        self.events = events;
        self.list_state
            .select(if self.events.is_empty() { None } else { Some(0) });
        self.selected_idx = None;
    }

    // --- INPUT HELPERS ---
    pub fn move_cursor_left(&mut self) {
        let cursor_moved_left = self.cursor_position.saturating_sub(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_left);
    }
    pub fn move_cursor_right(&mut self) {
        let cursor_moved_right = self.cursor_position.saturating_add(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_right);
    }
    pub fn enter_char(&mut self, new_char: char) {
        let byte_idx = self.byte_index();
        self.input_buffer.insert(byte_idx, new_char);
        self.move_cursor_right();
    }
    pub fn delete_char(&mut self) {
        if self.cursor_position != 0 {
            let current_index = self.cursor_position;
            let before = self.input_buffer.chars().take(current_index - 1);
            let after = self.input_buffer.chars().skip(current_index);
            self.input_buffer = before.chain(after).collect();
            self.move_cursor_left();
        }
    }
    pub fn load_input(&mut self, text: &str) {
        self.input_buffer = text.to_string();
        self.cursor_position = self.input_buffer.chars().count();
    }
    pub fn reset_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }
    fn byte_index(&self) -> usize {
        self.input_buffer
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.cursor_position)
            .unwrap_or(self.input_buffer.len())
    }
    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.clamp(0, self.input_buffer.chars().count())
    }

    // --- NAVIGATION ---
    pub fn next(&mut self) {
        if self.events.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => {
                if i >= self.events.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }
    pub fn previous(&mut self) {
        if self.events.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.events.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }
}

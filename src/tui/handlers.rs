// File: src/tui/handlers.rs
use crate::error::Error;
use crate::model::EventRecord;
use crate::tui::action::{Effect, Input};
use crate::tui::state::{AppState, BrowserEntry, Screen};
use crate::upcoming::{CutoffPolicy, upcoming};
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};

/// Decodes a key press for the given screen.
pub fn map_key(screen: Screen, key: KeyEvent) -> Option<Input> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Input::Quit);
    }

    match screen {
        Screen::Menu => match key.code {
            KeyCode::Char('1') | KeyCode::Char('u') => Some(Input::SetUrl),
            KeyCode::Char('2') | KeyCode::Char('b') => Some(Input::Browse),
            KeyCode::Char('3') | KeyCode::Char('s') => Some(Input::Save),
            KeyCode::Char('q') => Some(Input::Quit),
            _ => None,
        },
        Screen::UrlInput | Screen::NoteInput => match key.code {
            KeyCode::Enter => Some(Input::Confirm),
            KeyCode::Esc => Some(Input::Cancel),
            KeyCode::Char(c) => Some(Input::Char(c)),
            KeyCode::Backspace => Some(Input::Backspace),
            KeyCode::Left => Some(Input::CursorLeft),
            KeyCode::Right => Some(Input::CursorRight),
            _ => None,
        },
        Screen::EventBrowser => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(Input::Toggle),
            KeyCode::Char('n') => Some(Input::EditNotes),
            KeyCode::Esc => Some(Input::Back),
            KeyCode::Down | KeyCode::Char('j') => Some(Input::Next),
            KeyCode::Up | KeyCode::Char('k') => Some(Input::Previous),
            _ => None,
        },
    }
}

/// The session's transition function. Mutates `state` and returns the
/// blocking work, if any, the caller has to perform next.
pub fn update(state: &mut AppState, input: Input) -> Option<Effect> {
    if input == Input::Quit {
        return Some(Effect::Quit);
    }

    match state.screen {
        Screen::Menu => match input {
            Input::SetUrl => {
                let url = state.config.origin_url.clone();
                state.load_input(&url);
                state.screen = Screen::UrlInput;
                None
            }
            Input::Browse => {
                let url = state.config.origin_url.trim().to_string();
                if url.is_empty() {
                    state.message = "Please set URL first".to_string();
                    None
                } else {
                    state.message = "Fetching events from calendar...".to_string();
                    Some(Effect::Fetch(url))
                }
            }
            Input::Save => Some(Effect::Save),
            _ => None,
        },

        Screen::UrlInput => {
            match input {
                Input::Confirm => {
                    state.config.origin_url = state.input_buffer.trim().to_string();
                    state.unsaved_changes = true;
                    state.message = "URL updated!".to_string();
                    state.reset_input();
                    state.screen = Screen::Menu;
                }
                Input::Cancel => {
                    state.reset_input();
                    state.screen = Screen::Menu;
                }
                other => edit_input(state, other),
            }
            None
        }

        Screen::EventBrowser => {
            match input {
                Input::Toggle => {
                    if let Some(title) = state.get_selected_event().map(|e| e.title.clone()) {
                        state.selected_idx = state.list_state.selected();
                        let blocked = state.config.toggle_blocked(&title);
                        state.unsaved_changes = true;
                        state.message = if blocked {
                            format!("Blocked: {}", title)
                        } else {
                            format!("Unblocked: {}", title)
                        };
                    }
                }
                Input::EditNotes => {
                    if let Some(title) = state.get_selected_event().map(|e| e.title.clone()) {
                        state.selected_idx = state.list_state.selected();
                        let existing = state.config.note(&title).unwrap_or_default().to_string();
                        state.load_input(&existing);
                        state.screen = Screen::NoteInput;
                    }
                }
                Input::Back => state.screen = Screen::Menu,
                Input::Next => state.next(),
                Input::Previous => state.previous(),
                _ => {}
            }
            None
        }

        Screen::NoteInput => {
            match input {
                Input::Confirm => {
                    let title = state
                        .selected_idx
                        .and_then(|i| state.events.get(i))
                        .map(|e| e.title.clone());
                    if let Some(title) = title {
                        let text = state.input_buffer.clone();
                        state.config.set_note(&title, &text);
                        state.unsaved_changes = true;
                        state.message = if text.is_empty() {
                            format!("Note removed: {}", title)
                        } else {
                            format!("Note saved: {}", title)
                        };
                    }
                    state.reset_input();
                    state.screen = Screen::EventBrowser;
                }
                Input::Cancel => {
                    state.reset_input();
                    state.screen = Screen::EventBrowser;
                }
                other => edit_input(state, other),
            }
            None
        }
    }
}

fn edit_input(state: &mut AppState, input: Input) {
    match input {
        Input::Char(c) => state.enter_char(c),
        Input::Backspace => state.delete_char(),
        Input::CursorLeft => state.move_cursor_left(),
        Input::CursorRight => state.move_cursor_right(),
        _ => {}
    }
}

/// Completion of [`Effect::Fetch`]. Only success leaves the menu.
pub fn on_fetched(
    state: &mut AppState,
    result: Result<Vec<EventRecord>, Error>,
    now: DateTime<Local>,
) {
    match result {
        Ok(records) => {
            let cutoff = CutoffPolicy::StartOfToday.resolve(now);
            let entries: Vec<BrowserEntry> = upcoming(&records, cutoff, None)
                .iter()
                .filter_map(BrowserEntry::from_record)
                .collect();
            info!("Loaded {} unique upcoming events", entries.len());
            state.message = format!("Loaded {} unique upcoming events", entries.len());
            state.set_events(entries);
            state.screen = Screen::EventBrowser;
        }
        Err(e) => {
            warn!("Fetch failed: {}", e);
            state.message = format!("Error fetching events: {}", e);
        }
    }
}

/// Completion of [`Effect::Save`]. The config is never touched here.
pub fn on_saved(state: &mut AppState, result: Result<(), Error>) {
    match result {
        Ok(()) => {
            state.unsaved_changes = false;
            state.message = "Configuration saved!".to_string();
        }
        Err(e) => {
            warn!("Save failed: {}", e);
            state.message = format!("Error saving config: {}", e);
        }
    }
}

pub mod action;
pub mod handlers;
pub mod state;
pub mod view;

use crate::client::CalendarSource;
use crate::config::ConfigStore;
use crate::ics;

use action::Effect;
use handlers::{map_key, on_fetched, on_saved, update};
use state::AppState;
use view::draw;

use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{io, time::Duration};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Runs the interactive configuration session until the user quits.
pub async fn run<S: CalendarSource>(store: ConfigStore, source: S) -> Result<()> {
    // --- 1. CONFIG ---
    let (config, load_err) = store.load_or_default();
    let mut app_state = AppState::new(config);
    match load_err {
        Some(e) => {
            error!("Could not load {}: {}", store.path().display(), e);
            app_state.message = format!("Error loading config, starting empty: {}", e);
        }
        None => app_state.message = format!("Config: {}", store.path().display()),
    }

    // --- 2. TERMINAL SETUP ---
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        error!("PANIC: {}", info);
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // --- 3. UI LOOP ---
    let result = event_loop(&mut terminal, &mut app_state, &store, &source).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if app_state.unsaved_changes {
        info!("Session ended with unsaved changes");
    }
    result
}

async fn event_loop<S: CalendarSource>(
    terminal: &mut Term,
    app_state: &mut AppState,
    store: &ConfigStore,
    source: &S,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app_state))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let Some(input) = map_key(app_state.screen, key) else {
            continue;
        };

        match update(app_state, input) {
            None => {}
            Some(Effect::Quit) => return Ok(()),
            Some(Effect::Fetch(url)) => {
                // Show the pending message while the request blocks the loop.
                terminal.draw(|f| draw(f, app_state))?;
                let fetched = source
                    .fetch(&url)
                    .await
                    .map(|calendar| ics::events(&calendar));
                on_fetched(app_state, fetched, Local::now());
            }
            Some(Effect::Save) => {
                let saved = store.save(&app_state.config);
                if saved.is_ok() {
                    info!("Configuration saved to {}", store.path().display());
                }
                on_saved(app_state, saved);
            }
        }
    }
}

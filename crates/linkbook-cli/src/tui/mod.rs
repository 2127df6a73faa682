//! linkbook TUI
//!
//! Single-screen terminal interface.
//!
//! ## Layout
//!
//! - Top: name and URL input fields with a save button
//! - Middle: links sorted by name, each with its URL (or an
//!   "Invalid URL:" label)
//! - Bottom: status line
//!
//! An undo button appears next to save while a deletion can be undone.
//!
//! ## Keys
//!
//! - Tab / Shift-Tab: move between fields and list
//! - Enter (in a field): save the link
//! - j/k or ↑/↓: move selection
//! - Enter (in list): open link in browser
//! - d: delete link
//! - u: undo last delete
//! - q / Ctrl-C: quit

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkbook_core::{Config, KeyValueSlot, LinkListController};

use app::{App, Focus};

/// Run the TUI application
pub fn run(config: &Config) -> Result<()> {
    // File-based logging, only if LINKBOOK_LOG is set
    init_tui_logging(config);

    let mut links = LinkListController::open(config)?;

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::on_startup(&mut links);
    let result = run_app(&mut terminal, &mut app, &mut links);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_app<B: Backend, S: KeyValueSlot>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    links: &mut LinkListController<S>,
) -> Result<()> {
    loop {
        app.check_status_timeout();

        // Every mutation is followed by a full redraw from `app`
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    handle_key(app, links, key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Dispatch one key press
fn handle_key<S: KeyValueSlot>(app: &mut App, links: &mut LinkListController<S>, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // If help is showing, any key dismisses it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Tab => app.next_focus(),
        KeyCode::BackTab => app.prev_focus(),
        _ if app.focus.is_input() => handle_input_key(app, links, key.code),
        _ => handle_list_key(app, links, key.code),
    }
}

/// Keys while the name or URL field has focus
fn handle_input_key<S: KeyValueSlot>(
    app: &mut App,
    links: &mut LinkListController<S>,
    code: KeyCode,
) {
    match code {
        KeyCode::Enter => app.on_save_pressed(links),
        KeyCode::Esc => app.focus = Focus::List,
        code => {
            let Some(input) = app.active_input() else {
                return;
            };
            match code {
                KeyCode::Char(c) => input.insert(c),
                KeyCode::Backspace => input.backspace(),
                KeyCode::Left => input.left(),
                KeyCode::Right => input.right(),
                _ => {}
            }
        }
    }
}

/// Keys while the list has focus
fn handle_list_key<S: KeyValueSlot>(
    app: &mut App,
    links: &mut LinkListController<S>,
    code: KeyCode,
) {
    // Clear status message on navigation keys
    if matches!(
        code,
        KeyCode::Char('j' | 'k' | 'g' | 'G') | KeyCode::Up | KeyCode::Down
    ) {
        app.status_message = None;
    }

    match code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('g') | KeyCode::Home => app.move_to_first(),
        KeyCode::Char('G') | KeyCode::End => app.move_to_last(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(links),
        KeyCode::Char('u') => app.on_undo_pressed(links),
        KeyCode::Char('a') | KeyCode::Char('i') | KeyCode::Esc => app.focus = Focus::Name,
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
}

/// Initialize logging for TUI mode
///
/// Only initializes if LINKBOOK_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var("LINKBOOK_LOG") else {
        return;
    };

    let log_path = config.log_path();
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "linkbook_core={},linkbook_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}

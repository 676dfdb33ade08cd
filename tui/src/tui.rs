//! TUI runner: ratatui event loop with terminal setup and cleanup.
//!
//! [`Tui`] owns the terminal, the form state machine ([`App`]) and the
//! [`FilterStore`]. Each loop draws a frame, waits for a key, and applies the
//! resulting action to the store. A store subscription feeds the status line.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;
use ratatui::Terminal;
use tracing::{info, warn};

use filter_draft_core::command::FilterCommand;
use filter_draft_core::config::FormConfig;
use filter_draft_core::FilterStore;

use crate::app::{App, AppAction, Key};
use crate::feed::{Closing, StateFeed};
use crate::form::FilterForm;
use crate::view::{self, ViewModel};


pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    app: App,
    store: FilterStore,
    feed: Rc<RefCell<StateFeed>>,
    poll_interval: Duration,
}


impl Tui {
    /// Enter raw mode and the alternate screen, and build the form from
    /// `config` around `store`.
    pub fn new(config: &FormConfig, mut store: FilterStore) -> Result<Self, io::Error> {
        let feed = Rc::new(RefCell::new(StateFeed::new(store.state())));
        let sink = Rc::clone(&feed);
        store.subscribe(move |state| sink.borrow_mut().observe(state));

        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            app: App::new(FilterForm::from_config(config)),
            store,
            feed,
            poll_interval: Duration::from_millis(250),
        })
    }

    /// Run until quit is requested. Returns the store so the caller can
    /// report the final state.
    pub fn run(mut self) -> Result<FilterStore, io::Error> {
        loop {
            let diff = self.store.pending_diff();
            let transitions = self.feed.borrow().transitions();
            let model = ViewModel {
                app: &self.app,
                state: self.store.state(),
                diff: &diff,
                transitions,
                today: chrono::Local::now().date_naive(),
            };
            self.terminal.draw(|frame| view::render(frame, &model))?;

            if !event::poll(self.poll_interval)? {
                continue;
            }
            let Event::Key(key_event) = event::read()? else {
                continue;
            };
            if key_event.kind != KeyEventKind::Press {
                continue;
            }
            if key_event.code == KeyCode::Char('c')
                && key_event.modifiers.contains(KeyModifiers::CONTROL)
            {
                break;
            }

            let key = crossterm_to_key(key_event.code, key_event.modifiers);
            if let Some(action) = self.app.handle_key(key, self.store.state()) {
                if self.handle_action(action) {
                    break;
                }
            }
        }

        self.shutdown()?;
        Ok(std::mem::take(&mut self.store))
    }

    // -------------------------------------------------------------------
    // Action handling
    // -------------------------------------------------------------------

    /// Apply an action to the store. Returns `true` to quit.
    fn handle_action(&mut self, action: AppAction) -> bool {
        match action {
            AppAction::Quit => return true,
            AppAction::Update { path, value } => {
                if let Err(e) = self.store.update_filter_at(&path, value) {
                    self.app.set_status(format!("Edit rejected: {}", e));
                }
            }
            AppAction::Save => {
                info!(changes = self.store.pending_diff().change_count(), "saving filters");
                self.feed.borrow_mut().expect(Closing::Save);
                self.store.save_filters();
            }
            AppAction::Clear => {
                self.feed.borrow_mut().expect(Closing::Discard);
                self.store.clear_draft();
            }
            AppAction::Command(text) => match FilterCommand::parse(&text) {
                Ok(cmd) => {
                    if let Some(closing) = closing_for(&cmd) {
                        self.feed.borrow_mut().expect(closing);
                    }
                    if let Err(e) = cmd.apply(&mut self.store) {
                        warn!(command = %text, error = %e, "command failed");
                        self.app.set_status(format!("Error: {}", e));
                    }
                }
                Err(e) => self.app.set_status(format!("Error: {}", e)),
            },
        }

        if let Some(event) = self.feed.borrow_mut().take_event() {
            self.app.set_status(event);
        }
        self.app.sync(self.store.state());
        false
    }

    /// Restore the terminal to its normal state.
    fn shutdown(&mut self) -> Result<(), io::Error> {
        terminal::disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}


impl Drop for Tui {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
    }
}


/// The draft ending a command performs, if any.
fn closing_for(cmd: &FilterCommand) -> Option<Closing> {
    match cmd {
        FilterCommand::Save => Some(Closing::Save),
        FilterCommand::Clear => Some(Closing::Discard),
        FilterCommand::Update { .. } => None,
    }
}


// ---------------------------------------------------------------------------
// Key conversion
// ---------------------------------------------------------------------------

/// Convert a crossterm `KeyCode` + `KeyModifiers` into our `Key` type.
pub fn crossterm_to_key(code: KeyCode, modifiers: KeyModifiers) -> Key {
    if modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(ch) = code {
            return Key::Ctrl(ch);
        }
    }
    match code {
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => Key::Char('\0'), // unmapped keys produce a null char
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

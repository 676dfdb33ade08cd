//! Form state machine.
//!
//! Tracks focus, the active editing mode and the transient status line, and
//! turns key presses into [`AppAction`]s. It never touches the filter store:
//! the runner applies the actions, so every edit goes through the store's
//! `update_filter` / `save_filters` / `clear_draft`.

use serde_json::Value;

use filter_draft_core::draft::{AppState, FieldPath};

use crate::form::{FieldKind, FilterForm, FormField};
use crate::input::InputLine;


// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Moving between fields and operating choice widgets.
    Browse,
    /// Typing into the focused text field.
    EditText,
    /// Typing a text command on the bottom line.
    Command,
    Help,
    /// Quit was requested while a draft is pending.
    ConfirmQuit,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Browse => "browse",
            Mode::EditText => "edit",
            Mode::Command => "command",
            Mode::Help => "help",
            Mode::ConfirmQuit => "confirm",
        }
    }
}


// ---------------------------------------------------------------------------
// AppAction
// ---------------------------------------------------------------------------

/// What the runner should do with the store.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    Update { path: FieldPath, value: Value },
    Save,
    Clear,
    /// A text command typed on the command line.
    Command(String),
    Quit,
}


// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    BackTab,
    Escape,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Ctrl(char),
}


// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub mode: Mode,
    pub form: FilterForm,
    /// Index into `form.fields()` of the focused field.
    pub focus: usize,
    /// Highlighted option per multi-select field.
    option_cursor: Vec<usize>,
    /// Editor for the focused text field.
    pub editor: InputLine,
    pub command: InputLine,
    status: Option<String>,
}


impl App {
    pub fn new(form: FilterForm) -> Self {
        let fields = form.len();
        App {
            mode: Mode::Browse,
            form,
            focus: 0,
            option_cursor: vec![0; fields],
            editor: InputLine::new(),
            command: InputLine::new(),
            status: None,
        }
    }

    pub fn focused_field(&self) -> Option<&FormField> {
        self.form.field(self.focus)
    }

    pub fn option_cursor(&self, field: usize) -> usize {
        self.option_cursor.get(field).copied().unwrap_or(0)
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Keep focus on a shown field after the filters changed underneath.
    pub fn sync(&mut self, state: &AppState) {
        let settled = self.form.settle(state.effective_filters(), self.focus);
        if settled != self.focus && self.mode == Mode::EditText {
            self.mode = Mode::Browse;
        }
        self.focus = settled;
    }

    // -------------------------------------------------------------------
    // Input processing
    // -------------------------------------------------------------------

    /// Process a key against the current state and return an optional action.
    pub fn handle_key(&mut self, key: Key, state: &AppState) -> Option<AppAction> {
        match self.mode {
            Mode::Browse => self.handle_browse_key(key, state),
            Mode::EditText => self.handle_edit_key(key),
            Mode::Command => self.handle_command_key(key),
            Mode::Help => {
                self.mode = Mode::Browse;
                None
            }
            Mode::ConfirmQuit => self.handle_confirm_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: Key, state: &AppState) -> Option<AppAction> {
        let filters = state.effective_filters();
        match key {
            Key::Char('q') => {
                if state.has_draft() {
                    self.mode = Mode::ConfirmQuit;
                    None
                } else {
                    Some(AppAction::Quit)
                }
            }
            Key::Char('?') => {
                self.mode = Mode::Help;
                None
            }
            Key::Char(':') => {
                self.command.clear();
                self.mode = Mode::Command;
                None
            }
            Key::Char('s') => Some(AppAction::Save),
            Key::Char('x') => Some(AppAction::Clear),
            Key::Char('j') | Key::Down | Key::Tab => {
                self.focus = self.form.step(filters, self.focus, true);
                None
            }
            Key::Char('k') | Key::Up | Key::BackTab => {
                self.focus = self.form.step(filters, self.focus, false);
                None
            }
            Key::Char('h') | Key::Left => self.nudge(filters, false),
            Key::Char('l') | Key::Right => self.nudge(filters, true),
            Key::Char(' ') => self.activate(filters, false),
            Key::Enter => self.activate(filters, true),
            Key::Escape => {
                self.clear_status();
                None
            }
            _ => None,
        }
    }

    /// Left/Right: cycle a choice, or move a multi-select's option cursor.
    fn nudge(&mut self, filters: &Value, forward: bool) -> Option<AppAction> {
        let field = self.form.field(self.focus)?;
        if field.is_multi() {
            let last = field.options().len().saturating_sub(1);
            let cursor = &mut self.option_cursor[self.focus];
            *cursor = if forward {
                (*cursor + 1).min(last)
            } else {
                cursor.saturating_sub(1)
            };
            return None;
        }
        let value = field.cycle(filters, forward)?;
        Some(self.update(value))
    }

    /// Space/Enter: toggle, cycle, or (Enter only) start editing text.
    fn activate(&mut self, filters: &Value, enter: bool) -> Option<AppAction> {
        let field = self.form.field(self.focus)?;
        let value = match &field.kind {
            FieldKind::Text { .. } => {
                if enter {
                    let text = field.text_value(filters);
                    self.editor.set_text(&text);
                    self.mode = Mode::EditText;
                }
                return None;
            }
            FieldKind::Select { multiple: true, .. } => {
                field.toggle(filters, self.option_cursor(self.focus))?
            }
            FieldKind::Radio { .. } | FieldKind::Select { .. } => field.cycle(filters, true)?,
        };
        Some(self.update(value))
    }

    /// Every keystroke that changes the text is an edit.
    fn handle_edit_key(&mut self, key: Key) -> Option<AppAction> {
        let changed = match key {
            Key::Enter | Key::Escape => {
                self.mode = Mode::Browse;
                false
            }
            Key::Char(ch) => {
                self.editor.insert(ch);
                true
            }
            Key::Backspace => self.editor.delete_back(),
            Key::Delete => self.editor.delete_forward(),
            Key::Left => {
                self.editor.move_left();
                false
            }
            Key::Right => {
                self.editor.move_right();
                false
            }
            Key::Home | Key::Ctrl('a') => {
                self.editor.move_home();
                false
            }
            Key::End | Key::Ctrl('e') => {
                self.editor.move_end();
                false
            }
            Key::Ctrl('u') => {
                let had_text = !self.editor.is_empty();
                self.editor.clear();
                had_text
            }
            _ => false,
        };
        if changed {
            let value = Value::String(self.editor.text());
            Some(self.update(value))
        } else {
            None
        }
    }

    fn handle_command_key(&mut self, key: Key) -> Option<AppAction> {
        match key {
            Key::Escape => {
                self.command.clear();
                self.mode = Mode::Browse;
                None
            }
            Key::Enter => {
                self.mode = Mode::Browse;
                let text = self.command.submit();
                if text.trim().is_empty() {
                    None
                } else {
                    Some(AppAction::Command(text))
                }
            }
            Key::Backspace => {
                self.command.delete_back();
                None
            }
            Key::Delete => {
                self.command.delete_forward();
                None
            }
            Key::Left => {
                self.command.move_left();
                None
            }
            Key::Right => {
                self.command.move_right();
                None
            }
            Key::Home | Key::Ctrl('a') => {
                self.command.move_home();
                None
            }
            Key::End | Key::Ctrl('e') => {
                self.command.move_end();
                None
            }
            Key::Up => {
                self.command.history_up();
                None
            }
            Key::Down => {
                self.command.history_down();
                None
            }
            Key::Ctrl('u') => {
                self.command.clear();
                None
            }
            Key::Char(ch) => {
                self.command.insert(ch);
                None
            }
            _ => None,
        }
    }

    fn handle_confirm_key(&mut self, key: Key) -> Option<AppAction> {
        match key {
            Key::Char('y') | Key::Char('Y') | Key::Enter => Some(AppAction::Quit),
            Key::Char('n') | Key::Char('N') | Key::Escape => {
                self.mode = Mode::Browse;
                None
            }
            _ => None,
        }
    }

    fn update(&self, value: Value) -> AppAction {
        let path = self
            .form
            .field(self.focus)
            .map(|f| f.path.clone())
            .unwrap_or_default();
        AppAction::Update { path, value }
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use filter_draft_core::config::{ChoiceOption, FormConfig};
    use filter_draft_core::FilterStore;
    use serde_json::json;

    fn setup() -> (App, FilterStore) {
        let mut config = FormConfig::default();
        config.locations = vec![
            ChoiceOption::new("loc-1", "North Hall"),
            ChoiceOption::new("loc-2", "Depot"),
        ];
        (App::new(FilterForm::from_config(&config)), FilterStore::default())
    }

    /// Feed keys, applying resulting actions the way the runner does.
    fn drive(app: &mut App, store: &mut FilterStore, keys: &[Key]) -> Vec<AppAction> {
        let mut actions = Vec::new();
        for key in keys {
            if let Some(action) = app.handle_key(*key, store.state()) {
                match &action {
                    AppAction::Update { path, value } => {
                        store.update_filter_at(path, value.clone()).unwrap()
                    }
                    AppAction::Save => store.save_filters(),
                    AppAction::Clear => store.clear_draft(),
                    AppAction::Command(_) | AppAction::Quit => {}
                }
                app.sync(store.state());
                actions.push(action);
            }
        }
        actions
    }

    fn focus_on(app: &mut App, store: &FilterStore, path: &str) {
        let index = app
            .form
            .fields()
            .iter()
            .position(|f| f.path.to_dotted() == path)
            .unwrap();
        app.focus = index;
        app.sync(store.state());
    }

    #[test]
    fn typing_a_name_updates_draft_per_keystroke() {
        let (mut app, mut store) = setup();
        let actions = drive(
            &mut app,
            &mut store,
            &[Key::Enter, Key::Char('G'), Key::Char('o'), Key::Backspace, Key::Char('i')],
        );
        assert_eq!(app.mode, Mode::EditText);
        assert_eq!(actions.len(), 4);
        assert_eq!(store.read_filter("name"), Some(&json!("Gi")));
        assert_eq!(store.state().current_filters["name"], json!(""));

        drive(&mut app, &mut store, &[Key::Enter]);
        assert_eq!(app.mode, Mode::Browse);
    }

    #[test]
    fn cursor_moves_do_not_edit() {
        let (mut app, mut store) = setup();
        let actions = drive(&mut app, &mut store, &[Key::Enter, Key::Left, Key::Home, Key::Backspace]);
        assert!(actions.is_empty());
        assert!(!store.state().has_draft());
    }

    #[test]
    fn radio_and_save() {
        let (mut app, mut store) = setup();
        focus_on(&mut app, &store, "income.exclude");
        drive(&mut app, &mut store, &[Key::Right]);
        assert_eq!(store.read_filter("income.exclude"), Some(&json!("no")));
        drive(&mut app, &mut store, &[Key::Char('s')]);
        assert!(!store.state().has_draft());
        assert_eq!(store.state().current_filters["income"]["exclude"], json!("no"));
    }

    #[test]
    fn multi_select_cursor_and_toggle() {
        let (mut app, mut store) = setup();
        focus_on(&mut app, &store, "allocation.location");
        drive(&mut app, &mut store, &[Key::Right, Key::Char(' ')]);
        assert_eq!(store.read_filter("allocation.location"), Some(&json!(["loc-2"])));
        drive(&mut app, &mut store, &[Key::Left, Key::Enter]);
        assert_eq!(
            store.read_filter("allocation.location"),
            Some(&json!(["loc-1", "loc-2"]))
        );
        // cursor clamps at the last option
        drive(&mut app, &mut store, &[Key::Right, Key::Right, Key::Right]);
        assert_eq!(app.option_cursor(app.focus), 1);
    }

    #[test]
    fn custom_preset_reveals_date_fields() {
        let (mut app, mut store) = setup();
        focus_on(&mut app, &store, "dateRange.preset");
        drive(&mut app, &mut store, &[Key::Right]);
        assert_eq!(store.read_filter("dateRange.preset"), Some(&json!("x")));

        drive(&mut app, &mut store, &[Key::Down]);
        assert_eq!(app.focused_field().unwrap().path.to_dotted(), "dateRange.start");
        drive(&mut app, &mut store, &[Key::Enter, Key::Char('2')]);
        assert_eq!(store.read_filter("dateRange.start"), Some(&json!("2")));
    }

    #[test]
    fn discard_moves_focus_off_hidden_field() {
        let (mut app, mut store) = setup();
        focus_on(&mut app, &store, "dateRange.preset");
        drive(&mut app, &mut store, &[Key::Right, Key::Down]);
        assert_eq!(app.focused_field().unwrap().path.to_dotted(), "dateRange.start");
        drive(&mut app, &mut store, &[Key::Char('x')]);
        assert!(!store.state().has_draft());
        assert_eq!(app.focused_field().unwrap().path.to_dotted(), "dateRange.preset");
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let (mut app, mut store) = setup();
        drive(&mut app, &mut store, &[Key::Up, Key::Char('k')]);
        assert_eq!(app.focus, 0);
        drive(&mut app, &mut store, &[Key::Down; 20]);
        assert_eq!(app.focused_field().unwrap().path.to_dotted(), "allocation.location");
    }

    #[test]
    fn quit_without_draft_is_immediate() {
        let (mut app, store) = setup();
        assert_eq!(app.handle_key(Key::Char('q'), store.state()), Some(AppAction::Quit));
    }

    #[test]
    fn quit_with_draft_asks_first() {
        let (mut app, mut store) = setup();
        store.update_filter("name", json!("pending")).unwrap();
        assert_eq!(app.handle_key(Key::Char('q'), store.state()), None);
        assert_eq!(app.mode, Mode::ConfirmQuit);
        assert_eq!(app.handle_key(Key::Char('n'), store.state()), None);
        assert_eq!(app.mode, Mode::Browse);
        app.handle_key(Key::Char('q'), store.state());
        assert_eq!(app.handle_key(Key::Char('y'), store.state()), Some(AppAction::Quit));
    }

    #[test]
    fn command_line_submits_text() {
        let (mut app, store) = setup();
        app.handle_key(Key::Char(':'), store.state());
        assert_eq!(app.mode, Mode::Command);
        for ch in "save".chars() {
            app.handle_key(Key::Char(ch), store.state());
        }
        assert_eq!(
            app.handle_key(Key::Enter, store.state()),
            Some(AppAction::Command("save".into()))
        );
        assert_eq!(app.mode, Mode::Browse);

        app.handle_key(Key::Char(':'), store.state());
        assert_eq!(app.handle_key(Key::Enter, store.state()), None);
    }

    #[test]
    fn command_keys_do_not_trigger_shortcuts() {
        let (mut app, store) = setup();
        app.handle_key(Key::Char(':'), store.state());
        assert_eq!(app.handle_key(Key::Char('q'), store.state()), None);
        assert_eq!(app.handle_key(Key::Char('s'), store.state()), None);
        assert_eq!(app.command.text(), "qs");
        app.handle_key(Key::Escape, store.state());
        assert!(app.command.is_empty());
    }

    #[test]
    fn help_closes_on_any_key() {
        let (mut app, store) = setup();
        app.handle_key(Key::Char('?'), store.state());
        assert_eq!(app.mode, Mode::Help);
        assert_eq!(app.handle_key(Key::Char('s'), store.state()), None);
        assert_eq!(app.mode, Mode::Browse);
    }
}

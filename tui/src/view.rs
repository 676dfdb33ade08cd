//! Form view: renders the filter form, the applied filters and the status
//! bar into a ratatui `Frame`.

use chrono::NaiveDate;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use serde_json::Value;

use filter_draft_core::draft::{read, AppState, DraftDiff, DraftPhase, FieldPath};
use filter_draft_core::types::criteria::DateRange;

use crate::app::{App, Mode};
use crate::form::{FieldKind, FormField};


/// Everything a frame needs, borrowed from the runner.
pub struct ViewModel<'a> {
    pub app: &'a App,
    pub state: &'a AppState,
    pub diff: &'a DraftDiff,
    pub transitions: u64,
    pub today: NaiveDate,
}


/// Render the full screen: title, form | applied filters, status line.
pub fn render(frame: &mut Frame, view: &ViewModel) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Min(5),    // body
            Constraint::Length(1), // status / command line
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    render_title(frame, rows[0], view);
    render_form(frame, body[0], view);
    render_applied(frame, body[1], view.state);
    render_bottom_line(frame, rows[2], view);

    match view.app.mode {
        Mode::Help => render_popup(frame, rows[1], "Help", HELP_TEXT, Color::Cyan),
        Mode::ConfirmQuit => render_popup(
            frame,
            rows[1],
            "Unsaved draft",
            "\n  Quit and lose the pending draft?\n\n  [y] Quit   [n] Stay\n",
            Color::Yellow,
        ),
        _ => {}
    }
}

const HELP_TEXT: &str = concat!(
    "Filter editor help\n",
    "\n",
    "  j/k, Up/Down   Move between fields\n",
    "  h/l, Left/Right Change choice / move option cursor\n",
    "  Space          Toggle option\n",
    "  Enter          Edit text field / toggle\n",
    "  s              Save draft (apply filters)\n",
    "  x              Discard draft\n",
    "  :              Command (set <path> <value>, save, clear)\n",
    "  q              Quit\n",
    "  Ctrl-C         Force quit\n",
);

fn render_title(frame: &mut Frame, area: Rect, view: &ViewModel) {
    let phase = match view.state.phase() {
        DraftPhase::NoDraft => Span::styled(" applied ", Style::default().fg(Color::Green)),
        DraftPhase::HasDraft => Span::styled(" draft ", Style::default().fg(Color::Yellow).bold()),
    };
    let title = Line::from(vec![
        Span::raw(" Filters "),
        phase,
        Span::raw(format!(" rev {}", view.transitions)),
    ]);
    frame.render_widget(
        Paragraph::new(title).style(Style::default().bg(Color::DarkGray)),
        area,
    );
}

fn render_form(frame: &mut Frame, area: Rect, view: &ViewModel) {
    let filters = view.state.effective_filters();
    let app = view.app;
    let mut lines: Vec<Line> = Vec::new();

    for index in app.form.visible(filters) {
        let Some(field) = app.form.field(index) else {
            continue;
        };
        let focused = index == app.focus;
        let changed = view.diff.touches(&field.path.to_dotted());

        let marker = if focused { "> " } else { "  " };
        let dirty = if changed { "*" } else { " " };
        let label_style = if focused {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default()
        };

        let value = if focused && app.mode == Mode::EditText {
            format!("{}_", app.editor.text())
        } else {
            field.display(filters)
        };

        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(dirty, Style::default().fg(Color::Yellow)),
            Span::styled(format!("{}: ", field.label), label_style),
            Span::raw(value),
        ]));

        if focused {
            lines.extend(option_lines(field, filters, app.option_cursor(index)));
            if let Some(help) = &field.help {
                lines.push(Line::styled(format!("      {}", help), Style::default().fg(Color::DarkGray)));
            }
        }
        if field.path.to_dotted() == "dateRange.preset" {
            if let Some(window) = date_window_text(filters, view.today) {
                lines.push(Line::styled(format!("      {}", window), Style::default().fg(Color::DarkGray)));
            }
        }
    }

    let block = Block::default().borders(Borders::ALL).title("Criteria");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Option list under a focused multi-select.
fn option_lines(field: &FormField, filters: &Value, cursor: usize) -> Vec<Line<'static>> {
    if !matches!(field.kind, FieldKind::Select { multiple: true, .. }) {
        return Vec::new();
    }
    if field.options().is_empty() {
        return vec![Line::styled("      (no options configured)", Style::default().fg(Color::DarkGray))];
    }
    let selected = field.selected(filters);
    field
        .options()
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let check = if selected.contains(&option.value) { "[x]" } else { "[ ]" };
            let style = if i == cursor {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::styled(format!("      {} {}", check, option.label), style)
        })
        .collect()
}

/// Resolved window of the date-range descriptor, when it has one.
pub fn date_window_text(filters: &Value, today: NaiveDate) -> Option<String> {
    let raw = read(filters, &FieldPath::parse("dateRange"))?;
    let range: DateRange = serde_json::from_value(raw.clone()).ok()?;
    let window = range.window(today)?;
    Some(format!("{} .. {}", window.start, window.end))
}

fn render_applied(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = serde_json::to_string_pretty(&state.current_filters)
        .unwrap_or_else(|e| format!("<unprintable: {}>", e));
    let block = Block::default().borders(Borders::ALL).title("Applied");
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_bottom_line(frame: &mut Frame, area: Rect, view: &ViewModel) {
    let app = view.app;
    if app.mode == Mode::Command {
        let text = format!(":{}", app.command.text());
        frame.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Cyan)), area);
        let cursor_x = area.x + 1 + app.command.cursor_pos() as u16;
        frame.set_cursor_position((cursor_x, area.y));
        return;
    }

    let summary = if view.state.has_draft() {
        format!("draft: {}", view.diff.summary())
    } else {
        "no pending edits".to_string()
    };
    let text = match app.status() {
        Some(status) => format!(" {} | {} | {}", app.mode.label(), summary, status),
        None => format!(" {} | {} | s save  x discard  ? help", app.mode.label(), summary),
    };
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn render_popup(frame: &mut Frame, area: Rect, title: &str, body: &str, color: Color) {
    let width = area.width.min(60);
    let height = area.height.min(14);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title.to_string());
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(body.to_string()).block(block).wrap(Wrap { trim: false }),
        popup,
    );
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

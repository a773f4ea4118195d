//! Menu screen: capture and sign-out actions plus the coordinate table.
//!
//! The table is fed solely by subscription deliveries; a capture never
//! mutates it directly. The store redelivers the full set after the append
//! lands, so the new row shows up through the same path as everyone else's.

use crossterm::event::{KeyCode, KeyEvent};
use gpslog_core::services::{Coordinate, CoordinateRecord, ServiceError, ServiceResult, notices};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Row, Table};

use crate::effects::UiEffect;
use crate::features::notice;
use crate::state::AppState;

/// Selectable menu actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuItem {
    #[default]
    Capture,
    SignOut,
}

/// What a key press on the menu asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    None,
    /// Run the capture flow (permission gate first).
    Capture,
    /// Sign out and return to the login screen.
    SignOut,
}

/// Menu screen state.
#[derive(Debug, Default)]
pub struct MenuState {
    pub selected: MenuItem,
    /// Replacement list from the latest subscription delivery.
    pub records: Vec<CoordinateRecord>,
}

/// Handles a key press on the menu screen.
pub fn handle_key(menu: &mut MenuState, key: KeyEvent) -> MenuAction {
    match key.code {
        KeyCode::Tab | KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
            menu.selected = match menu.selected {
                MenuItem::Capture => MenuItem::SignOut,
                MenuItem::SignOut => MenuItem::Capture,
            };
            MenuAction::None
        }
        KeyCode::Enter => match menu.selected {
            MenuItem::Capture => MenuAction::Capture,
            MenuItem::SignOut => MenuAction::SignOut,
        },
        _ => MenuAction::None,
    }
}

/// Handles the result of the one-shot location fetch.
///
/// A cached position becomes a timestamped record and an append effect; an
/// empty cache and a failed fetch both collapse to the same notice, with the
/// structured error going to the log.
pub fn handle_location_result(
    state: &mut AppState,
    result: ServiceResult<Option<Coordinate>>,
) -> Vec<UiEffect> {
    match result {
        Ok(Some(position)) => vec![UiEffect::AppendRecord {
            record: CoordinateRecord::captured_now(position),
        }],
        Ok(None) => {
            notice::show(state, notices::NO_LOCATION);
            vec![]
        }
        Err(err) => {
            tracing::warn!(error = %err, "location fetch failed");
            notice::show(state, notices::NO_LOCATION);
            vec![]
        }
    }
}

/// Handles the result of the store append.
pub fn handle_append_result(state: &mut AppState, result: ServiceResult<String>) -> Vec<UiEffect> {
    match result {
        Ok(key) => {
            tracing::debug!(%key, "capture stored");
            notice::show(state, notices::SAVED);
        }
        Err(err) => {
            tracing::warn!(error = %err, "store append failed");
            notice::show(state, notices::SAVE_FAILED);
        }
    }
    vec![]
}

/// Handles a subscription failure. The original UI swallowed these; we keep
/// the screen quiet but record the error.
pub fn handle_subscription_failure(err: &ServiceError) {
    tracing::warn!(error = %err, "live subscription failed");
}

/// Renders the menu screen.
pub fn render(menu: &MenuState, frame: &mut Frame, area: Rect) {
    let [actions_area, _, table_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(actions_line(menu.selected)), actions_area);
    frame.render_widget(records_table(&menu.records), table_area);
}

fn actions_line(selected: MenuItem) -> Line<'static> {
    let entry = |label: &str, active: bool| {
        let style = if active {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        Span::styled(format!(" {label} "), style)
    };
    Line::from(vec![
        entry("Capture coordinates", selected == MenuItem::Capture),
        Span::raw("  "),
        entry("Sign out", selected == MenuItem::SignOut),
    ])
}

fn records_table(records: &[CoordinateRecord]) -> Table<'static> {
    let header = Row::new(["Latitude", "Longitude", "Captured"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row<'static>> = records
        .iter()
        .map(|record| {
            Row::new([
                record.latitude.to_string(),
                record.longitude.to_string(),
                record.formatted_local_time(),
            ])
        })
        .collect();

    Table::new(
        rows,
        [
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ],
    )
    .header(header)
}

//! Location permission gate.
//!
//! There is no OS permission broker in a terminal session, so the single
//! runtime permission is a session-scoped grant asked through a modal
//! prompt. Granted is sticky for the session; denied is not, the next
//! capture attempt asks again. Denial never reaches the location fetcher.

use crossterm::event::{KeyCode, KeyEvent};
use gpslog_core::services::notices;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};

use crate::effects::UiEffect;
use crate::features::notice;
use crate::state::{AppState, Overlay};

/// Session-scoped permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// Not asked yet, or previously denied.
    #[default]
    Unknown,
    /// Granted for the rest of the session.
    Granted,
}

/// Runs the gate for a capture request: proceed immediately when granted,
/// otherwise open the prompt and wait for the user.
pub fn ensure_granted(state: &mut AppState) -> Vec<UiEffect> {
    match state.permission {
        PermissionState::Granted => vec![UiEffect::FetchLocation],
        PermissionState::Unknown => {
            state.overlay = Some(Overlay::PermissionPrompt);
            vec![]
        }
    }
}

/// Handles a key press while the prompt is open.
pub fn handle_prompt_key(state: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
            state.overlay = None;
            state.permission = PermissionState::Granted;
            vec![UiEffect::FetchLocation]
        }
        KeyCode::Char('n' | 'N') | KeyCode::Esc => {
            state.overlay = None;
            notice::show(state, notices::PERMISSION_DENIED);
            vec![]
        }
        _ => vec![],
    }
}

/// Renders the permission prompt over the current screen.
pub fn render_prompt(frame: &mut Frame, area: Rect) {
    let width = area.width.min(54);
    let height = 5.min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    frame.render_widget(Clear, popup);
    let block = Block::bordered()
        .title(" Location permission ")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let lines = vec![
        Line::from("Allow gpslog to read the device's current location?"),
        Line::from(""),
        Line::from(Span::styled(
            "y = allow, n = deny",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

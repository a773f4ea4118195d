//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState` by immutable reference, draw to a ratatui
//! frame, and never mutate state or return effects.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::features::{login, menu, notice, permission};
use crate::state::{AppState, Overlay, Screen};

/// Height of the notice line at the bottom.
const NOTICE_HEIGHT: u16 = 1;

/// Renders the entire TUI to the frame.
pub fn render(state: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let [screen_area, notice_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(NOTICE_HEIGHT)]).areas(area);

    match &state.screen {
        Screen::Login(login) => login::render(login, frame, screen_area),
        Screen::Menu(menu) => menu::render(menu, frame, screen_area),
    }

    notice::render(state.notice.as_ref(), frame, notice_area);

    // Overlays draw last, over everything else.
    if let Some(Overlay::PermissionPrompt) = state.overlay {
        permission::render_prompt(frame, screen_area);
    }
}

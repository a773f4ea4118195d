//! Transient bottom-line notices.
//!
//! Every failure category collapses to one of the fixed strings in
//! `gpslog_core::services::notices`. A notice replaces the previous one and
//! expires on its own after a few seconds; there is nothing to acknowledge.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;

use crate::state::AppState;

/// How many ticks a notice stays visible (~4s at the 250ms tick).
pub const NOTICE_TICKS: u64 = 16;

/// A transient user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    expires_at: u64,
}

/// Shows a notice, replacing any current one.
pub fn show(state: &mut AppState, text: &str) {
    state.notice = Some(Notice {
        text: text.to_string(),
        expires_at: state.tick + NOTICE_TICKS,
    });
}

/// Clears the notice once its tick budget is spent.
pub fn expire(state: &mut AppState) {
    if state
        .notice
        .as_ref()
        .is_some_and(|notice| state.tick >= notice.expires_at)
    {
        state.notice = None;
    }
}

/// Renders the notice line.
pub fn render(notice: Option<&Notice>, frame: &mut Frame, area: Rect) {
    if let Some(notice) = notice {
        let para = Paragraph::new(notice.text.as_str()).style(Style::default().fg(Color::Yellow));
        frame.render_widget(para, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_expires_after_its_tick_budget() {
        let mut state = AppState::new();
        show(&mut state, "hello");
        assert!(state.notice.is_some());

        state.tick += NOTICE_TICKS - 1;
        expire(&mut state);
        assert!(state.notice.is_some());

        state.tick += 1;
        expire(&mut state);
        assert!(state.notice.is_none());
    }

    #[test]
    fn a_new_notice_replaces_the_old_one() {
        let mut state = AppState::new();
        show(&mut state, "first");
        show(&mut state, "second");
        assert_eq!(state.notice.unwrap().text, "second");
    }
}

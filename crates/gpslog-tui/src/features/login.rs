//! Login screen: two text fields and a submit action.
//!
//! Purely derived rendering; the sign-in result comes back as an event and
//! is handled in [`handle_sign_in_result`].

use crossterm::event::{KeyCode, KeyEvent};
use gpslog_core::services::{ServiceResult, Session, notices};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::effects::UiEffect;
use crate::features::notice;
use crate::state::{AppState, Screen};

/// A single-line editable text buffer with a character cursor.
#[derive(Debug, Clone, Default)]
pub struct FieldBuffer {
    text: String,
    cursor: usize,
}

impl FieldBuffer {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn insert(&mut self, c: char) {
        let idx = self.byte_index();
        self.text.insert(idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let idx = self.byte_index();
            self.text.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
    }

    /// Display width of the text before the cursor.
    pub fn cursor_width(&self) -> u16 {
        let idx = self.byte_index();
        self.text[..idx].width() as u16
    }

    fn byte_index(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map_or(self.text.len(), |(i, _)| i)
    }

    #[cfg(test)]
    pub fn with_text(text: &str) -> Self {
        Self {
            cursor: text.chars().count(),
            text: text.to_string(),
        }
    }
}

/// Which login field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

/// Login screen state.
#[derive(Debug, Default)]
pub struct LoginState {
    pub email: FieldBuffer,
    pub password: FieldBuffer,
    pub focus: LoginField,
    /// A sign-in task is in flight; further submissions are ignored.
    pub signing_in: bool,
}

impl LoginState {
    fn focused_mut(&mut self) -> &mut FieldBuffer {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }
}

/// Handles a key press on the login screen.
pub fn handle_key(login: &mut LoginState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
            login.focus = match login.focus {
                LoginField::Email => LoginField::Password,
                LoginField::Password => LoginField::Email,
            };
        }
        KeyCode::Enter => {
            if !login.signing_in {
                login.signing_in = true;
                return vec![UiEffect::SignIn {
                    email: login.email.as_str().to_string(),
                    password: login.password.as_str().to_string(),
                }];
            }
        }
        KeyCode::Backspace => login.focused_mut().backspace(),
        KeyCode::Left => login.focused_mut().move_left(),
        KeyCode::Right => login.focused_mut().move_right(),
        KeyCode::Char(c) => login.focused_mut().insert(c),
        _ => {}
    }
    vec![]
}

/// Handles the sign-in result.
///
/// Success transitions to the menu screen (exactly once; a result arriving
/// while already on the menu is ignored) and starts the live subscription.
/// Failure collapses to a single notice, whatever the cause.
pub fn handle_sign_in_result(
    state: &mut AppState,
    result: ServiceResult<Session>,
) -> Vec<UiEffect> {
    let Screen::Login(login) = &mut state.screen else {
        return vec![];
    };

    match result {
        Ok(session) => {
            state.session = Some(session);
            state.screen = Screen::Menu(crate::features::menu::MenuState::default());
            vec![UiEffect::StartSubscription]
        }
        Err(err) => {
            tracing::warn!(error = %err, "sign-in failed");
            login.signing_in = false;
            notice::show(state, notices::BAD_CREDENTIALS);
            vec![]
        }
    }
}

/// Renders the login screen.
pub fn render(login: &LoginState, frame: &mut Frame, area: Rect) {
    let width = area.width.min(48);
    let box_area = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + area.height.saturating_sub(11) / 2,
        width,
        height: 11.min(area.height),
    };

    let block = Block::bordered().title(" GPS Logger ");
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);

    let [email_area, password_area, hint_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .areas(inner);

    render_field(frame, email_area, "Email", login.email.as_str(), login.focus == LoginField::Email);
    let masked = "*".repeat(login.password.as_str().chars().count());
    render_field(
        frame,
        password_area,
        "Password",
        &masked,
        login.focus == LoginField::Password,
    );

    let hint = if login.signing_in {
        Line::from(Span::styled("Signing in...", Style::default().fg(Color::Yellow)))
    } else {
        Line::from(Span::styled(
            "Enter to sign in, Tab to switch fields",
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(hint), hint_area);

    // Place the terminal cursor inside the focused field.
    let (field_area, buffer) = match login.focus {
        LoginField::Email => (email_area, &login.email),
        LoginField::Password => (password_area, &login.password),
    };
    frame.set_cursor_position((field_area.x + 1 + buffer.cursor_width(), field_area.y + 1));
}

fn render_field(frame: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::bordered().title(format!(" {title} ")).border_style(style);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(value), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_backspace_track_the_cursor() {
        let mut field = FieldBuffer::default();
        for c in "abc".chars() {
            field.insert(c);
        }
        field.move_left();
        field.insert('x');
        assert_eq!(field.as_str(), "abxc");
        field.backspace();
        assert_eq!(field.as_str(), "abc");
    }

    #[test]
    fn cursor_does_not_run_past_the_ends() {
        let mut field = FieldBuffer::with_text("hi");
        field.move_right();
        field.insert('!');
        assert_eq!(field.as_str(), "hi!");
        for _ in 0..5 {
            field.move_left();
        }
        field.insert('>');
        assert_eq!(field.as_str(), ">hi!");
    }
}

//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(state, event)`
//! and executes the returned effects. This is the single source of truth for
//! how events modify state.

use crossterm::event::{Event, KeyEventKind, KeyModifiers};
use gpslog_core::services::StoreEvent;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::features::menu::MenuAction;
use crate::features::permission::PermissionState;
use crate::features::{login, menu, notice, permission};
use crate::state::{AppState, Screen};

/// The main reducer function.
pub fn update(state: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            state.tick += 1;
            notice::expire(state);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(state, term_event),
        UiEvent::SignInFinished(result) => login::handle_sign_in_result(state, result),
        UiEvent::LocationFetched(result) => menu::handle_location_result(state, result),
        UiEvent::AppendFinished(result) => menu::handle_append_result(state, result),
        UiEvent::Store(StoreEvent::Records(records)) => {
            if let Screen::Menu(menu) = &mut state.screen {
                menu.records = records;
            }
            vec![]
        }
        UiEvent::Store(StoreEvent::Failed(err)) => {
            menu::handle_subscription_failure(&err);
            vec![]
        }
        UiEvent::SubscriptionEnded => {
            tracing::debug!("subscription channel closed");
            vec![]
        }
    }
}

fn handle_terminal_event(state: &mut AppState, event: Event) -> Vec<UiEffect> {
    let Event::Key(key) = event else {
        return vec![];
    };
    if key.kind != KeyEventKind::Press {
        return vec![];
    }

    // Ctrl+C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, crossterm::event::KeyCode::Char('c'))
    {
        return vec![UiEffect::Quit];
    }

    // A modal overlay captures all input.
    if state.overlay.is_some() {
        return permission::handle_prompt_key(state, key);
    }

    let action = match &mut state.screen {
        Screen::Login(login) => return login::handle_key(login, key),
        Screen::Menu(menu) => menu::handle_key(menu, key),
    };

    match action {
        MenuAction::None => vec![],
        MenuAction::Capture => permission::ensure_granted(state),
        MenuAction::SignOut => sign_out(state),
    }
}

/// Tears the signed-in state down and returns to the login screen.
///
/// The permission grant is session-scoped, so it resets with the session.
fn sign_out(state: &mut AppState) -> Vec<UiEffect> {
    state.permission = PermissionState::Unknown;
    state.overlay = None;
    state.notice = None;
    state.screen = Screen::Login(crate::features::login::LoginState::default());
    match state.session.take() {
        Some(session) => vec![UiEffect::SignOut { session }],
        None => vec![],
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent};
    use gpslog_core::services::{
        Coordinate, ServiceError, ServiceErrorKind, Session, StoreEvent, notices,
    };

    use super::*;
    use crate::features::login::FieldBuffer;
    use crate::state::Overlay;

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::from(code)))
    }

    fn test_session() -> Session {
        Session {
            user_id: "u1".to_string(),
            id_token: "tok-1".to_string(),
        }
    }

    fn record(latitude: f64) -> gpslog_core::services::CoordinateRecord {
        gpslog_core::services::CoordinateRecord {
            latitude,
            longitude: 0.0,
            timestamp: 1_700_000_000_000,
        }
    }

    /// A state that has gone through a successful sign-in.
    fn signed_in_state() -> AppState {
        let mut state = AppState::new();
        let effects = update(&mut state, UiEvent::SignInFinished(Ok(test_session())));
        assert_eq!(effects, vec![UiEffect::StartSubscription]);
        state
    }

    #[test]
    fn submit_emits_sign_in_once_while_in_flight() {
        let mut state = AppState::new();
        if let Screen::Login(login) = &mut state.screen {
            login.email = FieldBuffer::with_text("user@example.com");
            login.password = FieldBuffer::with_text("secret");
        }

        let effects = update(&mut state, key(KeyCode::Enter));
        assert_eq!(
            effects,
            vec![UiEffect::SignIn {
                email: "user@example.com".to_string(),
                password: "secret".to_string(),
            }]
        );

        // Second Enter while the task is in flight does nothing.
        assert!(update(&mut state, key(KeyCode::Enter)).is_empty());
    }

    #[test]
    fn sign_in_success_navigates_exactly_once() {
        let mut state = signed_in_state();
        assert!(matches!(state.screen, Screen::Menu(_)));
        assert!(state.session.is_some());

        // A stray duplicate result changes nothing.
        let effects = update(&mut state, UiEvent::SignInFinished(Ok(test_session())));
        assert!(effects.is_empty());
        assert!(matches!(state.screen, Screen::Menu(_)));
    }

    #[test]
    fn invalid_credentials_show_notice_without_navigation() {
        let mut state = AppState::new();
        let err = ServiceError::new(ServiceErrorKind::InvalidCredentials, "rejected");
        let effects = update(&mut state, UiEvent::SignInFinished(Err(err)));

        assert!(effects.is_empty());
        assert!(matches!(state.screen, Screen::Login(_)));
        assert_eq!(state.notice.as_ref().unwrap().text, notices::BAD_CREDENTIALS);
        if let Screen::Login(login) = &state.screen {
            assert!(!login.signing_in);
        }
    }

    #[test]
    fn capture_opens_the_permission_prompt_first() {
        let mut state = signed_in_state();
        let effects = update(&mut state, key(KeyCode::Enter));
        assert!(effects.is_empty());
        assert!(matches!(state.overlay, Some(Overlay::PermissionPrompt)));
    }

    #[test]
    fn denying_permission_never_fetches_location() {
        let mut state = signed_in_state();
        update(&mut state, key(KeyCode::Enter));

        let effects = update(&mut state, key(KeyCode::Char('n')));
        assert!(effects.is_empty());
        assert!(state.overlay.is_none());
        assert_eq!(
            state.notice.as_ref().unwrap().text,
            notices::PERMISSION_DENIED
        );
        assert_eq!(state.permission, PermissionState::Unknown);
    }

    #[test]
    fn granting_permission_fetches_and_sticks_for_the_session() {
        let mut state = signed_in_state();
        update(&mut state, key(KeyCode::Enter));

        let effects = update(&mut state, key(KeyCode::Char('y')));
        assert_eq!(effects, vec![UiEffect::FetchLocation]);
        assert_eq!(state.permission, PermissionState::Granted);

        // Second capture skips the prompt.
        let effects = update(&mut state, key(KeyCode::Enter));
        assert_eq!(effects, vec![UiEffect::FetchLocation]);
        assert!(state.overlay.is_none());
    }

    #[test]
    fn unavailable_location_shows_notice_and_writes_nothing() {
        let mut state = signed_in_state();
        let effects = update(&mut state, UiEvent::LocationFetched(Ok(None)));
        assert!(effects.is_empty());
        assert_eq!(state.notice.as_ref().unwrap().text, notices::NO_LOCATION);
    }

    #[test]
    fn fetched_location_becomes_an_append_effect() {
        let mut state = signed_in_state();
        let position = Coordinate {
            latitude: 40.4168,
            longitude: -3.7038,
        };
        let effects = update(&mut state, UiEvent::LocationFetched(Ok(Some(position))));

        assert_eq!(effects.len(), 1);
        match &effects[0] {
            UiEffect::AppendRecord { record } => {
                assert_eq!(record.latitude, 40.4168);
                assert_eq!(record.longitude, -3.7038);
                assert!(record.timestamp > 0);
            }
            other => panic!("expected append effect, got {other:?}"),
        }
    }

    #[test]
    fn subscription_deliveries_replace_the_table() {
        let mut state = signed_in_state();
        update(
            &mut state,
            UiEvent::Store(StoreEvent::Records(vec![record(1.0)])),
        );
        assert_eq!(state.records().len(), 1);

        update(
            &mut state,
            UiEvent::Store(StoreEvent::Records(vec![record(2.0), record(3.0)])),
        );
        assert_eq!(state.records().len(), 2);
        assert_eq!(state.records()[0].latitude, 2.0);
    }

    #[test]
    fn sign_out_clears_session_and_permission() {
        let mut state = signed_in_state();
        update(&mut state, key(KeyCode::Char('y')));
        state.permission = PermissionState::Granted;

        // Move selection to "Sign out" and confirm.
        update(&mut state, key(KeyCode::Down));
        let effects = update(&mut state, key(KeyCode::Enter));

        assert_eq!(
            effects,
            vec![UiEffect::SignOut {
                session: test_session()
            }]
        );
        assert!(matches!(state.screen, Screen::Login(_)));
        assert!(state.session.is_none());
        assert_eq!(state.permission, PermissionState::Unknown);
    }

    #[test]
    fn ctrl_c_quits() {
        let mut state = AppState::new();
        let event = UiEvent::Terminal(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert_eq!(update(&mut state, event), vec![UiEffect::Quit]);
    }
}

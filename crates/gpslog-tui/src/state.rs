//! Application state composition.
//!
//! All mutation happens in the reducer on the UI thread; async results enter
//! as events, never by touching state directly.

use gpslog_core::services::Session;

use crate::features::login::LoginState;
use crate::features::menu::MenuState;
use crate::features::notice::Notice;
use crate::features::permission::PermissionState;

/// Top-level application state.
pub struct AppState {
    /// Flag indicating the app should quit.
    pub should_quit: bool,
    /// Tick counter, drives notice expiry.
    pub tick: u64,
    /// The signed-in user, if any. Capture and store operations require it.
    pub session: Option<Session>,
    /// Session-scoped location permission.
    pub permission: PermissionState,
    /// Active screen.
    pub screen: Screen,
    /// Modal overlay, rendered above the screen and capturing input.
    pub overlay: Option<Overlay>,
    /// Transient bottom-line notice.
    pub notice: Option<Notice>,
}

/// The two screens of the application.
pub enum Screen {
    Login(LoginState),
    Menu(MenuState),
}

/// Modal overlays.
pub enum Overlay {
    /// "Allow access to location?" prompt shown before the first capture.
    PermissionPrompt,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            tick: 0,
            session: None,
            permission: PermissionState::Unknown,
            screen: Screen::Login(LoginState::default()),
            overlay: None,
            notice: None,
        }
    }

    /// Current menu records, empty on the login screen. Test helper.
    #[cfg(test)]
    pub fn records(&self) -> &[gpslog_core::services::CoordinateRecord] {
        match &self.screen {
            Screen::Menu(menu) => &menu.records,
            Screen::Login(_) => &[],
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

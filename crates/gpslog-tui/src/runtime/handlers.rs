//! Effect handlers for the TUI runtime.
//!
//! Handlers are pure async functions that return `UiEvent`. The runtime
//! spawns them and forwards the result to the inbox, so they never touch
//! state or the terminal.

use std::sync::Arc;

use gpslog_core::services::{CoordinateRecord, Services, Session};

use crate::events::UiEvent;

/// Runs the credential sign-in and reports back to the reducer.
pub async fn sign_in(services: Arc<Services>, email: String, password: String) -> UiEvent {
    UiEvent::SignInFinished(services.identity.sign_in(&email, &password).await)
}

/// Asks the locator daemon for the last known position.
pub async fn fetch_location(services: Arc<Services>) -> UiEvent {
    UiEvent::LocationFetched(services.locator.last_known().await)
}

/// Appends a captured record to the per-user coordinate store.
pub async fn append_record(
    services: Arc<Services>,
    session: Session,
    record: CoordinateRecord,
) -> UiEvent {
    UiEvent::AppendFinished(services.store.append(&session, &record).await)
}

//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only; the reducer never performs
//! I/O or spawns tasks directly.

use gpslog_core::services::{CoordinateRecord, Session};

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug, PartialEq)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Spawn the sign-in task.
    SignIn { email: String, password: String },

    /// Discard the session and cancel the live subscription.
    SignOut { session: Session },

    /// Spawn a one-shot last-known-location fetch.
    FetchLocation,

    /// Spawn a store append for a freshly captured record.
    AppendRecord { record: CoordinateRecord },

    /// Open the live subscription for the signed-in user.
    StartSubscription,
}

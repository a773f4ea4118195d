//! UI event types.
//!
//! Everything that can happen to the application arrives as one of these:
//! terminal input, the render tick, or the result of an async effect sent
//! back through the runtime's inbox channel.

use gpslog_core::services::{Coordinate, ServiceResult, Session, StoreEvent};

/// Events processed by the reducer.
#[derive(Debug)]
pub enum UiEvent {
    /// Periodic tick; drives notice expiry.
    Tick,
    /// Raw terminal input.
    Terminal(crossterm::event::Event),
    /// Sign-in task finished.
    SignInFinished(ServiceResult<Session>),
    /// Location fetch finished. `Ok(None)` means no cached fix.
    LocationFetched(ServiceResult<Option<Coordinate>>),
    /// Store append finished; `Ok` carries the generated key.
    AppendFinished(ServiceResult<String>),
    /// A delivery from the live store subscription.
    Store(StoreEvent),
    /// The live subscription channel closed.
    SubscriptionEnded,
}

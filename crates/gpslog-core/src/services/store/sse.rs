//! Change-event stream for the coordinate store.
//!
//! The store's streaming endpoint speaks server-sent events: `put` and
//! `patch` signal a change under the watched path, `keep-alive` is a
//! heartbeat, and `cancel` / `auth_revoked` terminate the stream. The caller
//! never inspects the event payload; any change triggers a full re-read.

use std::pin::Pin;

use eventsource_stream::{EventStream, Eventsource};
use futures_util::Stream;

use crate::services::{ServiceError, ServiceErrorKind, ServiceResult};

/// A parsed store stream event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    /// Data under the watched path changed; re-read the full set.
    Change,
    /// Heartbeat; nothing to do.
    KeepAlive,
}

/// SSE parser that converts a byte stream into `ChangeEvent`s.
pub struct ChangeStream<S> {
    inner: EventStream<S>,
}

impl<S> ChangeStream<S> {
    pub fn new(stream: S) -> Self
    where
        S: Eventsource,
    {
        Self {
            inner: stream.eventsource(),
        }
    }
}

impl<S, E> Stream for ChangeStream<S>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = ServiceResult<ChangeEvent>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        use std::task::Poll;

        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(event))) => {
                Poll::Ready(Some(parse_event(&event.event, &event.data)))
            }
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(ServiceError::new(
                ServiceErrorKind::Parse,
                format!("SSE stream error: {e}"),
            )))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Maps an SSE event name to a `ChangeEvent` or a terminal error.
fn parse_event(event_type: &str, data: &str) -> ServiceResult<ChangeEvent> {
    match event_type {
        "put" | "patch" => Ok(ChangeEvent::Change),
        "keep-alive" => Ok(ChangeEvent::KeepAlive),
        "cancel" => Err(ServiceError::new(
            ServiceErrorKind::Api,
            "store subscription cancelled by the server",
        )
        .with_details(data.to_string())),
        "auth_revoked" => Err(ServiceError::new(
            ServiceErrorKind::Api,
            "store credentials revoked",
        )
        .with_details(data.to_string())),
        other => Err(ServiceError::new(
            ServiceErrorKind::Parse,
            format!("unknown store stream event: {other}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_and_patch_are_changes() {
        assert_eq!(
            parse_event("put", r#"{"path":"/","data":null}"#).unwrap(),
            ChangeEvent::Change
        );
        assert_eq!(
            parse_event("patch", r#"{"path":"/-N1","data":{}}"#).unwrap(),
            ChangeEvent::Change
        );
    }

    #[test]
    fn keep_alive_is_a_heartbeat() {
        assert_eq!(parse_event("keep-alive", "null").unwrap(), ChangeEvent::KeepAlive);
    }

    #[test]
    fn terminal_events_are_errors() {
        let cancel = parse_event("cancel", "gone").unwrap_err();
        assert_eq!(cancel.kind, ServiceErrorKind::Api);
        assert_eq!(cancel.details.as_deref(), Some("gone"));

        let revoked = parse_event("auth_revoked", "expired").unwrap_err();
        assert_eq!(revoked.kind, ServiceErrorKind::Api);
    }

    #[test]
    fn unknown_event_is_a_parse_error() {
        let err = parse_event("what", "").unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::Parse);
    }
}

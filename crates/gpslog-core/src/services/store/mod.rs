//! Coordinate store client.
//!
//! Path-addressed JSON tree in the Realtime Database REST style. Records for
//! a user live under `users/{uid}/{generatedKey}`; the server generates the
//! child key on append. A live subscription holds a streaming connection
//! open and re-reads the full record set on every change event, delivering
//! it as a replacement list (never a delta).

mod sse;

use std::collections::BTreeMap;

use chrono::{Local, TimeZone, Utc};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use self::sse::{ChangeEvent, ChangeStream};
use super::identity::Session;
use super::locator::Coordinate;
use super::{ServiceError, ServiceErrorKind, ServiceResult, resolve_required};
use crate::config::Config;

/// One captured GPS fix. Immutable once created; identified by its storage
/// path, which this client never needs to hand back out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRecord {
    pub latitude: f64,
    pub longitude: f64,
    /// Capture time in epoch milliseconds.
    pub timestamp: i64,
}

impl CoordinateRecord {
    /// Builds a record from a position, stamped with the current time.
    pub fn captured_now(position: Coordinate) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Formats the capture time as `dd/MM/yyyy HH:mm:ss` in local time.
    pub fn formatted_local_time(&self) -> String {
        Local
            .timestamp_millis_opt(self.timestamp)
            .single()
            .map_or_else(|| "-".to_string(), |dt| dt.format("%d/%m/%Y %H:%M:%S").to_string())
    }
}

/// Wire-side record with every field optional.
///
/// `complete` is the single filtering point: a record lacking any field is
/// dropped on read, never surfaced as an error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    latitude: Option<f64>,
    longitude: Option<f64>,
    timestamp: Option<i64>,
}

impl RawRecord {
    fn complete(self) -> Option<CoordinateRecord> {
        Some(CoordinateRecord {
            latitude: self.latitude?,
            longitude: self.longitude?,
            timestamp: self.timestamp?,
        })
    }
}

/// Deliveries on a live subscription channel.
#[derive(Debug)]
pub enum StoreEvent {
    /// Full replacement list after a remote change (or on subscribe).
    Records(Vec<CoordinateRecord>),
    /// The stream was terminated by the server (cancel, revoked credentials)
    /// or a re-read failed. No further deliveries follow.
    Failed(ServiceError),
}

/// Handle to a live subscription.
///
/// Owns the cancellation token for the background task; dropping the handle
/// cancels the task, so the subscription cannot outlive the screen that
/// acquired it.
pub struct Subscription {
    rx: mpsc::Receiver<StoreEvent>,
    cancel: CancellationToken,
}

impl Subscription {
    /// Receives the next delivery. `None` once the stream has ended and the
    /// channel is drained.
    pub async fn recv(&mut self) -> Option<StoreEvent> {
        self.rx.recv().await
    }

    /// Stops the subscription. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Clone of the cancellation token, for owners that move the handle into
    /// a forwarding task but still need deterministic teardown.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Coordinate store client.
#[derive(Clone)]
pub struct CoordinateStore {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    /// Server-generated child key.
    name: String,
}

impl CoordinateStore {
    /// Creates a new store client from config.
    ///
    /// # Errors
    /// Returns an error if no store base URL is configured.
    pub fn new(config: &Config, http: reqwest::Client) -> anyhow::Result<Self> {
        let base_url = resolve_required(
            config.store.base_url.as_deref(),
            "GPSLOG_STORE_BASE_URL",
            "base_url in [store]",
        )?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn user_url(&self, session: &Session) -> String {
        format!(
            "{}/users/{}.json?auth={}",
            self.base_url, session.user_id, session.id_token
        )
    }

    /// Appends a record under the user's namespace.
    ///
    /// The server generates the child key; concurrent appends simply
    /// accumulate. Returns the generated key.
    ///
    /// # Errors
    /// Transport, status, and parse failures as [`ServiceError`].
    pub async fn append(
        &self,
        session: &Session,
        record: &CoordinateRecord,
    ) -> ServiceResult<String> {
        let response = self
            .http
            .post(self.user_url(session))
            .json(record)
            .send()
            .await
            .map_err(|err| ServiceError::from_transport("store append failed", &err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::new(
                ServiceErrorKind::HttpStatus,
                format!("store returned {status} on append"),
            ));
        }

        let parsed: AppendResponse = response.json().await.map_err(|err| {
            ServiceError::new(
                ServiceErrorKind::Parse,
                format!("Failed to parse append response: {err}"),
            )
        })?;
        tracing::debug!(key = %parsed.name, user_id = %session.user_id, "record appended");
        Ok(parsed.name)
    }

    /// Reads the full record set for the user, dropping incomplete records.
    ///
    /// Delivery order is the store's native iteration order: generated keys
    /// are chronologically monotonic, so key order equals insertion order.
    ///
    /// # Errors
    /// Transport, status, and parse failures as [`ServiceError`].
    pub async fn snapshot(&self, session: &Session) -> ServiceResult<Vec<CoordinateRecord>> {
        let response = self
            .http
            .get(self.user_url(session))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| ServiceError::from_transport("store read failed", &err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::new(
                ServiceErrorKind::HttpStatus,
                format!("store returned {status} on read"),
            ));
        }

        let tree: Option<BTreeMap<String, serde_json::Value>> =
            response.json().await.map_err(|err| {
                ServiceError::new(
                    ServiceErrorKind::Parse,
                    format!("Failed to parse store snapshot: {err}"),
                )
            })?;

        let records = tree
            .unwrap_or_default()
            .into_values()
            .filter_map(|value| {
                serde_json::from_value::<RawRecord>(value)
                    .ok()
                    .and_then(RawRecord::complete)
            })
            .collect();
        Ok(records)
    }

    /// Opens a live subscription on the user's record set.
    ///
    /// An initial snapshot is delivered immediately; afterwards every remote
    /// change triggers a full re-read delivered as a replacement list.
    pub fn subscribe(&self, session: &Session) -> Subscription {
        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let store = self.clone();
        let session = session.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                () = task_cancel.cancelled() => Ok(()),
                result = store.watch(&session, &tx) => result,
            };
            if let Err(err) = result {
                tracing::warn!(error = %err, "store subscription ended with error");
                let _ = tx.send(StoreEvent::Failed(err)).await;
            }
        });

        Subscription { rx, cancel }
    }

    /// Streams change events and redelivers the filtered full set on each.
    async fn watch(
        &self,
        session: &Session,
        tx: &mpsc::Sender<StoreEvent>,
    ) -> ServiceResult<()> {
        // Initial delivery before any change arrives.
        let records = self.snapshot(session).await?;
        if tx.send(StoreEvent::Records(records)).await.is_err() {
            return Ok(());
        }

        let response = self
            .http
            .get(self.user_url(session))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|err| ServiceError::from_transport("store stream failed", &err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::new(
                ServiceErrorKind::HttpStatus,
                format!("store returned {status} on stream open"),
            ));
        }

        let mut stream = ChangeStream::new(response.bytes_stream());
        while let Some(event) = stream.next().await {
            match event? {
                ChangeEvent::Change => {
                    let records = self.snapshot(session).await?;
                    if tx.send(StoreEvent::Records(records)).await.is_err() {
                        return Ok(());
                    }
                }
                ChangeEvent::KeepAlive => {}
            }
        }

        tracing::debug!(user_id = %session.user_id, "store stream closed");
        Ok(())
    }
}

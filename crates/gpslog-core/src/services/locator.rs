//! Location daemon client.
//!
//! One-shot query for the most recently cached device position. Best effort
//! only: no active fix is forced, no retry, no fallback. An empty cache is a
//! normal outcome (`Ok(None)`), not an error.

use serde::Deserialize;

use super::{ServiceError, ServiceErrorKind, ServiceResult, resolve_base_url};
use crate::config::Config;

/// Default address of the local position daemon.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8947";

/// A device position as reported by the location daemon.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Location daemon client.
pub struct LocationClient {
    base_url: String,
    http: reqwest::Client,
}

impl LocationClient {
    /// Creates a new location client from config.
    ///
    /// # Errors
    /// Returns an error if a configured base URL is malformed.
    pub fn new(config: &Config, http: reqwest::Client) -> anyhow::Result<Self> {
        let base_url = resolve_base_url(
            config.locator.base_url.as_deref(),
            "GPSLOG_LOCATOR_BASE_URL",
            DEFAULT_BASE_URL,
            "locator",
        )?;
        Ok(Self { base_url, http })
    }

    /// Returns the last known position, or `None` if the daemon has no
    /// cached fix.
    ///
    /// # Errors
    /// Transport and server failures; an empty cache is not an error.
    pub async fn last_known(&self) -> ServiceResult<Option<Coordinate>> {
        let url = format!("{}/v1/position/last", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| ServiceError::from_transport("locator request failed", &err))?;

        let status = response.status();
        if status == reqwest::StatusCode::NO_CONTENT {
            tracing::debug!("locator has no cached position");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ServiceError::new(
                ServiceErrorKind::HttpStatus,
                format!("locator returned {status}"),
            ));
        }

        let coordinate: Coordinate = response.json().await.map_err(|err| {
            ServiceError::new(
                ServiceErrorKind::Parse,
                format!("Failed to parse position: {err}"),
            )
        })?;
        Ok(Some(coordinate))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(base_url: &str) -> LocationClient {
        let mut config = Config::default();
        config.locator.base_url = Some(base_url.to_string());
        LocationClient::new(&config, reqwest::Client::new()).unwrap()
    }

    #[tokio::test]
    async fn cached_position_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/position/last"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 40.4168,
                "longitude": -3.7038,
            })))
            .mount(&server)
            .await;

        let position = client(&server.uri()).last_known().await.unwrap();
        assert_eq!(
            position,
            Some(Coordinate {
                latitude: 40.4168,
                longitude: -3.7038,
            })
        );
    }

    #[tokio::test]
    async fn empty_cache_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        assert_eq!(client(&server.uri()).last_known().await.unwrap(), None);
    }

    #[tokio::test]
    async fn server_error_maps_to_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server.uri()).last_known().await.unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::HttpStatus);
    }
}

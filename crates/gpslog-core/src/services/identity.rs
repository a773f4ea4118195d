//! Identity service client.
//!
//! Password sign-in against an Identity Toolkit style REST endpoint. Every
//! identity-level rejection (wrong password, unknown account) collapses to
//! [`ServiceErrorKind::InvalidCredentials`]; transport and server failures
//! keep their own kinds for the logs but the UI shows the same notice either
//! way.

use serde::Deserialize;
use serde_json::json;

use super::{ServiceError, ServiceErrorKind, ServiceResult, resolve_base_url, resolve_required};
use crate::config::Config;

/// Default hosted identity endpoint.
pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

/// The currently authenticated user.
///
/// Only obtainable from a successful sign-in; every store and locator
/// operation requires one, so the capture flow is unreachable while signed
/// out. There is deliberately no anonymous fallback identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Stable user identifier, used as the store namespace.
    pub user_id: String,
    /// Bearer token attached to store requests.
    pub id_token: String,
}

/// Identity service client.
pub struct IdentityClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SignInResponse {
    #[serde(rename = "localId")]
    local_id: String,
    #[serde(rename = "idToken")]
    id_token: String,
}

impl IdentityClient {
    /// Creates a new identity client from config.
    ///
    /// # Panics
    /// - In test builds (`#[cfg(test)]`), panics if `base_url` is the hosted
    ///   endpoint.
    /// - At runtime, panics if `GPSLOG_BLOCK_REAL_API=1` and `base_url` is the
    ///   hosted endpoint.
    ///
    /// This prevents tests from accidentally making real network requests.
    ///
    /// # Errors
    /// Returns an error if the base URL is malformed or no API key is set.
    pub fn new(config: &Config, http: reqwest::Client) -> anyhow::Result<Self> {
        let base_url = resolve_base_url(
            config.identity.base_url.as_deref(),
            "GPSLOG_IDENTITY_BASE_URL",
            DEFAULT_BASE_URL,
            "identity",
        )?;
        let api_key = resolve_required(
            config.identity.api_key.as_deref(),
            "GPSLOG_IDENTITY_API_KEY",
            "api_key in [identity]",
        )?;

        #[cfg(test)]
        assert!(
            base_url != DEFAULT_BASE_URL,
            "Tests must not use the hosted identity service!\n\
             Set GPSLOG_IDENTITY_BASE_URL to a mock server (e.g., wiremock)."
        );

        #[cfg(not(test))]
        if std::env::var("GPSLOG_BLOCK_REAL_API").is_ok_and(|v| v == "1")
            && base_url == DEFAULT_BASE_URL
        {
            panic!(
                "GPSLOG_BLOCK_REAL_API=1 but trying to use the hosted identity service!\n\
                 Set GPSLOG_IDENTITY_BASE_URL to a mock server."
            );
        }

        Ok(Self {
            base_url,
            api_key,
            http,
        })
    }

    /// Signs a user in with email and password.
    ///
    /// # Errors
    /// `InvalidCredentials` for any identity-level rejection; transport and
    /// server failures carry their own kinds.
    pub async fn sign_in(&self, email: &str, password: &str) -> ServiceResult<Session> {
        let url = format!(
            "{}/v1/accounts:signInWithPassword?key={}",
            self.base_url, self.api_key
        );
        let body = json!({
            "email": email.trim(),
            "password": password,
            "returnSecureToken": true,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| ServiceError::from_transport("identity request failed", &err))?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            let details = response.text().await.unwrap_or_default();
            return Err(ServiceError::new(
                ServiceErrorKind::InvalidCredentials,
                "sign-in rejected by the identity service",
            )
            .with_details(details));
        }
        if !status.is_success() {
            return Err(ServiceError::new(
                ServiceErrorKind::HttpStatus,
                format!("identity service returned {status}"),
            ));
        }

        let parsed: SignInResponse = response.json().await.map_err(|err| {
            ServiceError::new(
                ServiceErrorKind::Parse,
                format!("Failed to parse sign-in response: {err}"),
            )
        })?;

        tracing::info!(user_id = %parsed.local_id, "signed in");
        Ok(Session {
            user_id: parsed.local_id,
            id_token: parsed.id_token,
        })
    }

    /// Signs the user out.
    ///
    /// The identity service keeps no server-side session for password
    /// sign-in; discarding the token is the whole operation.
    pub fn sign_out(&self, session: Session) {
        tracing::info!(user_id = %session.user_id, "signed out");
        drop(session);
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json_string, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_config(base_url: &str) -> Config {
        let mut config = Config::default();
        config.identity.base_url = Some(base_url.to_string());
        config.identity.api_key = Some("test-key".to_string());
        config
    }

    async fn client(server: &MockServer) -> IdentityClient {
        IdentityClient::new(&test_config(&server.uri()), reqwest::Client::new()).unwrap()
    }

    #[tokio::test]
    async fn sign_in_returns_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .and(query_param("key", "test-key"))
            .and(body_json_string(
                r#"{"email":"user@example.com","password":"secret","returnSecureToken":true}"#,
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "localId": "u1",
                "idToken": "tok-1",
                "email": "user@example.com",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server)
            .await
            // Leading/trailing whitespace in the email is trimmed before send.
            .sign_in(" user@example.com ", "secret")
            .await
            .unwrap();
        assert_eq!(session.user_id, "u1");
        assert_eq!(session.id_token, "tok-1");
    }

    #[tokio::test]
    async fn bad_request_maps_to_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "message": "INVALID_LOGIN_CREDENTIALS" }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .sign_in("user@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::InvalidCredentials);
        assert!(err.details.unwrap().contains("INVALID_LOGIN_CREDENTIALS"));
    }

    #[tokio::test]
    async fn server_error_maps_to_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .sign_in("user@example.com", "secret")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::HttpStatus);
    }

    #[tokio::test]
    async fn malformed_body_maps_to_parse() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .sign_in("user@example.com", "secret")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::Parse);
    }

    #[test]
    fn missing_api_key_is_a_constructor_error() {
        let mut config = Config::default();
        config.identity.base_url = Some("http://127.0.0.1:1".to_string());
        let result = IdentityClient::new(&config, reqwest::Client::new());
        assert!(result.is_err());
    }
}

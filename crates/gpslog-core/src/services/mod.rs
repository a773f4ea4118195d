//! Service clients shared by the TUI and CLI.
//!
//! The three remote collaborators (identity, location daemon, coordinate
//! store) are wrapped in explicitly constructed clients and bundled into a
//! [`Services`] container that callers pass around. There is no process-wide
//! singleton access to any of them.

use std::fmt;

use anyhow::{Context, Result};

use crate::config::Config;

pub mod identity;
pub mod locator;
pub mod store;

pub use identity::{IdentityClient, Session};
pub use locator::{Coordinate, LocationClient};
pub use store::{CoordinateRecord, CoordinateStore, StoreEvent, Subscription};

/// Standard User-Agent header for gpslog API requests.
pub const USER_AGENT: &str = concat!("gpslog/", env!("CARGO_PKG_VERSION"));

/// Dependency-injected handles to every remote service.
///
/// Constructed once from config and shared (behind an `Arc`) by whichever
/// component needs a service. Clients hold a common `reqwest::Client` so
/// connection pools are shared.
pub struct Services {
    pub identity: IdentityClient,
    pub locator: LocationClient,
    pub store: CoordinateStore,
}

impl Services {
    /// Builds all service clients from the given configuration.
    ///
    /// # Errors
    /// Returns an error if a required setting (identity API key, store base
    /// URL) is missing or a configured base URL is malformed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            identity: IdentityClient::new(config, http.clone())?,
            locator: LocationClient::new(config, http.clone())?,
            store: CoordinateStore::new(config, http)?,
        })
    }
}

// ============================================================================
// Error taxonomy
// ============================================================================

/// Error categories at the service boundary.
///
/// The presentation layer collapses all of these into fixed notice strings;
/// the taxonomy exists for logs and tests, not for user-facing branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// Sign-in rejected by the identity service (any identity-level cause).
    InvalidCredentials,
    /// HTTP status error (4xx, 5xx)
    HttpStatus,
    /// Connection timeout or request timeout
    Timeout,
    /// Failed to parse a response body or stream
    Parse,
    /// Transport failure or service-level error payload
    Api,
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceErrorKind::InvalidCredentials => write!(f, "invalid_credentials"),
            ServiceErrorKind::HttpStatus => write!(f, "http_status"),
            ServiceErrorKind::Timeout => write!(f, "timeout"),
            ServiceErrorKind::Parse => write!(f, "parse"),
            ServiceErrorKind::Api => write!(f, "api_error"),
        }
    }
}

/// Structured error returned by every service client.
#[derive(Debug, Clone)]
pub struct ServiceError {
    /// Error category
    pub kind: ServiceErrorKind,
    /// One-line summary suitable for logs
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Classifies a reqwest transport error.
    pub(crate) fn from_transport(context: &str, err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ServiceErrorKind::Timeout
        } else {
            ServiceErrorKind::Api
        };
        Self::new(kind, format!("{context}: {err}"))
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

/// Result alias for service-client operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

// ============================================================================
// User-facing notices
// ============================================================================

/// Collapsed notice strings shared by the TUI and CLI.
///
/// Every failure category degrades to exactly one of these, with the
/// structured [`ServiceError`] going to the log instead.
pub mod notices {
    pub const BAD_CREDENTIALS: &str = "Incorrect credentials. Try again.";
    pub const PERMISSION_DENIED: &str = "Location permission denied.";
    pub const NO_LOCATION: &str = "Could not determine the current location.";
    pub const SAVE_FAILED: &str = "Could not save coordinates to the store.";
    pub const SAVED: &str = "Coordinates saved.";
}

// ============================================================================
// Config resolution helpers
// ============================================================================

/// Resolves a base URL with precedence: env > config > default.
///
/// # Errors
/// Returns an error if a configured URL is not well-formed.
pub(crate) fn resolve_base_url(
    config_base_url: Option<&str>,
    env_var: &str,
    default_url: &str,
    service_name: &str,
) -> Result<String> {
    if let Ok(env_url) = std::env::var(env_var) {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed, service_name)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }
    }

    if let Some(config_url) = config_base_url {
        let trimmed = config_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed, service_name)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }
    }

    Ok(default_url.to_string())
}

/// Resolves a required setting with precedence: env > config.
///
/// # Errors
/// Returns an error naming both sources when neither is set.
pub(crate) fn resolve_required(
    config_value: Option<&str>,
    env_var: &str,
    config_key: &str,
) -> Result<String> {
    if let Ok(value) = std::env::var(env_var) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }

    if let Some(value) = config_value {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }

    anyhow::bail!("Missing setting. Set {env_var} or {config_key} in config.toml.")
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str, service_name: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid {service_name} base URL: {url}"))?;
    Ok(())
}

//! Clinic backend API client.
//!
//! The backend owns credentials, token validation and appointments. This
//! module only speaks its HTTP contract and exposes it through the
//! [`auth::CredentialService`], [`auth::SessionVerifier`] and
//! [`booking::BookingService`] traits.

pub mod auth;
pub mod booking;

use crate::APP_USER_AGENT;
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::{future::Future, pin::Pin, time::Duration};
use tracing::{debug, instrument};
use url::Url;

pub use auth::{CredentialService, Credentials, LoginOutcome, SessionUser, SessionVerifier};
pub use booking::{BookingConfirmation, BookingOutcome, BookingRequest, BookingService};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const LOGIN_ENDPOINT: &str = "/api/v1/auth/login/";
pub const SESSION_ENDPOINT: &str = "/api/v1/auth/me/";
pub const BOOKING_ENDPOINT: &str = "/api/v1/appointments/book/";

const REQUEST_TIMEOUT_SECONDS: u64 = 10;

#[derive(Clone, Debug)]
pub struct ClinicApi {
    base_url: Url,
    client: Client,
}

impl ClinicApi {
    /// Build a client for the backend rooted at `api_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(api_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(api_url).with_context(|| format!("Invalid clinic API URL: {api_url}"))?;

        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Clinic API URL cannot be a base: {api_url}"));
        }

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()?;

        Ok(Self { base_url, client })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an absolute API path against the base URL.
    ///
    /// # Errors
    /// Returns an error if the joined URL is invalid.
    #[instrument(skip(self))]
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let url = self
            .base_url
            .join(endpoint)
            .with_context(|| format!("Error joining endpoint {endpoint}"))?;

        debug!("endpoint URL: {}", url);

        Ok(url)
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }
}

/// Pull a human readable message out of a backend error body.
///
/// The backend wraps errors as `{"success": false, "error": {"code", "message"}}`;
/// the token endpoint may still answer with a bare `{"detail": ...}`.
pub(crate) fn error_message(body: &Value) -> Option<String> {
    body["error"]["message"]
        .as_str()
        .or_else(|| body["detail"].as_str())
        .map(ToString::to_string)
}

pub(crate) fn error_code(body: &Value) -> Option<String> {
    body["error"]["code"].as_str().map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_url_joins_absolute_paths() -> Result<()> {
        let api = ClinicApi::new("http://api.tfwellfare.test:8000/")?;
        assert_eq!(api.base_url().host_str(), Some("api.tfwellfare.test"));
        assert_eq!(
            api.endpoint_url(LOGIN_ENDPOINT)?.as_str(),
            "http://api.tfwellfare.test:8000/api/v1/auth/login/"
        );
        Ok(())
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        assert!(ClinicApi::new("not a url").is_err());
        assert!(ClinicApi::new("mailto:admin@tfwellfare.com").is_err());
    }

    #[test]
    fn error_message_prefers_wrapped_errors() {
        let wrapped = json!({
            "success": false,
            "error": {"code": "SLOT_UNAVAILABLE", "message": "Pick another time"}
        });
        assert_eq!(error_message(&wrapped).as_deref(), Some("Pick another time"));
        assert_eq!(error_code(&wrapped).as_deref(), Some("SLOT_UNAVAILABLE"));

        let bare = json!({"detail": "No active account found with the given credentials"});
        assert_eq!(
            error_message(&bare).as_deref(),
            Some("No active account found with the given credentials")
        );
        assert_eq!(error_code(&bare), None);
        assert_eq!(error_message(&json!({})), None);
    }
}

//! Credential submission and session lookup against the clinic backend.

use super::{error_message, BoxFuture, ClinicApi, LOGIN_ENDPOINT, SESSION_ENDPOINT};
use anyhow::{anyhow, Result};
use reqwest::{header::AUTHORIZATION, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{error, instrument, warn};

const STAFF_ROLES: [&str; 2] = ["admin", "staff"];

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl SessionUser {
    /// Admin pages are open to `admin` and `staff` roles only.
    #[must_use]
    pub fn is_staff(&self) -> bool {
        STAFF_ROLES.contains(&self.role.as_str())
    }

    /// Read a user object, accepting ids as strings or numbers.
    fn from_json(value: &Value) -> Option<Self> {
        let id = match &value["id"] {
            Value::String(id) => id.clone(),
            Value::Number(id) => id.to_string(),
            _ => return None,
        };

        Some(Self {
            id,
            email: value["email"].as_str().unwrap_or_default().to_string(),
            role: value["role"].as_str()?.to_string(),
        })
    }
}

#[derive(Debug)]
pub enum LoginOutcome {
    Authenticated {
        access_token: SecretString,
        user: Option<SessionUser>,
    },
    Rejected {
        message: String,
    },
}

/// Submit credentials, receive a token or a refusal.
pub trait CredentialService: Send + Sync {
    fn login<'a>(&'a self, credentials: &'a Credentials) -> BoxFuture<'a, Result<LoginOutcome>>;
}

/// Validate a token and return who it belongs to, `None` when the backend refuses it.
pub trait SessionVerifier: Send + Sync {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Option<SessionUser>>>;
}

impl ClinicApi {
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn request_token(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        let url = self.endpoint_url(LOGIN_ENDPOINT)?;

        let payload = json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });

        let response = self.client().post(url).json(&payload).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST {
            let body: Value = response.json().await.unwrap_or_default();
            let message =
                error_message(&body).unwrap_or_else(|| "Invalid email or password".to_string());

            warn!("Login rejected: {} - {}", status, message);

            return Ok(LoginOutcome::Rejected { message });
        }

        if !status.is_success() {
            error!("Login request failed: {}", status);

            return Err(anyhow!("login endpoint returned {status}"));
        }

        let body: Value = response.json().await?;

        let access_token = body["access"]
            .as_str()
            .ok_or_else(|| anyhow!("Error parsing JSON response: no access token found"))?;

        Ok(LoginOutcome::Authenticated {
            access_token: SecretString::from(access_token.to_string()),
            user: SessionUser::from_json(&body["user"]),
        })
    }

    #[instrument(skip_all)]
    async fn current_user(&self, token: &str) -> Result<Option<SessionUser>> {
        let url = self.endpoint_url(SESSION_ENDPOINT)?;

        let response = self
            .client()
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Session lookup refused: {}", response.status());

            return Ok(None);
        }

        let body: Value = response.json().await?;

        // Profile responses are wrapped in `data`; accept a bare user object too.
        let user = if body["data"].is_object() {
            &body["data"]
        } else {
            &body
        };

        Ok(SessionUser::from_json(user))
    }
}

impl CredentialService for ClinicApi {
    fn login<'a>(&'a self, credentials: &'a Credentials) -> BoxFuture<'a, Result<LoginOutcome>> {
        Box::pin(self.request_token(credentials))
    }
}

impl SessionVerifier for ClinicApi {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Option<SessionUser>>> {
        Box::pin(self.current_user(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn credentials() -> Credentials {
        Credentials::new(
            "admin@tfwellfare.com",
            SecretString::from("s3cret-pass".to_string()),
        )
    }

    #[test]
    fn staff_roles() {
        let mut user = SessionUser {
            id: "1".to_string(),
            email: "admin@tfwellfare.com".to_string(),
            role: "admin".to_string(),
        };
        assert!(user.is_staff());
        user.role = "staff".to_string();
        assert!(user.is_staff());
        user.role = "patient".to_string();
        assert!(!user.is_staff());
    }

    #[test]
    fn session_user_accepts_numeric_ids() {
        let user = SessionUser::from_json(&json!({"id": 7, "email": "a@b.co", "role": "staff"}));
        assert_eq!(user.map(|u| u.id), Some("7".to_string()));
        assert_eq!(SessionUser::from_json(&json!({"email": "a@b.co"})), None);
    }

    #[tokio::test]
    async fn login_returns_access_token() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(LOGIN_ENDPOINT))
            .and(body_json(json!({
                "email": "admin@tfwellfare.com",
                "password": "s3cret-pass"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access": "access-token",
                "refresh": "refresh-token",
                "user": {
                    "id": "3f0c",
                    "email": "admin@tfwellfare.com",
                    "full_name": "Clinic Admin",
                    "role": "admin"
                }
            })))
            .mount(&server)
            .await;

        let api = ClinicApi::new(&server.uri())?;
        match api.login(&credentials()).await? {
            LoginOutcome::Authenticated { access_token, user } => {
                assert_eq!(access_token.expose_secret(), "access-token");
                assert_eq!(user.map(|u| u.role), Some("admin".to_string()));
            }
            other => return Err(anyhow!("expected authenticated outcome, got {other:?}")),
        }
        Ok(())
    }

    #[tokio::test]
    async fn login_rejection_carries_backend_message() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(LOGIN_ENDPOINT))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "success": false,
                "error": {
                    "code": "NO_ACTIVE_ACCOUNT",
                    "message": "No active account found with the given credentials"
                }
            })))
            .mount(&server)
            .await;

        let api = ClinicApi::new(&server.uri())?;
        match api.login(&credentials()).await? {
            LoginOutcome::Rejected { message } => assert_eq!(
                message,
                "No active account found with the given credentials"
            ),
            other => return Err(anyhow!("expected rejection, got {other:?}")),
        }
        Ok(())
    }

    #[tokio::test]
    async fn login_server_error_is_an_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(LOGIN_ENDPOINT))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api = ClinicApi::new(&server.uri())?;
        assert!(api.login(&credentials()).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn verify_sends_bearer_token_and_reads_wrapped_user() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(SESSION_ENDPOINT))
            .and(header("Authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"id": 1, "email": "staff@tfwellfare.com", "role": "staff"}
            })))
            .mount(&server)
            .await;

        let api = ClinicApi::new(&server.uri())?;
        let user = api.verify("abc123").await?;
        assert_eq!(
            user,
            Some(SessionUser {
                id: "1".to_string(),
                email: "staff@tfwellfare.com".to_string(),
                role: "staff".to_string(),
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn verify_refused_token_is_none() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(SESSION_ENDPOINT))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let api = ClinicApi::new(&server.uri())?;
        assert_eq!(api.verify("expired").await?, None);
        Ok(())
    }
}

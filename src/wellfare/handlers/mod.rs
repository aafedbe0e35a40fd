//! Page and form handlers.

pub mod admin;
pub mod booking;
pub mod health;
pub mod home;
pub mod login;

use super::AppState;
use axum::http::{header::InvalidHeaderValue, HeaderValue};

/// Build the `HttpOnly` access token cookie set after a successful login.
pub(crate) fn access_token_cookie(
    state: &AppState,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let name = state.guard.cookie_name();
    let ttl_seconds = state.site.cookie_ttl_seconds();
    let mut cookie = format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}");
    if state.site.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn clear_access_token_cookie(state: &AppState) -> Result<HeaderValue, InvalidHeaderValue> {
    let name = state.guard.cookie_name();
    let mut cookie = format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if state.site.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn canonical_url(state: &AppState, path: &str) -> String {
    format!("{}{}", state.site.site_url(), path)
}

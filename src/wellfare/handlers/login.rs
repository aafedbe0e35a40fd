//! Admin login page, credential submission and logout.

use super::{access_token_cookie, canonical_url, clear_access_token_cookie};
use crate::{
    clinic::{Credentials, LoginOutcome},
    wellfare::{pages, AppState, GuardConfig},
};
use axum::{
    extract::{Extension, Form, Query},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

#[derive(Deserialize, Debug, Default)]
pub struct LoginQuery {
    redirect: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    redirect: Option<String>,
}

// axum handler for the login page
pub async fn page(state: Extension<Arc<AppState>>, Query(query): Query<LoginQuery>) -> Html<String> {
    let target = safe_redirect_target(&state.guard, query.redirect.as_deref());

    render(&state, &target, "", None)
}

// axum handler for the login form
#[instrument(skip_all)]
pub async fn submit(state: Extension<Arc<AppState>>, Form(form): Form<LoginForm>) -> Response {
    let target = safe_redirect_target(&state.guard, form.redirect.as_deref());

    if form.email.trim().is_empty() || form.password.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            render(
                &state,
                &target,
                &form.email,
                Some("Email and password are required"),
            ),
        )
            .into_response();
    }

    let credentials = Credentials::new(form.email.trim(), SecretString::from(form.password));

    match state.credentials.login(&credentials).await {
        Ok(LoginOutcome::Authenticated { access_token, user }) => {
            let cookie = match access_token_cookie(&state, access_token.expose_secret()) {
                Ok(cookie) => cookie,
                Err(err) => {
                    error!("Failed to build access token cookie: {}", err);

                    return (
                        StatusCode::BAD_GATEWAY,
                        render(
                            &state,
                            &target,
                            &credentials.email,
                            Some("Sign in failed, please try again"),
                        ),
                    )
                        .into_response();
                }
            };

            info!(
                "Signed in {} ({})",
                credentials.email,
                user.as_ref().map_or("unknown role", |user| user.role.as_str())
            );

            let mut headers = HeaderMap::new();
            headers.insert(SET_COOKIE, cookie);

            (headers, Redirect::to(&target)).into_response()
        }

        Ok(LoginOutcome::Rejected { message }) => {
            warn!("Sign in rejected for {}", credentials.email);

            (
                StatusCode::UNAUTHORIZED,
                render(&state, &target, &credentials.email, Some(&message)),
            )
                .into_response()
        }

        Err(err) => {
            error!("Login request failed: {:#}", err);

            (
                StatusCode::BAD_GATEWAY,
                render(
                    &state,
                    &target,
                    &credentials.email,
                    Some("The sign-in service is unavailable, please try again later"),
                ),
            )
                .into_response()
        }
    }
}

// axum handler for logout
pub async fn logout(state: Extension<Arc<AppState>>) -> Response {
    // Always clear the cookie; the token itself is left to expire on the backend.
    let mut headers = HeaderMap::new();
    match clear_access_token_cookie(&state) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build cookie: {}", err),
    }

    (headers, Redirect::to(state.guard.login_path())).into_response()
}

/// Where to send the user after signing in.
///
/// Only local paths under the protected prefix are honoured, so the
/// `redirect` parameter cannot be used to bounce users to another site.
#[must_use]
pub fn safe_redirect_target(guard: &GuardConfig, candidate: Option<&str>) -> String {
    match candidate {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control)
                && path.starts_with(guard.protected_prefix())
                && path != guard.login_path() =>
        {
            path.to_string()
        }
        _ => guard.protected_prefix().to_string(),
    }
}

fn render(state: &AppState, target: &str, email: &str, error: Option<&str>) -> Html<String> {
    let alert = error.map_or_else(String::new, |message| {
        format!(
            "\n        <p role=\"alert\">{}</p>",
            pages::escape_html(message)
        )
    });

    let body = format!(
        r#"    <main>
      <h1>{site} Admin</h1>
      <p>Sign in to access the admin dashboard</p>
      <form method="post" action="{action}">{alert}
        <input type="hidden" name="redirect" value="{target}">
        <label>Email <input type="email" name="email" value="{email}" required></label>
        <label>Password <input type="password" name="password" required></label>
        <button type="submit">Sign in</button>
      </form>
    </main>"#,
        site = pages::SITE_NAME,
        action = pages::escape_html(state.guard.login_path()),
        target = pages::escape_html(target),
        email = pages::escape_html(email),
    );

    pages::render(
        &pages::ADMIN_LOGIN,
        &canonical_url(state, state.guard.login_path()),
        &body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_admin_paths_are_kept() {
        let guard = GuardConfig::default();
        assert_eq!(
            safe_redirect_target(&guard, Some("/admin/appointments")),
            "/admin/appointments"
        );
        assert_eq!(safe_redirect_target(&guard, Some("/admin")), "/admin");
    }

    #[test]
    fn foreign_or_odd_targets_fall_back_to_dashboard() {
        let guard = GuardConfig::default();
        for candidate in [
            None,
            Some(""),
            Some("//evil.example/admin"),
            Some("https://evil.example/admin"),
            Some("/\\evil.example"),
            Some("/book"),
            Some("/admin/login"),
            Some("/admin/\nx"),
        ] {
            assert_eq!(safe_redirect_target(&guard, candidate), "/admin");
        }
    }
}

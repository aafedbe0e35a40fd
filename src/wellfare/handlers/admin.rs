//! Admin dashboard shell.
//!
//! The guard has already made sure a token cookie exists. Here the token is
//! checked against the backend once more before any admin markup is served.

use super::canonical_url;
use crate::{
    clinic::SessionUser,
    wellfare::{guard::parse_cookies, pages, AppState, LOGOUT_PATH},
};
use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

const SECTIONS: [(&str, &str); 5] = [
    ("appointments", "Appointments"),
    ("services", "Services"),
    ("blog", "Blog"),
    ("events", "Events"),
    ("availability", "Availability"),
];

// axum handler for /admin
pub async fn dashboard(state: Extension<Arc<AppState>>, headers: HeaderMap) -> Response {
    show(&state, &headers, None).await
}

// axum handler for /admin/*section
pub async fn section(
    state: Extension<Arc<AppState>>,
    Path(section): Path<String>,
    headers: HeaderMap,
) -> Response {
    show(&state, &headers, Some(&section)).await
}

async fn show(state: &AppState, headers: &HeaderMap, section: Option<&str>) -> Response {
    let Some(user) = authorize(state, headers).await else {
        return Redirect::temporary(state.guard.login_path()).into_response();
    };

    let prefix = state.guard.protected_prefix().trim_end_matches('/');

    let label = match section {
        None => "Dashboard",
        Some(section) => match section_label(section) {
            Some(label) => label,
            None => {
                debug!("Unknown admin section: {}", section);
                return StatusCode::NOT_FOUND.into_response();
            }
        },
    };

    let path = section.map_or_else(|| prefix.to_string(), |s| format!("{prefix}/{s}"));

    render(state, &user, section, label, &path).into_response()
}

fn section_label(slug: &str) -> Option<&'static str> {
    SECTIONS
        .iter()
        .find(|(known, _)| *known == slug)
        .map(|(_, label)| *label)
}

/// Resolve the token cookie to a staff user, `None` on any doubt.
#[instrument(skip_all)]
async fn authorize(state: &AppState, headers: &HeaderMap) -> Option<SessionUser> {
    let cookies = parse_cookies(headers);
    let token = cookies
        .get(state.guard.cookie_name())
        .filter(|token| !token.is_empty())?;

    match state.sessions.verify(token).await {
        Ok(Some(user)) if user.is_staff() => Some(user),
        Ok(Some(user)) => {
            debug!("User {} has role {}, not staff", user.id, user.role);
            None
        }
        Ok(None) => {
            debug!("Session token refused by backend");
            None
        }
        Err(err) => {
            error!("Auth check failed: {:#}", err);
            None
        }
    }
}

fn render(
    state: &AppState,
    user: &SessionUser,
    section: Option<&str>,
    heading: &str,
    path: &str,
) -> axum::response::Html<String> {
    let prefix = state.guard.protected_prefix().trim_end_matches('/');

    let nav = SECTIONS
        .iter()
        .map(|(slug, label)| {
            let current = if section == Some(*slug) {
                " aria-current=\"page\""
            } else {
                ""
            };
            format!("        <li><a href=\"{prefix}/{slug}\"{current}>{label}</a></li>")
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        r#"    <header>
      <p>Signed in as {email} ({role})</p>
      <form method="post" action="{logout}"><button type="submit">Sign out</button></form>
    </header>
    <nav>
      <ul>
{nav}
      </ul>
    </nav>
    <main id="admin-app" data-section="{data_section}">
      <h1>{heading}</h1>
    </main>"#,
        logout = LOGOUT_PATH,
        email = pages::escape_html(&user.email),
        role = pages::escape_html(&user.role),
        data_section = pages::escape_html(section.unwrap_or("dashboard")),
    );

    pages::render(&pages::ADMIN_DASHBOARD, &canonical_url(state, path), &body)
}

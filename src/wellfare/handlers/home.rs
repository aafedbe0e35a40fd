use super::canonical_url;
use crate::wellfare::{pages, AppState};
use axum::{extract::Extension, response::Html};
use std::sync::Arc;

// axum handler for the landing page
pub async fn home(state: Extension<Arc<AppState>>) -> Html<String> {
    let body = format!(
        r#"    <main>
      <h1>{site}</h1>
      <p>{description}</p>
      <a href="/book">Book an appointment</a>
    </main>"#,
        site = pages::SITE_NAME,
        description = pages::escape_html(pages::HOME.description),
    );

    pages::render(&pages::HOME, &canonical_url(&state, "/"), &body)
}

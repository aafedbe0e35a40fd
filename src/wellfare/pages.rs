//! Page shells and their metadata.
//!
//! Interactive parts (booking wizard, login form behaviour) live in the browser;
//! the server renders the document, metadata and the form skeletons.

use axum::response::Html;

pub const SITE_NAME: &str = "TF Wellfare";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: &'static str,
    pub description: &'static str,
    pub robots: Option<&'static str>,
}

pub const HOME: PageMetadata = PageMetadata {
    title: "TF Wellfare Medical Clinic",
    description: "Personalized care for new and returning patients, in person and online.",
    robots: None,
};

pub const BOOKING: PageMetadata = PageMetadata {
    title: "Book Your Appointment",
    description: "Schedule your personalized consultation at TF Wellfare Medical Clinic. Easy online booking for new and returning patients.",
    robots: None,
};

pub const ADMIN_LOGIN: PageMetadata = PageMetadata {
    title: "Admin Login | TF Wellfare",
    description: "Login to the TF Wellfare admin dashboard.",
    robots: Some("noindex, nofollow"),
};

pub const ADMIN_DASHBOARD: PageMetadata = PageMetadata {
    title: "Admin Dashboard | TF Wellfare",
    description: "Admin dashboard for managing appointments, content, and clinic operations.",
    robots: Some("noindex, nofollow"),
};

/// Render a full document around `body`. `body` must already be escaped.
#[must_use]
pub fn render(meta: &PageMetadata, canonical_url: &str, body: &str) -> Html<String> {
    let robots = meta.robots.map_or_else(String::new, |robots| {
        format!("\n    <meta name=\"robots\" content=\"{}\">", escape_html(robots))
    });

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <meta name="description" content="{description}">{robots}
    <link rel="canonical" href="{canonical}">
  </head>
  <body>
{body}
  </body>
</html>
"#,
        title = escape_html(meta.title),
        description = escape_html(meta.description),
        canonical = escape_html(canonical_url),
    ))
}

#[must_use]
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

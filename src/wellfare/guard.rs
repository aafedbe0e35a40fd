//! Admin route guard.
//!
//! The guard only decides whether a page is reachable. It never validates the
//! token it finds; that happens on the backend for every API call made with
//! the token as a bearer credential.

use axum::http::{header::COOKIE, HeaderMap};
use std::collections::HashMap;

pub const PROTECTED_PREFIX: &str = "/admin";
pub const LOGIN_PATH: &str = "/admin/login";
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REDIRECT_PARAM: &str = "redirect";

#[derive(Clone, Debug)]
pub struct GuardConfig {
    protected_prefix: String,
    login_path: String,
    cookie_name: String,
    redirect_param: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            protected_prefix: PROTECTED_PREFIX.to_string(),
            login_path: LOGIN_PATH.to_string(),
            cookie_name: ACCESS_TOKEN_COOKIE.to_string(),
            redirect_param: REDIRECT_PARAM.to_string(),
        }
    }
}

impl GuardConfig {
    #[must_use]
    pub fn with_protected_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.protected_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_redirect_param(mut self, param: impl Into<String>) -> Self {
        self.redirect_param = param.into();
        self
    }

    #[must_use]
    pub fn protected_prefix(&self) -> &str {
        &self.protected_prefix
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    #[must_use]
    pub fn redirect_param(&self) -> &str {
        &self.redirect_param
    }
}

/// What the guard sees of a request: its path and its cookies.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub path: String,
    pub cookies: HashMap<String, String>,
}

impl RequestContext {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            cookies: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Build a context from a request path and its headers.
    #[must_use]
    pub fn from_parts(path: &str, headers: &HeaderMap) -> Self {
        Self {
            path: path.to_string(),
            cookies: parse_cookies(headers),
        }
    }

    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Continue,
    RedirectTo(String),
}

#[derive(Clone, Debug, Default)]
pub struct Guard {
    config: GuardConfig,
}

impl Guard {
    #[must_use]
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    #[must_use]
    pub fn decide(&self, context: &RequestContext) -> Decision {
        self.evaluate(&context.path, context.cookie(&self.config.cookie_name))
    }

    /// Decide on a path given the access token cookie value, if any.
    ///
    /// Prefix matching is plain string matching, so `/administrator` is covered
    /// as well. Only the login path itself is exempt.
    #[must_use]
    pub fn evaluate(&self, path: &str, token: Option<&str>) -> Decision {
        if !path.starts_with(self.config.protected_prefix.as_str()) {
            return Decision::Continue;
        }

        if path == self.config.login_path {
            return Decision::Continue;
        }

        match token {
            Some(token) if !token.is_empty() => Decision::Continue,
            _ => Decision::RedirectTo(self.login_redirect(path)),
        }
    }

    /// Login URL carrying `path` as the post-login destination.
    ///
    /// Only the path is kept; query strings of the original request are dropped.
    #[must_use]
    pub fn login_redirect(&self, path: &str) -> String {
        format!(
            "{}?{}={}",
            self.config.login_path,
            self.config.redirect_param,
            escape_query_value(path)
        )
    }
}

// Slashes stay readable; only characters that would end or corrupt the value are escaped.
fn escape_query_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("%26"),
            '+' => escaped.push_str("%2B"),
            '#' => escaped.push_str("%23"),
            ' ' => escaped.push_str("%20"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Collect every `Cookie` header into a name/value map.
///
/// When a name repeats, the first value wins.
#[must_use]
pub fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let Some(key) = parts.next().map(str::trim).filter(|key| !key.is_empty()) else {
                continue;
            };
            let val = parts.next().map_or("", str::trim);
            cookies
                .entry(key.to_string())
                .or_insert_with(|| val.to_string());
        }
    }
    cookies
}

//! Startup routing table.
//!
//! Routes are registered explicitly, and the table also owns the matcher that
//! decides which requests go through the admin guard.

use super::guard::{Decision, Guard, RequestContext};
use anyhow::{anyhow, Result};
use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::MethodRouter,
    Router,
};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_GUARD_PATTERN: &str = "/admin/:path*";

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `:name`, exactly one segment.
    Param,
    /// `:name*`, zero or more trailing segments.
    ZeroOrMore,
    /// `:name+`, one or more trailing segments.
    OneOrMore,
}

/// Segment-wise path pattern in the `/admin/:path*` style.
#[derive(Clone, Debug)]
pub struct PathMatcher {
    pattern: String,
    segments: Vec<Segment>,
}

impl PathMatcher {
    /// Parse a pattern such as `/admin/:path*`.
    ///
    /// # Errors
    /// Returns an error if the pattern is not absolute, has an unnamed
    /// parameter, or has a repeating parameter before the last segment.
    pub fn parse(pattern: &str) -> Result<Self> {
        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| anyhow!("route pattern must start with '/': {pattern}"))?;

        let parts: Vec<&str> = rest.split('/').filter(|part| !part.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (index, part) in parts.iter().enumerate() {
            let segment = match part.strip_prefix(':') {
                None => Segment::Literal((*part).to_string()),
                Some(name) => {
                    let (name, segment) = if let Some(name) = name.strip_suffix('*') {
                        (name, Segment::ZeroOrMore)
                    } else if let Some(name) = name.strip_suffix('+') {
                        (name, Segment::OneOrMore)
                    } else {
                        (name, Segment::Param)
                    };

                    if name.is_empty() {
                        return Err(anyhow!("unnamed parameter in route pattern: {pattern}"));
                    }

                    if segment != Segment::Param && index + 1 != parts.len() {
                        return Err(anyhow!(
                            "repeating parameter must be the last segment: {pattern}"
                        ));
                    }

                    segment
                }
            };
            segments.push(segment);
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    /// Matcher for `prefix` and everything below it.
    #[must_use]
    pub fn subtree(prefix: &str) -> Self {
        let mut segments: Vec<Segment> = prefix
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| Segment::Literal(part.to_string()))
            .collect();
        segments.push(Segment::ZeroOrMore);

        Self {
            pattern: format!("{}/:path*", prefix.trim_end_matches('/')),
            segments,
        }
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(literal) => {
                    if parts.get(index) != Some(&literal.as_str()) {
                        return false;
                    }
                }
                Segment::Param => {
                    if parts.get(index).is_none() {
                        return false;
                    }
                }
                Segment::ZeroOrMore => return true,
                Segment::OneOrMore => return parts.len() > index,
            }
        }

        parts.len() == self.segments.len()
    }
}

#[derive(Debug)]
struct GuardDispatch {
    guard: Arc<Guard>,
    matcher: PathMatcher,
}

pub struct RouteTable {
    routes: Vec<(String, MethodRouter)>,
    guard: Arc<Guard>,
    matcher: PathMatcher,
}

impl RouteTable {
    /// Empty table; the guard covers its own protected prefix until
    /// [`RouteTable::guarded_by`] says otherwise.
    #[must_use]
    pub fn new(guard: Guard) -> Self {
        let matcher = PathMatcher::subtree(guard.config().protected_prefix());
        Self {
            routes: Vec::new(),
            guard: Arc::new(guard),
            matcher,
        }
    }

    #[must_use]
    pub fn route(mut self, pattern: &str, handler: MethodRouter) -> Self {
        self.routes.push((pattern.to_string(), handler));
        self
    }

    /// Run the guard only for requests whose path matches `pattern`.
    ///
    /// # Errors
    /// Returns an error if the pattern cannot be parsed.
    pub fn guarded_by(mut self, pattern: &str) -> Result<Self> {
        self.matcher = PathMatcher::parse(pattern)?;
        Ok(self)
    }

    #[must_use]
    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    #[must_use]
    pub fn matcher(&self) -> &PathMatcher {
        &self.matcher
    }

    /// Build the router. The guard middleware wraps the fallback too, so unknown
    /// paths under the protected prefix are still redirected.
    #[must_use]
    pub fn into_router(self) -> Router {
        let dispatch = Arc::new(GuardDispatch {
            guard: self.guard,
            matcher: self.matcher,
        });

        let router = self
            .routes
            .into_iter()
            .fold(Router::new(), |router, (pattern, handler)| {
                router.route(&pattern, handler)
            });

        router.layer(middleware::from_fn_with_state(dispatch, guard_requests))
    }
}

async fn guard_requests(
    State(dispatch): State<Arc<GuardDispatch>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if !dispatch.matcher.matches(path) {
        return next.run(request).await;
    }

    let context = RequestContext::from_parts(path, request.headers());

    match dispatch.guard.decide(&context) {
        Decision::Continue => next.run(request).await,
        Decision::RedirectTo(location) => {
            debug!("Redirecting {} to {}", context.path, location);

            Redirect::temporary(&location).into_response()
        }
    }
}

use crate::clinic::{BookingService, CredentialService, SessionVerifier};
use anyhow::{anyhow, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub mod config;
pub mod guard;
pub mod handlers;
pub mod pages;
pub mod routes;

pub use config::SiteConfig;
pub use guard::{Decision, Guard, GuardConfig, RequestContext};
pub use routes::{PathMatcher, RouteTable, DEFAULT_GUARD_PATTERN};

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub site: SiteConfig,
    pub guard: GuardConfig,
    pub credentials: Arc<dyn CredentialService>,
    pub sessions: Arc<dyn SessionVerifier>,
    pub bookings: Arc<dyn BookingService>,
}

impl AppState {
    #[must_use]
    pub fn new(
        site: SiteConfig,
        guard: GuardConfig,
        credentials: Arc<dyn CredentialService>,
        sessions: Arc<dyn SessionVerifier>,
        bookings: Arc<dyn BookingService>,
    ) -> Self {
        Self {
            site,
            guard,
            credentials,
            sessions,
            bookings,
        }
    }
}

/// Signing out must work without a valid cookie, so it sits outside the
/// protected prefix.
pub const LOGOUT_PATH: &str = "/logout";

/// The site's routing table. Admin pages hang off the configured protected
/// prefix, and the guard covers that subtree.
///
/// # Errors
/// Returns an error if the protected prefix is not an absolute path below `/`.
pub fn route_table(guard: GuardConfig) -> Result<RouteTable> {
    let prefix = guard.protected_prefix().trim_end_matches('/').to_string();
    if !prefix.starts_with('/') {
        return Err(anyhow!(
            "protected prefix must be an absolute path below '/': {}",
            guard.protected_prefix()
        ));
    }

    let login_path = guard.login_path().to_string();

    Ok(RouteTable::new(Guard::new(guard))
        .route("/", get(handlers::home::home))
        .route("/health", get(handlers::health::health))
        .route("/book", get(handlers::booking::page).post(handlers::booking::submit))
        .route(
            &login_path,
            get(handlers::login::page).post(handlers::login::submit),
        )
        .route(LOGOUT_PATH, post(handlers::login::logout))
        .route(&prefix, get(handlers::admin::dashboard))
        .route(&format!("{prefix}/*section"), get(handlers::admin::section)))
}

/// Build the application router with tracing and request id layers.
///
/// # Errors
/// Returns an error if the routing table cannot be built.
pub fn app(state: Arc<AppState>) -> Result<Router> {
    let router = route_table(state.guard.clone())?.into_router();

    Ok(router.layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(Extension(state)),
    ))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, state: Arc<AppState>) -> Result<()> {
    let app = app(state)?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => tracing::error!("Failed to listen for SIGTERM: {}", err),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

use crate::{
    cli::telemetry,
    clinic::ClinicApi,
    wellfare::{self, AppState, GuardConfig, SiteConfig},
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub api_url: String,
    pub site_url: String,
    pub cookie_name: String,
    pub cookie_ttl_seconds: i64,
    pub cookie_secure: Option<bool>,
}

/// Build the application state described by `args`.
///
/// # Errors
/// Returns an error if the clinic API URL is invalid.
pub fn state(args: &Args) -> Result<AppState> {
    let clinic = Arc::new(ClinicApi::new(&args.api_url).context("Could not build clinic API client")?);

    let mut site = SiteConfig::new(args.site_url.clone())
        .with_cookie_ttl_seconds(args.cookie_ttl_seconds);

    if let Some(secure) = args.cookie_secure {
        site = site.with_cookie_secure(secure);
    }

    let guard = GuardConfig::default().with_cookie_name(args.cookie_name.clone());

    Ok(AppState::new(
        site,
        guard,
        clinic.clone(),
        clinic.clone(),
        clinic,
    ))
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let state = Arc::new(state(&args)?);

    let result = wellfare::new(args.port, state).await;

    telemetry::shutdown_tracer();

    result
}

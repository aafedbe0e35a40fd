//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary runs.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{site, ARG_API_URL, ARG_PORT};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let api_url = matches
        .get_one::<String>(ARG_API_URL)
        .cloned()
        .context("missing required argument: --api-url")?;

    let site_opts = site::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        api_url,
        site_url: site_opts.site_url,
        cookie_name: site_opts.cookie_name,
        cookie_ttl_seconds: site_opts.cookie_ttl_seconds,
        cookie_secure: site_opts.cookie_secure,
    }))
}

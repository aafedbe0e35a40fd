use crate::wellfare::{config::DEFAULT_SITE_URL, guard::ACCESS_TOKEN_COOKIE};
use anyhow::{anyhow, Result};
use clap::{Arg, ArgMatches, Command};

pub const ARG_SITE_URL: &str = "site-url";
pub const ARG_COOKIE_NAME: &str = "cookie-name";
pub const ARG_COOKIE_TTL_SECONDS: &str = "cookie-ttl-seconds";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";

#[derive(Debug, Clone)]
pub struct Options {
    pub site_url: String,
    pub cookie_name: String,
    pub cookie_ttl_seconds: i64,
    /// `None` lets the site URL scheme decide.
    pub cookie_secure: Option<bool>,
}

impl Options {
    /// Parse site and cookie arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a value is missing or out of range.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let site_url = matches
            .get_one::<String>(ARG_SITE_URL)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("missing required argument: --{ARG_SITE_URL}"))?;

        let cookie_name = matches
            .get_one::<String>(ARG_COOKIE_NAME)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("missing required argument: --{ARG_COOKIE_NAME}"))?;

        let cookie_ttl_seconds = matches
            .get_one::<i64>(ARG_COOKIE_TTL_SECONDS)
            .copied()
            .unwrap_or(3600);

        if cookie_ttl_seconds <= 0 {
            return Err(anyhow!("--{ARG_COOKIE_TTL_SECONDS} must be positive"));
        }

        Ok(Self {
            site_url,
            cookie_name,
            cookie_ttl_seconds,
            cookie_secure: matches.get_one::<bool>(ARG_COOKIE_SECURE).copied(),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SITE_URL)
                .long(ARG_SITE_URL)
                .help("Public base URL of the site, used for canonical links")
                .env("WELLFARE_SITE_URL")
                .default_value(DEFAULT_SITE_URL),
        )
        .arg(
            Arg::new(ARG_COOKIE_NAME)
                .long(ARG_COOKIE_NAME)
                .help("Name of the access token cookie checked on /admin")
                .env("WELLFARE_COOKIE_NAME")
                .default_value(ACCESS_TOKEN_COOKIE),
        )
        .arg(
            Arg::new(ARG_COOKIE_TTL_SECONDS)
                .long(ARG_COOKIE_TTL_SECONDS)
                .help("Access token cookie TTL in seconds")
                .env("WELLFARE_COOKIE_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark the access token cookie Secure (default: when the site URL is https)")
                .env("WELLFARE_COOKIE_SECURE")
                .value_parser(clap::value_parser!(bool)),
        )
}

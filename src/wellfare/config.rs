pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";

const DEFAULT_COOKIE_TTL_SECONDS: i64 = 60 * 60;

#[derive(Clone, Debug)]
pub struct SiteConfig {
    site_url: String,
    cookie_ttl_seconds: i64,
    cookie_secure: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_URL.to_string())
    }
}

impl SiteConfig {
    #[must_use]
    pub fn new(site_url: String) -> Self {
        // Only mark cookies secure when the site is served over HTTPS.
        let cookie_secure = site_url.starts_with("https://");

        Self {
            site_url: site_url.trim_end_matches('/').to_string(),
            cookie_ttl_seconds: DEFAULT_COOKIE_TTL_SECONDS,
            cookie_secure,
        }
    }

    #[must_use]
    pub fn with_cookie_ttl_seconds(mut self, seconds: i64) -> Self {
        self.cookie_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    #[must_use]
    pub fn cookie_ttl_seconds(&self) -> i64 {
        self.cookie_ttl_seconds
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}

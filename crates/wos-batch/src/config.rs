//! Configuration for the Web of Science batch client.

use std::time::Duration;

use url::Url;

use crate::error::{BatchError, BatchResult};

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL of the WOKMWS web services.
    pub const BASE_URL: &str = "http://search.webofknowledge.com/esti/wokmws/ws/";

    /// Authentication service, relative to [`BASE_URL`].
    pub const AUTH_SERVICE: &str = "WOKMWSAuthenticate";

    /// Search service, relative to [`BASE_URL`].
    pub const SEARCH_SERVICE: &str = "WokSearch";

    /// Maximum records returned by one search or retrieve request.
    pub const RECORD_LIMIT: usize = 100;

    /// Number of batch jobs allowed in flight at once.
    pub const SPEED_LIMIT: usize = 1;

    /// Cooldown each job sleeps after its request.
    pub const DELAY: Duration = Duration::from_secs(1);

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Client and batch configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// WOS username for HTTP basic authentication (optional, IP-based access otherwise).
    pub user: Option<String>,

    /// WOS password.
    pub password: Option<String>,

    /// Authentication endpoint.
    pub auth_url: String,

    /// Search endpoint.
    pub search_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Maximum records per request.
    pub record_limit: usize,

    /// Worker pool size for batch jobs.
    pub speed_limit: usize,

    /// Sleep after each batch request.
    pub delay: Duration,

    /// Retries for transient transport failures. Zero disables the retry middleware.
    pub max_retries: u32,
}

impl Config {
    /// Create a configuration against the public WOKMWS endpoints.
    #[must_use]
    pub fn new(user: Option<String>, password: Option<String>) -> Self {
        Self {
            user,
            password,
            auth_url: format!("{}{}", api::BASE_URL, api::AUTH_SERVICE),
            search_url: format!("{}{}", api::BASE_URL, api::SEARCH_SERVICE),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            record_limit: api::RECORD_LIMIT,
            speed_limit: api::SPEED_LIMIT,
            delay: api::DELAY,
            max_retries: 0,
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            auth_url: format!("{base}/esti/wokmws/ws/{}", api::AUTH_SERVICE),
            search_url: format!("{base}/esti/wokmws/ws/{}", api::SEARCH_SERVICE),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            delay: Duration::from_millis(0), // No cooldown in tests
            ..Self::new(None, None)
        }
    }

    /// Point both services at a different WOKMWS base URL.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `base_url` is not an absolute URL.
    pub fn with_base_url(mut self, base_url: &str) -> BatchResult<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| BatchError::validation("base_url", e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let join = |service: &str| {
            base.join(service)
                .map(String::from)
                .map_err(|e| BatchError::validation("base_url", e.to_string()))
        };
        self.auth_url = join(api::AUTH_SERVICE)?;
        self.search_url = join(api::SEARCH_SERVICE)?;
        Ok(self)
    }

    /// Create configuration from environment variables (and a `.env` file if present).
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let user = std::env::var("WOS_USER").ok();
        let password = std::env::var("WOS_PASSWORD").ok();
        let mut config = Self::new(user, password);

        if let Ok(base) = std::env::var("WOS_BASE_URL") {
            config = config.with_base_url(&base)?;
        }
        if let Ok(limit) = std::env::var("WOS_RECORD_LIMIT") {
            config.record_limit = limit.parse()?;
        }
        if let Ok(speed) = std::env::var("WOS_SPEED_LIMIT") {
            config.speed_limit = speed.parse()?;
        }
        if let Ok(delay) = std::env::var("WOS_DELAY_SECS") {
            config.delay = Duration::try_from_secs_f64(delay.parse()?)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the batch limits are usable.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self) -> BatchResult<()> {
        if self.record_limit == 0 {
            return Err(BatchError::validation("record_limit", "must be at least 1"));
        }
        if self.speed_limit == 0 {
            return Err(BatchError::validation("speed_limit", "must be at least 1"));
        }
        Ok(())
    }

    /// Check if basic-auth credentials are configured.
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.user.is_some() && self.password.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.has_credentials());
        assert_eq!(config.record_limit, 100);
        assert_eq!(config.speed_limit, 1);
        assert_eq!(config.delay, Duration::from_secs(1));
        assert_eq!(config.max_retries, 0);
        assert!(config.search_url.ends_with("/WokSearch"));
    }

    #[test]
    fn test_config_for_testing_has_no_delay() {
        let config = Config::for_testing("http://127.0.0.1:9999/");
        assert_eq!(config.delay, Duration::ZERO);
        assert_eq!(
            config.auth_url,
            "http://127.0.0.1:9999/esti/wokmws/ws/WOKMWSAuthenticate"
        );
    }

    #[test]
    fn test_with_base_url_adds_trailing_slash() {
        let config = Config::default().with_base_url("http://localhost:8080/ws").unwrap();
        assert_eq!(config.auth_url, "http://localhost:8080/ws/WOKMWSAuthenticate");
        assert_eq!(config.search_url, "http://localhost:8080/ws/WokSearch");
    }

    #[test]
    fn test_with_base_url_rejects_relative() {
        let err = Config::default().with_base_url("not a url").unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = Config::default();
        config.record_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.speed_limit = 0;
        assert!(config.validate().is_err());
    }
}

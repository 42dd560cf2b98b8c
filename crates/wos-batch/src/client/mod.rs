//! Web of Science search client.
//!
//! [`WosSearch`] is the seam the query and batch layers are written against.
//! [`WosClient`] implements it over the WOKMWS SOAP services:
//! - Session authentication with optional HTTP basic credentials
//! - Session id sent as a `SID` cookie on every search
//! - Optional retry middleware with exponential backoff (off by default)

pub mod soap;

use std::sync::RwLock;
use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::SearchPage;

/// Search operations the query executor needs.
#[async_trait::async_trait]
pub trait WosSearch: Send + Sync {
    /// Run `query` and return `count` records starting at the 1-based `offset`.
    async fn search(&self, query: &str, count: usize, offset: usize) -> ClientResult<SearchPage>;

    /// Fetch further records of an earlier search by its `query_id`.
    async fn retrieve(&self, query_id: &str, count: usize, offset: usize) -> ClientResult<String>;
}

/// WOKMWS SOAP client.
pub struct WosClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Authentication service URL.
    auth_url: String,

    /// Search service URL.
    search_url: String,

    /// Basic-auth username.
    user: Option<String>,

    /// Basic-auth password.
    password: Option<String>,

    /// Current session id.
    sid: RwLock<Option<String>>,
}

impl WosClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let mut builder = ClientBuilder::new(client);
        if config.max_retries > 0 {
            let retry_policy = ExponentialBackoff::builder()
                .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
                .build_with_max_retries(config.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(retry_policy));
        }

        Ok(Self {
            client: builder.build(),
            auth_url: config.auth_url,
            search_url: config.search_url,
            user: config.user,
            password: config.password,
            sid: RwLock::new(None),
        })
    }

    /// Current session id, if authenticated.
    #[must_use]
    pub fn session_id(&self) -> Option<String> {
        self.sid.read().ok().and_then(|sid| sid.clone())
    }

    /// Reuse an existing session instead of authenticating.
    pub fn set_session_id(&self, sid: impl Into<String>) {
        if let Ok(mut guard) = self.sid.write() {
            *guard = Some(sid.into());
        }
    }

    /// Open a session and remember its id.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a SOAP fault (e.g. bad credentials).
    pub async fn authenticate(&self) -> ClientResult<String> {
        let mut request = self
            .client
            .post(&self.auth_url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(soap::authenticate_envelope());

        if let Some(user) = &self.user {
            request = request.basic_auth(user, self.password.as_ref());
        }

        let body = Self::handle_response(request.send().await?).await?;
        let sid = soap::parse_session(&body)?;
        tracing::info!("Authenticated with Web of Science");
        self.set_session_id(sid.clone());
        Ok(sid)
    }

    /// Close the current session. Does nothing when no session is open.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a SOAP fault.
    pub async fn close_session(&self) -> ClientResult<()> {
        let Some(sid) = self.session_id() else {
            return Ok(());
        };

        let response = self
            .client
            .post(&self.auth_url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .header(reqwest::header::COOKIE, Self::cookie(&sid))
            .body(soap::close_session_envelope())
            .send()
            .await?;
        Self::handle_response(response).await?;

        if let Ok(mut guard) = self.sid.write() {
            *guard = None;
        }
        tracing::info!("Closed Web of Science session");
        Ok(())
    }

    fn cookie(sid: &str) -> String {
        format!("SID=\"{sid}\"")
    }

    /// POST an envelope to the search service within the current session.
    async fn post_search(&self, envelope: String) -> ClientResult<String> {
        let sid = self.session_id().ok_or(ClientError::NotAuthenticated)?;

        let response = self
            .client
            .post(&self.search_url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .header(reqwest::header::COOKIE, Self::cookie(&sid))
            .body(envelope)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Turn a response into its body, mapping faults and error statuses.
    async fn handle_response(response: reqwest::Response) -> ClientResult<String> {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let body = response.text().await?;

        // Faults arrive with a 500 status; prefer their message over the status
        if let Some(message) = soap::parse_fault(&body) {
            return Err(ClientError::fault(message));
        }

        if status.is_success() {
            return Ok(body);
        }

        match status.as_u16() {
            429 => Err(ClientError::rate_limited(retry_after.unwrap_or(60))),
            500..=599 => Err(ClientError::server(status.as_u16(), body)),
            _ => Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: body }),
        }
    }
}

#[async_trait::async_trait]
impl WosSearch for WosClient {
    async fn search(&self, query: &str, count: usize, offset: usize) -> ClientResult<SearchPage> {
        tracing::debug!(query, count, offset, "search");
        let body = self.post_search(soap::search_envelope(query, count, offset)).await?;
        soap::parse_search(&body)
    }

    async fn retrieve(&self, query_id: &str, count: usize, offset: usize) -> ClientResult<String> {
        tracing::debug!(query_id, count, offset, "retrieve");
        let body = self.post_search(soap::retrieve_envelope(query_id, count, offset)).await?;
        soap::parse_retrieve(&body)
    }
}

impl std::fmt::Debug for WosClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WosClient")
            .field("search_url", &self.search_url)
            .field("has_session", &self.session_id().is_some())
            .finish()
    }
}

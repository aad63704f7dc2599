//! Guest-authenticated lookup client.
//!
//! A [`LookupClient`] owns one guest credential. The credential is acquired
//! lazily on the first lookup and replaced when the upstream rejects it with
//! a 403. There is no TTL: expiry is only ever detected reactively.
//!
//! Per call the client issues at most two activation requests and at most
//! two lookup requests. Calls take `&mut self`, so one instance serves one
//! lookup at a time; use one instance per in-flight lookup.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Response, StatusCode};
use tracing::{debug, info, warn};

use super::constants::{
    lookup_query, AUTHORIZATION_TOKEN, DEFAULT_USER_AGENT, GUEST_ACTIVATE_URL, GUEST_TOKEN_HEADER,
    TWEET_BY_REST_ID_URL,
};
use super::error::{LookupResult, UpstreamError};
use super::models::{GuestTokenResponse, TweetResultEnvelope};
use super::normalize::{normalize, CanonicalPost};

/// Default overall timeout for one upstream request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Construction options for a [`LookupClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub user_agent: String,
    pub activate_url: String,
    pub lookup_url: String,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            activate_url: GUEST_ACTIVATE_URL.to_string(),
            lookup_url: TWEET_BY_REST_ID_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientOptions {
    /// Override the user agent. Blank values keep the default.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let user_agent = user_agent.into();
        if !user_agent.trim().is_empty() {
            self.user_agent = user_agent;
        }
        self
    }

    /// Point both endpoints somewhere else (fixtures, proxies).
    pub fn with_endpoints(
        mut self,
        activate_url: impl Into<String>,
        lookup_url: impl Into<String>,
    ) -> Self {
        self.activate_url = activate_url.into();
        self.lookup_url = lookup_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Lookup client with an embedded guest credential.
#[derive(Debug)]
pub struct LookupClient {
    http: reqwest::Client,
    options: ClientOptions,
    guest_token: Option<String>,
}

impl LookupClient {
    /// Build a client with its own connection pool.
    pub fn new(options: ClientOptions) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(options.timeout)
            .build()?;
        Ok(Self::with_http_client(http, options))
    }

    /// Build a client on top of an existing (shared) connection pool.
    ///
    /// The credential is never shared: each client starts without one.
    pub fn with_http_client(http: reqwest::Client, options: ClientOptions) -> Self {
        Self {
            http,
            options,
            guest_token: None,
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The currently held guest credential, if any.
    pub fn guest_token(&self) -> Option<&str> {
        self.guest_token.as_deref()
    }

    /// Acquire a fresh guest credential.
    ///
    /// On success the new token replaces whatever was held. On failure the
    /// held token is left untouched.
    pub async fn activate(&mut self) -> LookupResult<String> {
        let response = self
            .http
            .post(&self.options.activate_url)
            .header(AUTHORIZATION, AUTHORIZATION_TOKEN)
            .header(USER_AGENT, &self.options.user_agent)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "guest activation request failed");
                UpstreamError::activation_error(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "guest activation rejected");
            return Err(UpstreamError::activation_failed(status));
        }

        let body: GuestTokenResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::activation_error(e.to_string()))?;

        info!("guest token activated");
        self.guest_token = Some(body.guest_token.clone());
        Ok(body.guest_token)
    }

    /// Look up one post and normalize it.
    pub async fn get_post_info(&mut self, id: &str) -> LookupResult<CanonicalPost> {
        let token = match self.guest_token.clone() {
            Some(token) => token,
            None => self.activate().await?,
        };

        let query = lookup_query(id).map_err(|e| UpstreamError::fetch_error(e.to_string()))?;

        let response = self.send_lookup(&query, &token).await?;
        let status = response.status();

        if status == StatusCode::FORBIDDEN {
            debug!(post_id = id, "guest token rejected, reactivating");
            let token = self.activate().await?;
            let retry = self.send_lookup(&query, &token).await?;
            let retry_status = retry.status();
            if !retry_status.is_success() {
                warn!(post_id = id, status = retry_status.as_u16(), "lookup failed after retry");
                return Err(UpstreamError::fetch_failed(retry_status, true));
            }
            return read_post(retry, id).await;
        }

        if !status.is_success() {
            warn!(post_id = id, status = status.as_u16(), "lookup failed");
            return Err(UpstreamError::fetch_failed(status, false));
        }

        read_post(response, id).await
    }

    async fn send_lookup(
        &self,
        query: &[(&'static str, String)],
        token: &str,
    ) -> LookupResult<Response> {
        self.http
            .get(&self.options.lookup_url)
            .query(query)
            .header(AUTHORIZATION, AUTHORIZATION_TOKEN)
            .header(USER_AGENT, &self.options.user_agent)
            .header(GUEST_TOKEN_HEADER, token)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "lookup request failed");
                UpstreamError::fetch_error(e.to_string())
            })
    }
}

async fn read_post(response: Response, id: &str) -> LookupResult<CanonicalPost> {
    let envelope: TweetResultEnvelope = response
        .json()
        .await
        .map_err(|e| UpstreamError::fetch_error(e.to_string()))?;
    let result = normalize(envelope, id);
    if let Err(ref e) = result {
        debug!(post_id = id, code = %e.code, "lookup resolved to an error");
    }
    result
}

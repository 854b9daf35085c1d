//! HTTP client for the JADX decompiler API.
//!
//! Every call targets `{base_url}/{endpoint}` with a fixed per-request
//! timeout. Typed results come from [`JadxClient::get`],
//! [`JadxClient::get_blocking`] and [`JadxClient::post`]; the
//! `fetch`/`fetch_blocking`/`submit` wrappers flatten failures into the
//! `"Error: ..."` string and never fail.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ClientError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Base URI with no trailing slash.
    pub base_url: String,
    /// Timeout applied to each request.
    pub timeout: Duration,
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: crate::config::normalize_base_url(&base_url.into()),
            timeout,
        }
    }
}

/// Client for one decompiler instance.
///
/// Cheap to clone; clones share the settings and the async connector.
/// Idle connections are not kept, so each request releases its connection
/// as soon as it completes.
#[derive(Debug, Clone)]
pub struct JadxClient {
    settings: Arc<ClientSettings>,
    http: reqwest::Client,
}

impl JadxClient {
    /// Create a client for the given settings.
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            settings: Arc::new(settings),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.settings.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.settings.timeout
    }

    /// Absolute URL of an endpoint.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.settings.base_url, endpoint)
    }

    /// GET an endpoint and return the response body as text.
    pub async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<String, ClientError> {
        let url = self.endpoint_url(endpoint);
        debug!(%url, ?query, "GET");

        let mut request = self.http.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await.map_err(ClientError::Transport)?;
        read_async(response, &url).await
    }

    /// POST a JSON body to an endpoint and return the response body as text.
    pub async fn post<T>(&self, endpoint: &str, body: Option<&T>) -> Result<String, ClientError>
    where
        T: Serialize + ?Sized,
    {
        let url = self.endpoint_url(endpoint);
        debug!(%url, "POST");

        let mut request = self.http.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(ClientError::Transport)?;
        read_async(response, &url).await
    }

    /// Blocking GET, for callers without an async runtime.
    ///
    /// A dedicated blocking client is built for the call and dropped with it.
    /// Must not be called from inside a tokio runtime.
    pub fn get_blocking(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<String, ClientError> {
        let url = self.endpoint_url(endpoint);
        debug!(%url, ?query, "GET (blocking)");

        let http = reqwest::blocking::Client::builder()
            .timeout(self.settings.timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(ClientError::Build)?;

        let mut request = http.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().map_err(ClientError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::status(status, url, &body));
        }
        response.text().map_err(ClientError::Body)
    }

    /// [`get`](Self::get) with failures rendered as `"Error: ..."`.
    pub async fn fetch(&self, endpoint: &str, query: &[(&str, &str)]) -> String {
        self.get(endpoint, query)
            .await
            .unwrap_or_else(|e| flatten(endpoint, e))
    }

    /// [`get_blocking`](Self::get_blocking) with failures rendered as `"Error: ..."`.
    pub fn fetch_blocking(&self, endpoint: &str, query: &[(&str, &str)]) -> String {
        self.get_blocking(endpoint, query)
            .unwrap_or_else(|e| flatten(endpoint, e))
    }

    /// [`post`](Self::post) with failures rendered as `"Error: ..."`.
    pub async fn submit<T>(&self, endpoint: &str, body: Option<&T>) -> String
    where
        T: Serialize + ?Sized,
    {
        self.post(endpoint, body)
            .await
            .unwrap_or_else(|e| flatten(endpoint, e))
    }
}

async fn read_async(response: reqwest::Response, url: &str) -> Result<String, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::status(status, url, &body));
    }
    response.text().await.map_err(ClientError::Body)
}

fn flatten(endpoint: &str, err: ClientError) -> String {
    warn!(endpoint, error = %err, "decompiler request failed");
    err.sentinel()
}

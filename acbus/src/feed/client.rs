//! URA instant-interface HTTP client.
//!
//! Issues plain GET requests and hands back the raw body text; decoding is
//! left to [`super::parse`].

use std::time::Duration;

use futures::future::BoxFuture;
use tracing::debug;

use crate::domain::StopId;

use super::FeedSource;
use super::error::FeedError;
use super::fields::{ARRIVAL_FIELDS, Field, FieldLayout, STOP_FIELDS, return_list};

/// Default endpoint: ASEAG real-time interface (Aachen).
const DEFAULT_BASE_URL: &str = "http://ivu.aseag.de/interfaces/ura/instant_V1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Longest body excerpt kept in a status error.
const ERROR_BODY_LIMIT: usize = 500;

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Base URL of the instant interface, without query string
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Fields requested for the stop list
    pub stop_fields: Vec<Field>,
    /// Fields requested for arrivals
    pub arrival_fields: Vec<Field>,
}

impl FeedConfig {
    /// Create a config pointing at the default endpoint.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            stop_fields: STOP_FIELDS.to_vec(),
            arrival_fields: ARRIVAL_FIELDS.to_vec(),
        }
    }

    /// Set a custom base URL (other agencies, or testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Request a different field list for the stop list.
    pub fn with_stop_fields(mut self, fields: &[Field]) -> Self {
        self.stop_fields = fields.to_vec();
        self
    }

    /// Request a different field list for arrivals.
    pub fn with_arrival_fields(mut self, fields: &[Field]) -> Self {
        self.arrival_fields = fields.to_vec();
        self
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client for the real-time feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    base_url: String,
    stop_fields: Vec<Field>,
    arrival_fields: Vec<Field>,
    stop_layout: FieldLayout,
    arrival_layout: FieldLayout,
}

impl FeedClient {
    /// Create a new feed client with the given configuration.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('?').to_string(),
            stop_layout: FieldLayout::new(&config.stop_fields),
            arrival_layout: FieldLayout::new(&config.arrival_fields),
            stop_fields: config.stop_fields,
            arrival_fields: config.arrival_fields,
        })
    }

    /// Base URL of the instant interface.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query parameters of the stop-list request.
    pub fn stops_query(&self) -> Vec<(&'static str, String)> {
        vec![("ReturnList", return_list(&self.stop_fields))]
    }

    /// Query parameters of the arrivals request for one stop.
    pub fn arrivals_query(&self, stop_id: &StopId) -> Vec<(&'static str, String)> {
        vec![
            ("ReturnList", return_list(&self.arrival_fields)),
            ("StopID", stop_id.to_string()),
        ]
    }

    /// GET the base URL with `query` and return the body text.
    pub async fn get_text(&self, query: &[(&str, String)]) -> Result<String, FeedError> {
        let request = self.http.get(&self.base_url).query(query).build()?;
        let url = request.url().to_string();
        debug!(url = %url, "sending feed request");

        let response = self.http.execute(request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Status {
                status: status.as_u16(),
                message: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_decode() || e.is_body() {
                FeedError::Malformed(e.to_string())
            } else {
                FeedError::Http(e)
            }
        })?;

        debug!(url = %url, bytes = body.len(), "feed response received");
        Ok(body)
    }
}

impl FeedSource for FeedClient {
    fn stop_layout(&self) -> &FieldLayout {
        &self.stop_layout
    }

    fn arrival_layout(&self) -> &FieldLayout {
        &self.arrival_layout
    }

    fn stops_body(&self) -> BoxFuture<'_, Result<String, FeedError>> {
        Box::pin(async move { self.get_text(&self.stops_query()).await })
    }

    fn arrivals_body<'a>(&'a self, stop_id: &'a StopId) -> BoxFuture<'a, Result<String, FeedError>> {
        Box::pin(async move { self.get_text(&self.arrivals_query(stop_id)).await })
    }
}

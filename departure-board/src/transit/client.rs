//! Transit API HTTP client.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::domain::{RouteId, TransitMode};
use crate::resolve::route_filter;

use super::api::TransitApi;
use super::error::TransportError;
use super::types::Document;

/// Default base URL for the transit API.
const DEFAULT_BASE_URL: &str = "https://api-v3.mbta.com";

/// Schedules are requested up to the end of the service day.
const MAX_TIME: &str = "24:00";

/// Related entities requested alongside schedules.
const SCHEDULE_INCLUDES: &str = "route,trip,stop,prediction";

/// Configuration for the transit client.
#[derive(Debug, Clone)]
pub struct TransitConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Optional API key, sent as `x-api-key`. Anonymous access works but is
    /// rate limited more aggressively.
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl TransitConfig {
    /// Create a config pointing at the production API, without a key.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Transit API client.
#[derive(Debug, Clone)]
pub struct TransitClient {
    http: reqwest::Client,
    base_url: String,
}

impl TransitClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TransitConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();

        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| TransportError::Config("invalid API key format".to_string()))?;
            headers.insert(HeaderName::from_static("x-api-key"), value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Build the request listing the routes of a mode.
    pub fn routes_request(&self, mode: TransitMode) -> Result<reqwest::Request, TransportError> {
        let request = self
            .http
            .get(format!("{}/routes", self.base_url))
            .query(&[("type", mode.route_type().to_string())])
            .build()?;
        Ok(request)
    }

    /// Build the request for schedules of the given routes.
    pub fn schedules_request(
        &self,
        route_ids: &[RouteId],
    ) -> Result<reqwest::Request, TransportError> {
        let request = self
            .http
            .get(format!("{}/schedules", self.base_url))
            .query(&[
                ("filter[route]", route_filter(route_ids)),
                ("filter[max_time]", MAX_TIME.to_string()),
                ("include", SCHEDULE_INCLUDES.to_string()),
            ])
            .build()?;
        Ok(request)
    }

    /// Send a request and decode the JSON:API document it returns.
    async fn execute(&self, request: reqwest::Request) -> Result<Document, TransportError> {
        debug!(url = %request.url(), "transit API request");

        let response = self.http.execute(request).await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(TransportError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TransportError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown").to_string()
            } else {
                body
            };
            return Err(TransportError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| TransportError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl TransitApi for TransitClient {
    async fn fetch_routes(&self, mode: TransitMode) -> Result<Document, TransportError> {
        let request = self.routes_request(mode)?;
        self.execute(request).await
    }

    async fn fetch_schedules(&self, route_ids: &[RouteId]) -> Result<Document, TransportError> {
        let request = self.schedules_request(route_ids)?;
        self.execute(request).await
    }
}

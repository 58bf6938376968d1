//! HTTP transport for the distribution API
//!
//! One [`ApiClient`] is built per pipeline run and reused across all API
//! calls. JSON requests go to the fixed API host; binary transfers go to the
//! server-issued one-time upload URL and are constructed by the uploader
//! directly on the same underlying client. Redirects are followed in both
//! modes and response bodies are only decoded as JSON when the content type
//! says so.

use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::error::DistributeError;

/// Base host of the distribution API
pub const API_BASE_URL: &str = "https://api.mobile.azure.com";

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("appcenter-distribute/", env!("CARGO_PKG_VERSION"));

/// Token header for API calls
pub(super) const API_TOKEN_HEADER: &str = "X-API-Token";

/// Token header for upload calls, legacy name retained by the wire protocol
pub(super) const UPLOAD_TOKEN_HEADER: &str = "X-HockeyAppToken";

/// HTTP client bound to one distribution API endpoint
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub(super) base_url: String,
    pub(super) http: reqwest::Client,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    /// Create a client against the production API host
    pub fn new() -> Self {
        Self::with_base_url(API_BASE_URL)
    }

    /// Create a client against a custom base URL, used by tests
    pub fn with_base_url(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST` a JSON body to a path under the API host
    pub(super) async fn post_json(
        &self,
        token: &SecretString,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ApiResponse, DistributeError> {
        let response = self
            .http
            .post(self.url(path))
            .header(API_TOKEN_HEADER, token.expose_secret())
            .json(body)
            .send()
            .await?;

        ApiResponse::read(response).await
    }

    /// `PATCH` a JSON body to a path under the API host
    pub(super) async fn patch_json(
        &self,
        token: &SecretString,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ApiResponse, DistributeError> {
        let response = self
            .http
            .patch(self.url(path))
            .header(API_TOKEN_HEADER, token.expose_secret())
            .json(body)
            .send()
            .await?;

        ApiResponse::read(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Fully read API response: status, raw body and whether it claims JSON
#[derive(Debug)]
pub(super) struct ApiResponse {
    pub(super) status: reqwest::StatusCode,
    body: String,
    json: bool,
}

impl ApiResponse {
    pub(super) async fn read(response: reqwest::Response) -> Result<Self, DistributeError> {
        let status = response.status();
        let json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(is_json_content_type)
            .unwrap_or(false);
        let body = response.text().await?;

        debug!(status = status.as_u16(), body = %body, "api response");

        Ok(Self { status, body, json })
    }

    pub(super) fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub(super) fn body(&self) -> &str {
        &self.body
    }

    /// Decode the body, requiring a JSON content type
    pub(super) fn json<T: DeserializeOwned>(&self, step: &str) -> Result<T, DistributeError> {
        if !self.json {
            return Err(DistributeError::Remote {
                step: step.to_string(),
                status: self.status.as_u16(),
                body: format!("expected a JSON response, got: {}", self.body),
            });
        }

        serde_json::from_str(&self.body).map_err(|e| DistributeError::Remote {
            step: step.to_string(),
            status: self.status.as_u16(),
            body: format!("malformed JSON response ({e}): {}", self.body),
        })
    }
}

/// Match the `json` content-type family: `application/json`, `text/json`,
/// suffixed types like `application/hal+json`, with optional parameters.
fn is_json_content_type(value: &str) -> bool {
    let essence = value.split(';').next().unwrap_or("").trim();
    match essence.rsplit_once('/') {
        Some((_, subtype)) => {
            subtype == "json" || subtype.ends_with("+json")
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_content_types() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("text/json"));
        assert!(is_json_content_type("application/hal+json"));
    }

    #[test]
    fn test_non_json_content_types() {
        assert!(!is_json_content_type("text/html"));
        assert!(!is_json_content_type("application/octet-stream"));
        assert!(!is_json_content_type("application/jsonp"));
        assert!(!is_json_content_type(""));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::with_base_url("https://example.test/");
        assert_eq!(client.base_url(), "https://example.test");
        assert_eq!(client.url("/v0.1/apps"), "https://example.test/v0.1/apps");
        assert_eq!(client.url("v0.1/apps"), "https://example.test/v0.1/apps");
    }

    #[test]
    fn test_default_points_at_production_host() {
        let client = ApiClient::new();
        assert_eq!(client.base_url(), API_BASE_URL);
    }
}

//! Resilient API client

use crate::config::ClientConfig;
use crate::errors::HttpError;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{ApiRequest, ApiResponse, HttpMethod};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value as JsonValue};
use std::str::FromStr;
use std::time::Duration;
use ticketload_resilience::{RetryExecutor, RetryPolicy};
use tracing::{debug, info, warn};

/// One simulated user's session against the backend
///
/// Owns the transport (and with it the connection pool), the bearer token
/// once `login` succeeds, and the headers sent with every request. Meant
/// to be used sequentially by a single user.
#[derive(Debug)]
pub struct ApiClient<T = ReqwestTransport> {
    base_url: String,
    auth_path: String,
    timeout: Duration,
    default_headers: HeaderMap,
    token: Option<String>,
    transport: T,
    retry: RetryExecutor,
}

impl ApiClient<ReqwestTransport> {
    /// Client with default settings for `base_url`
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        Self::with_config(ClientConfig::new(base_url))
    }

    /// Client with a pooled reqwest transport built from `config`
    pub fn with_config(config: ClientConfig) -> Result<Self, HttpError> {
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> ApiClient<T> {
    /// Client sending through any transport
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, HttpError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        debug!(
            "Creating ApiClient for {} with timeout: {}s, {} attempts per request",
            base_url,
            config.timeout.as_secs(),
            config.retry.total
        );

        Ok(Self {
            base_url,
            auth_path: config.auth_path,
            timeout: config.timeout,
            default_headers: HeaderMap::new(),
            token: None,
            transport,
            retry: RetryExecutor::new(config.retry),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The bearer token from the last successful login
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        self.retry.policy()
    }

    /// Absolute URL for `endpoint`
    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.is_empty() || endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// Add or replace a header sent with every request
    pub fn set_default_header(&mut self, name: &str, value: &str) -> Result<(), HttpError> {
        let header_name =
            HeaderName::from_str(name).map_err(|_| HttpError::InvalidHeaderName(name.to_string()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| HttpError::InvalidHeaderValue(name.to_string()))?;
        self.default_headers.insert(header_name, header_value);
        Ok(())
    }

    /// Authenticate and cache the bearer token
    ///
    /// Returns `Ok(false)` for any status other than 200 and for a body
    /// without a usable `token`; the session is left untouched in that case.
    /// Only network failures that outlast the retry policy are errors.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<bool, HttpError> {
        let credentials = json!({
            "email": username,
            "password": password,
        });

        info!("Logging in as {}", username);
        let response = self
            .send(HttpMethod::Post, &self.auth_path, &[], Some(&credentials))
            .await?;

        if response.status() != 200 {
            warn!("Login for {} failed with status {}", username, response.status());
            return Ok(false);
        }

        let Some(token) = extract_token(&response) else {
            warn!("Login for {} returned 200 without a usable token", username);
            return Ok(false);
        };

        let Ok(mut bearer) = HeaderValue::from_str(&format!("Bearer {}", token)) else {
            warn!("Login for {} returned a token that is not a valid header value", username);
            return Ok(false);
        };
        bearer.set_sensitive(true);

        self.default_headers.insert(AUTHORIZATION, bearer);
        self.default_headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.token = Some(token);

        info!("Login for {} succeeded", username);
        Ok(true)
    }

    /// Drop the cached token and the headers login injected
    pub fn logout(&mut self) {
        self.token = None;
        self.default_headers.remove(AUTHORIZATION);
        self.default_headers.remove(CONTENT_TYPE);
        debug!("Session for {} logged out", self.base_url);
    }

    pub async fn get(
        &self,
        endpoint: &str,
        params: Option<&[(&str, &str)]>,
    ) -> Result<ApiResponse, HttpError> {
        self.send(HttpMethod::Get, endpoint, params.unwrap_or_default(), None)
            .await
    }

    pub async fn post(
        &self,
        endpoint: &str,
        body: Option<&JsonValue>,
    ) -> Result<ApiResponse, HttpError> {
        self.send(HttpMethod::Post, endpoint, &[], body).await
    }

    pub async fn put(
        &self,
        endpoint: &str,
        body: Option<&JsonValue>,
    ) -> Result<ApiResponse, HttpError> {
        self.send(HttpMethod::Put, endpoint, &[], body).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<ApiResponse, HttpError> {
        self.send(HttpMethod::Delete, endpoint, &[], None).await
    }

    /// Issue a request under the retry policy and return the raw response
    ///
    /// HTTP error statuses come back as `Ok`; interpreting them is up to
    /// the caller.
    pub async fn send(
        &self,
        method: HttpMethod,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<&JsonValue>,
    ) -> Result<ApiResponse, HttpError> {
        let request = ApiRequest {
            method,
            url: self.url_for(endpoint),
            headers: self.default_headers.clone(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.cloned(),
            timeout: self.timeout,
        };

        debug!("Sending {} {}", method, request.url);
        let response = self
            .retry
            .execute(method.as_str(), || self.transport.send(request.clone()))
            .await?;

        info!(
            "{} {} -> {}",
            method,
            request.url,
            response.status()
        );
        Ok(response)
    }
}

/// Non-empty string `token` field of a JSON body
fn extract_token(response: &ApiResponse) -> Option<String> {
    let body: JsonValue = response.json().ok()?;
    body.get("token")
        .and_then(JsonValue::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    fn client(base_url: &str) -> ApiClient<MockTransport> {
        ApiClient::with_transport(ClientConfig::new(base_url), MockTransport::new()).unwrap()
    }

    #[test]
    fn test_url_resolution() {
        for base in ["https://host", "https://host/", "https://host//"] {
            let client = client(base);
            assert_eq!(client.url_for("/api/tickets"), "https://host/api/tickets");
        }

        let client = client("https://host");
        assert_eq!(client.url_for("api/tickets"), "https://host/api/tickets");
        assert_eq!(client.url_for(""), "https://host");
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let client = client("https://host/backend/");
        assert_eq!(
            client.url_for("/api/tickets/mis-tickets"),
            "https://host/backend/api/tickets/mis-tickets"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ApiClient::with_transport(ClientConfig::new("not a url"), MockTransport::new());
        assert!(matches!(result, Err(HttpError::InvalidUrl(_))));
    }

    #[test]
    fn test_new_session_is_unauthenticated() {
        let client = client("https://host");
        assert!(!client.is_authenticated());
        assert!(client.token().is_none());
        assert!(client.default_headers().is_empty());
    }

    #[test]
    fn test_set_default_header() {
        let mut client = client("https://host");
        client.set_default_header("X-Load-Test", "locust").unwrap();
        assert_eq!(client.default_headers()["x-load-test"], "locust");

        assert!(matches!(
            client.set_default_header("bad header", "x"),
            Err(HttpError::InvalidHeaderName(_))
        ));
    }

    #[test]
    fn test_extract_token() {
        let ok = ApiResponse::from_json(200, &json!({"token": "abc", "tipo": "Bearer"}));
        assert_eq!(extract_token(&ok).as_deref(), Some("abc"));

        let empty = ApiResponse::from_json(200, &json!({"token": ""}));
        assert!(extract_token(&empty).is_none());

        let numeric = ApiResponse::from_json(200, &json!({"token": 12}));
        assert!(extract_token(&numeric).is_none());

        let html = ApiResponse::from_text(200, "<html>login</html>");
        assert!(extract_token(&html).is_none());
    }
}

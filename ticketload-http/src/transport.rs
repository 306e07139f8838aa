//! Transports: the seam between the client and the wire

use crate::config::ClientConfig;
use crate::errors::{HttpError, TransportError};
use crate::types::{ApiRequest, ApiResponse};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, trace};

/// Send one request, get status, headers and body back
///
/// Implementations perform a single attempt; retrying is the client's job.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Transport backed by a persistent `reqwest` connection pool
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build the pooled client from configuration
    pub fn new(config: &ClientConfig) -> Result<Self, HttpError> {
        debug!(
            "Creating HTTP transport with {}s connect timeout, {} idle connections per host",
            config.connection_timeout.as_secs(),
            config.max_idle_per_host
        );

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .redirect(reqwest::redirect::Policy::limited(
                config.max_redirects as usize,
            ))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(config.idle_timeout)
            .connect_timeout(config.connection_timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let ApiRequest {
            method,
            url,
            headers,
            query,
            body,
            timeout,
        } = request;

        let mut builder = self
            .client
            .request(reqwest::Method::from(method), &url)
            .headers(headers)
            .timeout(timeout);

        if !query.is_empty() {
            builder = builder.query(&query);
        }

        if let Some(ref body) = body {
            trace!("Adding JSON body to {} {}", method, url);
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(ApiResponse::new(status, headers, body))
    }
}

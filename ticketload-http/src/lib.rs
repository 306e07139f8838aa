//! Resilient API client for ticketload
//!
//! Each simulated user owns one [`ApiClient`]: a pooled HTTP session that
//! logs in once, attaches the bearer token to every later request, and
//! retries transient failures according to a [`RetryPolicy`]. Responses are
//! handed back raw; deciding whether a 403 is a failure or the expected
//! outcome of a probe is the caller's business.
//!
//! ```no_run
//! use ticketload_http::{ApiClient, ClientConfig};
//!
//! # async fn run() -> Result<(), ticketload_http::HttpError> {
//! let mut client = ApiClient::with_config(ClientConfig::new("http://localhost:8080"))?;
//! if client.login("admin@example.com", "secret").await? {
//!     let tickets = client.get("/api/tickets/mis-tickets", None).await?;
//!     println!("{}", tickets.status());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod mock;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::ApiClient;
pub use config::ClientConfig;
pub use errors::{HttpError, TransportError};
pub use mock::MockTransport;
pub use transport::{ReqwestTransport, Transport};
pub use types::{ApiRequest, ApiResponse, HttpMethod, HttpMethodError};

pub use ticketload_resilience::RetryPolicy;

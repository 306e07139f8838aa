//! Scripted transport for tests and dry runs

use crate::errors::TransportError;
use crate::transport::Transport;
use crate::types::{ApiRequest, ApiResponse, HttpMethod};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Transport that answers from a script instead of the network
///
/// Lookup order for each request: a route registered for its method and
/// URL, then the next scripted outcome, then the fallback response.
/// Every request is recorded. Clones share the same script and log.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    routes: HashMap<String, ApiResponse>,
    script: VecDeque<Result<ApiResponse, TransportError>>,
    fallback: Option<ApiResponse>,
    requests: Vec<ApiRequest>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next unrouted request
    pub fn push_response(&self, response: ApiResponse) -> &Self {
        self.state.lock().script.push_back(Ok(response));
        self
    }

    /// Queue a transport failure for the next unrouted request
    pub fn push_error(&self, error: TransportError) -> &Self {
        self.state.lock().script.push_back(Err(error));
        self
    }

    /// Answer every request to `method url` with `response`
    pub fn add_route(&self, method: HttpMethod, url: &str, response: ApiResponse) -> &Self {
        let key = format!("{}:{}", method.as_str(), url);
        debug!("Added mock route for {} {}", method, url);
        self.state.lock().routes.insert(key, response);
        self
    }

    /// Response used once the script is exhausted
    pub fn respond_with(&self, response: ApiResponse) -> &Self {
        self.state.lock().fallback = Some(response);
        self
    }

    /// Every request seen so far, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.state.lock().requests.last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    /// Forget recorded requests, keeping the script
    pub fn clear_requests(&self) {
        self.state.lock().requests.clear();
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut state = self.state.lock();
        let key = format!("{}:{}", request.method.as_str(), request.url);
        let description = format!("{} {}", request.method, request.url);
        state.requests.push(request);

        if let Some(response) = state.routes.get(&key) {
            return Ok(response.clone());
        }

        if let Some(outcome) = state.script.pop_front() {
            return outcome;
        }

        state.fallback.clone().ok_or_else(|| {
            TransportError::Invalid(format!("No mock response available for {}", description))
        })
    }
}

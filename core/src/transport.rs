//! The transport boundary and its ureq-backed implementation.
//!
//! # Design
//! The dispatcher needs one capability from the network: execute an
//! [`HttpRequest`] and hand back an [`HttpResponse`]. [`Transport`] is that
//! capability, so tests can substitute canned responses and callers can bring
//! their own client.
//!
//! [`UreqTransport`] reads the body to the end (bounded by
//! `max_response_bytes`) before returning. The connection is released on
//! every path, including when the caller later fails to decode the body.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes finalized requests.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Configuration for [`UreqTransport`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Overall deadline per request. A request's own timeout takes precedence.
    pub timeout: Option<Duration>,
    /// User agent string for requests.
    pub user_agent: String,
    /// Largest response body that will be read.
    pub max_response_bytes: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            user_agent: concat!("formfetch/", env!("CARGO_PKG_VERSION")).to_string(),
            max_response_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Blocking HTTP transport built on `ureq`.
///
/// Non-2xx statuses come back as data, not errors, so the dispatcher can still
/// decode their bodies. Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    max_response_bytes: u64,
}

impl UreqTransport {
    pub fn new(config: TransportConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .new_agent();

        Self {
            agent,
            max_response_bytes: config.max_response_bytes,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let body = request.body.as_bytes();
        let fail = |e: ureq::Error| TransportError::new(url, e);

        let result = match request.method {
            HttpMethod::Post => prepare(self.agent.post(url), request).send(body),
            HttpMethod::Put => prepare(self.agent.put(url), request).send(body),
            HttpMethod::Patch => prepare(self.agent.patch(url), request).send(body),
            method => {
                let builder = match method {
                    HttpMethod::Head => self.agent.head(url),
                    HttpMethod::Delete => self.agent.delete(url),
                    HttpMethod::Options => self.agent.options(url),
                    _ => self.agent.get(url),
                };
                let builder = prepare(builder, request);
                if body.is_empty() {
                    builder.call()
                } else {
                    builder.force_send_body().send(body)
                }
            }
        };

        let mut response = result.map_err(fail)?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(self.max_response_bytes)
            .read_to_string()
            .map_err(fail)?;

        debug!(status = status.as_u16(), bytes = body.len(), "response received");

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn prepare<B>(mut builder: ureq::RequestBuilder<B>, request: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (key, value) in &request.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    if let Some(timeout) = request.timeout {
        builder = builder.config().timeout_global(Some(timeout)).build();
    }
    builder
}

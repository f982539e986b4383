//! HTTP requests and responses as plain data, and the transport that moves
//! them.
//!
//! # Design
//! `HttpJsonClient` builds an `HttpRequest`, hands it to a [`Transport`], and
//! classifies whatever comes back. The transport is the only piece that
//! touches the network, so tests swap it for a scripted one and the
//! classification stays a pure function.

use crate::error::TransportError;

/// A GET request with its query string already encoded into `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// A response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// Executes one request.
///
/// `Ok(None)` means the exchange finished without a transport error but
/// also without a response.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<Option<HttpResponse>, TransportError>;
}

/// Blocking transport backed by a `ureq` agent.
///
/// The agent does not turn 4xx/5xx into errors; status interpretation is
/// left to the client.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<Option<HttpResponse>, TransportError> {
        let mut builder = self.agent.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder
            .call()
            .map_err(|e| TransportError::with_source("request failed", e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::with_source("failed to read response body", e))?;

        Ok(Some(HttpResponse {
            status,
            headers,
            body,
        }))
    }
}

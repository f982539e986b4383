//! Error types for the places client.
//!
//! # Design
//! One enum covers every way a search or a details lookup can fail, ordered
//! the way `HttpJsonClient` classifies a response: transport, missing
//! response, HTTP status, body syntax, API status. `EmptyQuery` and `Mapping`
//! are raised above the client by the search service and the details
//! resolver.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Errors delivered to search and details completions.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// `search` was called with an empty string. No request was made.
    #[error("no search string given")]
    EmptyQuery,

    /// The request never produced a response: DNS, connect, TLS, I/O.
    #[error("transport failure: {0}")]
    Transport(#[source] TransportError),

    /// The transport finished without an error but also without a response.
    #[error("no response from API")]
    NoResponse,

    /// The server answered with something other than 200.
    #[error("invalid status code {0} from API")]
    HttpStatus(u16),

    /// The body was not a JSON object.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The body carried a `status` other than `"OK"`.
    #[error("API returned status {status}")]
    ApiStatus {
        status: String,
        /// The API's `error_message` field, when it sent one.
        message: Option<String>,
    },

    /// The body was valid JSON but did not have the expected fields.
    #[error("malformed response: {0}")]
    Mapping(String),
}

/// Fieldless discriminant of [`PlacesError`], stable across the FFI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyQuery,
    Transport,
    NoResponse,
    HttpStatus,
    Serialization,
    ApiStatus,
    Mapping,
}

impl PlacesError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlacesError::EmptyQuery => ErrorKind::EmptyQuery,
            PlacesError::Transport(_) => ErrorKind::Transport,
            PlacesError::NoResponse => ErrorKind::NoResponse,
            PlacesError::HttpStatus(_) => ErrorKind::HttpStatus,
            PlacesError::Serialization(_) => ErrorKind::Serialization,
            PlacesError::ApiStatus { .. } => ErrorKind::ApiStatus,
            PlacesError::Mapping(_) => ErrorKind::Mapping,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::EmptyQuery => "empty_query",
            ErrorKind::Transport => "transport",
            ErrorKind::NoResponse => "no_response",
            ErrorKind::HttpStatus => "http_status",
            ErrorKind::Serialization => "serialization",
            ErrorKind::ApiStatus => "api_status",
            ErrorKind::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

/// A failure below HTTP, with the underlying cause kept as `source()`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<TransportError> for PlacesError {
    fn from(err: TransportError) -> Self {
        PlacesError::Transport(err)
    }
}

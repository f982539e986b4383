//! Address autocomplete core for a places-search API.
//!
//! # Overview
//! Turns free text into autocomplete requests, maps the predictions to
//! [`Place`] values, and resolves a selected place to [`PlaceDetails`] with a
//! circular region derived from its viewport. Rendering, focus and keyboard
//! handling belong to the host UI, which drives an [`AutocompleteSession`]
//! and drains a [`CallbackLoop`] on its main thread.
//!
//! # Design
//! - Requests are built and classified as plain data (`build_request`,
//!   `classify`); only the [`Transport`] touches the network.
//! - Every completion runs on the callback loop, whichever thread did the I/O.
//! - Searches are sequenced: a response to a superseded search is dropped.
//! - Response bodies are validated against typed envelopes; anything missing
//!   or mistyped becomes [`PlacesError::Mapping`].

pub mod activity;
pub mod client;
pub mod config;
pub mod details;
pub mod dispatch;
pub mod encode;
pub mod error;
pub mod http;
pub mod search;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use activity::{ActivityGuard, NetworkActivity};
pub use client::{classify, HttpJsonClient, JsonObject};
pub use config::{Endpoints, SearchConfiguration};
pub use details::{parse_details, PlaceDetailsResolver};
pub use dispatch::{callback_context, CallbackContext, CallbackLoop};
pub use encode::{encode_query, encode_query_from, escape, QueryParams};
pub use error::{ErrorKind, PlacesError, TransportError};
pub use http::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use search::{parse_predictions, PlaceSearchService};
pub use session::{AutocompleteSession, SessionEvent};
pub use types::{
    CircularRegion, Coordinate, LocationBias, Place, PlaceDetails, PlaceType,
    DEFAULT_BIAS_RADIUS_METERS, DEFAULT_REGION_RADIUS_METERS,
};

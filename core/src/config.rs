//! Session configuration and endpoint URLs.

use crate::types::{LocationBias, PlaceType};

pub const DEFAULT_AUTOCOMPLETE_URL: &str =
    "https://maps.googleapis.com/maps/api/place/autocomplete/json";
pub const DEFAULT_DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";

const AUTOCOMPLETE_PATH: &str = "/maps/api/place/autocomplete/json";
const DETAILS_PATH: &str = "/maps/api/place/details/json";

/// Per-session search state, mutable for the life of the UI flow.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfiguration {
    pub api_key: String,
    pub place_type: PlaceType,
    pub location_bias: Option<LocationBias>,
    /// ISO 3166-1 alpha-2 code sent as `components=country:<code>`.
    pub country: Option<String>,
}

impl SearchConfiguration {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            place_type: PlaceType::All,
            location_bias: None,
            country: None,
        }
    }

    pub fn with_place_type(mut self, place_type: PlaceType) -> Self {
        self.place_type = place_type;
        self
    }

    pub fn with_location_bias(mut self, bias: LocationBias) -> Self {
        self.location_bias = Some(bias);
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

/// Where the autocomplete and details requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub autocomplete: String,
    pub details: String,
}

impl Endpoints {
    /// Both endpoints on another host, keeping the standard paths.
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            autocomplete: format!("{base}{AUTOCOMPLETE_PATH}"),
            details: format!("{base}{DETAILS_PATH}"),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            autocomplete: DEFAULT_AUTOCOMPLETE_URL.to_string(),
            details: DEFAULT_DETAILS_URL.to_string(),
        }
    }
}

//! In-memory imitation of the places autocomplete and details endpoints.
//!
//! Serves the same paths and JSON shapes as the remote API from a small
//! fixture. Two fault inputs exist for client tests: `input=__http_500`
//! answers HTTP 500 with a valid JSON body, and `input=__malformed` answers
//! 200 with a body that is not JSON.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

pub const DEFAULT_API_KEY: &str = "test-key";

pub const AUTOCOMPLETE_PATH: &str = "/maps/api/place/autocomplete/json";
pub const DETAILS_PATH: &str = "/maps/api/place/details/json";

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub northeast: LatLng,
    pub southwest: LatLng,
}

/// One place the mock knows about.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FixturePlace {
    pub place_id: String,
    pub name: String,
    pub description: String,
    pub location: LatLng,
    pub viewport: Option<Viewport>,
    /// Type tags matched against the `types` filter, without parentheses.
    pub types: Vec<String>,
    /// Lowercase ISO 3166-1 alpha-2 code.
    pub country: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Prediction {
    pub place_id: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub predictions: Vec<Prediction>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetailsResult {
    pub place_id: String,
    pub name: String,
    pub formatted_address: String,
    pub geometry: Geometry,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetailsResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DetailsResult>,
}

#[derive(Clone)]
pub struct MockState {
    api_key: String,
    places: Arc<Vec<FixturePlace>>,
}

impl MockState {
    pub fn new(api_key: impl Into<String>, places: Vec<FixturePlace>) -> Self {
        Self {
            api_key: api_key.into(),
            places: Arc::new(places),
        }
    }

    pub fn with_fixture(api_key: impl Into<String>) -> Self {
        Self::new(api_key, fixture())
    }

    fn check_key(&self, params: &HashMap<String, String>) -> Result<(), String> {
        match params.get("key") {
            None => Err("You must use an API key to authenticate each request.".to_string()),
            Some(key) if *key != self.api_key => {
                Err("The provided API key is invalid.".to_string())
            }
            Some(_) => Ok(()),
        }
    }
}

fn place(
    place_id: &str,
    name: &str,
    description: &str,
    location: (f64, f64),
    viewport: Option<((f64, f64), (f64, f64))>,
    types: &[&str],
    country: &str,
) -> FixturePlace {
    let point = |(lat, lng): (f64, f64)| LatLng { lat, lng };
    FixturePlace {
        place_id: place_id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        location: point(location),
        viewport: viewport.map(|(ne, sw)| Viewport {
            northeast: point(ne),
            southwest: point(sw),
        }),
        types: types.iter().map(|t| t.to_string()).collect(),
        country: country.to_string(),
    }
}

/// The built-in fixture.
pub fn fixture() -> Vec<FixturePlace> {
    vec![
        place(
            "p-1-main-st",
            "1 Main St",
            "1 Main St, Springfield, IL, USA",
            (39.8017, -89.6437),
            None,
            &["street_address", "address", "geocode"],
            "us",
        ),
        place(
            "p-main-plaza",
            "Main Plaza",
            "Main Plaza, San Antonio, TX, USA",
            (29.4246, -98.4951),
            Some(((29.4260, -98.4937), (29.4232, -98.4965))),
            &["establishment", "point_of_interest"],
            "us",
        ),
        place(
            "p-mainz",
            "Mainz",
            "Mainz, Germany",
            (49.9929, 8.2473),
            Some(((50.0353, 8.3434), (49.8997, 8.1432))),
            &["locality", "political", "geocode", "cities", "regions"],
            "de",
        ),
        place(
            "p-paris",
            "Paris",
            "Paris, France",
            (48.8566, 2.3522),
            Some(((48.9022, 2.4699), (48.8156, 2.2241))),
            &["locality", "political", "geocode", "cities", "regions"],
            "fr",
        ),
        place(
            "p-springfield",
            "Springfield",
            "Springfield, IL, USA",
            (39.7817, -89.6501),
            Some(((39.8643, -89.5641), (39.6694, -89.7734))),
            &["locality", "political", "geocode", "cities", "regions"],
            "us",
        ),
    ]
}

pub fn app() -> Router {
    app_with(MockState::with_fixture(DEFAULT_API_KEY))
}

pub fn app_with(state: MockState) -> Router {
    Router::new()
        .route(AUTOCOMPLETE_PATH, get(autocomplete))
        .route(DETAILS_PATH, get(details))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(state)).await
}

fn autocomplete_status(status: &str, error_message: Option<String>) -> Response {
    Json(AutocompleteResponse {
        status: status.to_string(),
        error_message,
        predictions: Vec::new(),
    })
    .into_response()
}

fn details_status(status: &str, error_message: Option<String>) -> Response {
    Json(DetailsResponse {
        status: status.to_string(),
        error_message,
        result: None,
    })
    .into_response()
}

async fn autocomplete(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let input = params.get("input").map(String::as_str).unwrap_or("");
    log::debug!("autocomplete input={input:?}");

    match input {
        "__http_500" => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AutocompleteResponse {
                    status: "OK".to_string(),
                    error_message: None,
                    predictions: Vec::new(),
                }),
            )
                .into_response();
        }
        "__malformed" => return (StatusCode::OK, "<html>not json</html>").into_response(),
        _ => {}
    }

    if let Err(message) = state.check_key(&params) {
        return autocomplete_status("REQUEST_DENIED", Some(message));
    }
    if input.is_empty() {
        return autocomplete_status("INVALID_REQUEST", Some("Missing input parameter.".to_string()));
    }

    let needle = input.to_lowercase();
    let type_filter = params
        .get("types")
        .map(|t| t.trim_start_matches('(').trim_end_matches(')').to_string())
        .unwrap_or_default();
    let countries: Vec<String> = params
        .get("components")
        .map(|c| {
            c.split('|')
                .filter_map(|part| part.strip_prefix("country:"))
                .map(str::to_lowercase)
                .collect()
        })
        .unwrap_or_default();

    let mut matches: Vec<&FixturePlace> = state
        .places
        .iter()
        .filter(|p| p.description.to_lowercase().contains(&needle))
        .filter(|p| type_filter.is_empty() || p.types.iter().any(|t| *t == type_filter))
        .filter(|p| countries.is_empty() || countries.contains(&p.country))
        .collect();

    if let Some(origin) = params.get("location").and_then(|l| parse_location(l)) {
        matches.sort_by(|a, b| {
            squared_offset(origin, a.location).total_cmp(&squared_offset(origin, b.location))
        });
    }

    if matches.is_empty() {
        return autocomplete_status("ZERO_RESULTS", None);
    }

    Json(AutocompleteResponse {
        status: "OK".to_string(),
        error_message: None,
        predictions: matches
            .into_iter()
            .map(|p| Prediction {
                place_id: p.place_id.clone(),
                description: p.description.clone(),
            })
            .collect(),
    })
    .into_response()
}

async fn details(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(message) = state.check_key(&params) {
        return details_status("REQUEST_DENIED", Some(message));
    }
    let Some(place_id) = params.get("placeid").filter(|id| !id.is_empty()) else {
        return details_status("INVALID_REQUEST", Some("Missing placeid parameter.".to_string()));
    };
    log::debug!("details placeid={place_id}");

    let Some(place) = state.places.iter().find(|p| p.place_id == *place_id) else {
        return details_status("NOT_FOUND", None);
    };

    Json(DetailsResponse {
        status: "OK".to_string(),
        error_message: None,
        result: Some(DetailsResult {
            place_id: place.place_id.clone(),
            name: place.name.clone(),
            formatted_address: place.description.clone(),
            geometry: Geometry {
                location: place.location,
                viewport: place.viewport,
            },
        }),
    })
    .into_response()
}

fn parse_location(s: &str) -> Option<LatLng> {
    let (lat, lng) = s.split_once(',')?;
    Some(LatLng {
        lat: lat.trim().parse().ok()?,
        lng: lng.trim().parse().ok()?,
    })
}

fn squared_offset(a: LatLng, b: LatLng) -> f64 {
    (a.lat - b.lat).powi(2) + (a.lng - b.lng).powi(2)
}

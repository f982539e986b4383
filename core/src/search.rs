//! Autocomplete search.
//!
//! # Design
//! Each call to `search` takes the next number from a monotonic sequence.
//! When a response arrives after a newer search has been issued it is
//! discarded: the current list keeps whatever the newest search produces,
//! and the superseded caller is not called back. Only successful searches
//! replace the list; request failures leave it untouched. An empty query
//! empties it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Deserialize;

use crate::client::{HttpJsonClient, JsonObject};
use crate::config::{Endpoints, SearchConfiguration};
use crate::encode::QueryParams;
use crate::error::PlacesError;
use crate::types::{LocationBias, Place, PlaceType};

#[derive(Deserialize)]
struct AutocompleteBody {
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    place_id: String,
    description: String,
}

pub struct PlaceSearchService {
    config: SearchConfiguration,
    endpoint: String,
    client: HttpJsonClient,
    places: Arc<Mutex<Vec<Place>>>,
    latest: Arc<AtomicU64>,
}

impl PlaceSearchService {
    pub fn new(config: SearchConfiguration, endpoints: &Endpoints, client: HttpJsonClient) -> Self {
        Self {
            config,
            endpoint: endpoints.autocomplete.clone(),
            client,
            places: Arc::new(Mutex::new(Vec::new())),
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &SearchConfiguration {
        &self.config
    }

    pub fn set_place_type(&mut self, place_type: PlaceType) {
        self.config.place_type = place_type;
    }

    pub fn set_location_bias(&mut self, bias: Option<LocationBias>) {
        self.config.location_bias = bias;
    }

    pub fn set_country(&mut self, country: Option<String>) {
        self.config.country = country;
    }

    /// The list from the most recent successful search.
    pub fn places(&self) -> Vec<Place> {
        self.places
            .lock()
            .map(|places| places.clone())
            .unwrap_or_default()
    }

    /// Empty the current list and ignore searches still in flight.
    pub fn clear(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut places) = self.places.lock() {
            places.clear();
        }
    }

    pub fn build_params(&self, text: &str) -> QueryParams {
        let mut params = QueryParams::new();
        params.insert("input".to_string(), text.to_string());
        params.insert(
            "types".to_string(),
            self.config.place_type.filter_token().to_string(),
        );
        params.insert("key".to_string(), self.config.api_key.clone());

        if let Some(bias) = &self.config.location_bias {
            params.insert("location".to_string(), bias.location_param());
            params.insert("radius".to_string(), bias.radius_param());
        }
        if let Some(country) = &self.config.country {
            params.insert("components".to_string(), format!("country:{country}"));
        }
        params
    }

    /// Look up predictions for `text`. `completion` runs on the callback loop.
    ///
    /// An empty `text` empties the current list and fails with
    /// [`PlacesError::EmptyQuery`] without any I/O.
    pub fn search<F>(&self, text: &str, completion: F)
    where
        F: FnOnce(Result<Vec<Place>, PlacesError>) + Send + 'static,
    {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        if text.is_empty() {
            if let Ok(mut places) = self.places.lock() {
                places.clear();
            }
            self.client
                .callbacks()
                .dispatch(move || completion(Err(PlacesError::EmptyQuery)));
            return;
        }

        let params = self.build_params(text);
        let places = Arc::clone(&self.places);
        let latest = Arc::clone(&self.latest);
        let api_key = self.config.api_key.clone();

        self.client.request(&self.endpoint, params, move |result| {
            if latest.load(Ordering::SeqCst) != seq {
                log::debug!("discarding stale autocomplete response #{seq}");
                return;
            }

            let result = result.and_then(|json| parse_predictions(json, &api_key));
            match &result {
                Ok(found) => {
                    if let Ok(mut current) = places.lock() {
                        current.clone_from(found);
                    }
                }
                Err(PlacesError::Mapping(msg)) => {
                    log::warn!("unexpected autocomplete response: {msg}");
                }
                Err(_) => {}
            }
            completion(result);
        });
    }
}

/// Map an autocomplete body to places. One bad prediction fails the batch.
pub fn parse_predictions(json: JsonObject, api_key: &str) -> Result<Vec<Place>, PlacesError> {
    let body: AutocompleteBody = serde_json::from_value(serde_json::Value::Object(json))
        .map_err(|e| PlacesError::Mapping(format!("autocomplete: {e}")))?;

    Ok(body
        .predictions
        .into_iter()
        .map(|p| Place::new(p.place_id, p.description).with_api_key(api_key))
        .collect())
}

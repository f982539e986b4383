//! Place details lookup and region derivation.
//!
//! The region is a circle centered on the place's location. Its radius is
//! the distance from the center to the viewport's north-east corner, which
//! treats the viewport box as if it were round. Without a viewport the
//! radius is [`DEFAULT_REGION_RADIUS_METERS`].

use serde::Deserialize;

use crate::client::{HttpJsonClient, JsonObject};
use crate::config::Endpoints;
use crate::encode::QueryParams;
use crate::error::PlacesError;
use crate::types::{CircularRegion, Coordinate, Place, PlaceDetails, DEFAULT_REGION_RADIUS_METERS};

#[derive(Deserialize)]
struct DetailsBody {
    result: DetailsResult,
}

#[derive(Deserialize)]
struct DetailsResult {
    name: String,
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
    viewport: Option<Viewport>,
}

#[derive(Deserialize)]
struct Viewport {
    northeast: LatLng,
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<LatLng> for Coordinate {
    fn from(p: LatLng) -> Self {
        Coordinate::new(p.lat, p.lng)
    }
}

pub struct PlaceDetailsResolver {
    endpoint: String,
    client: HttpJsonClient,
}

impl PlaceDetailsResolver {
    pub fn new(endpoints: &Endpoints, client: HttpJsonClient) -> Self {
        Self {
            endpoint: endpoints.details.clone(),
            client,
        }
    }

    /// A place without a key still sends `key=`; the server rejects it.
    pub fn build_params(place: &Place) -> QueryParams {
        let mut params = QueryParams::new();
        params.insert("placeid".to_string(), place.id.clone());
        params.insert(
            "key".to_string(),
            place.api_key.clone().unwrap_or_default(),
        );
        params
    }

    /// Fetch details for `place`. `completion` runs on the callback loop with
    /// the details or the reason they could not be produced.
    pub fn resolve<F>(&self, place: &Place, completion: F)
    where
        F: FnOnce(Result<PlaceDetails, PlacesError>) + Send + 'static,
    {
        let params = Self::build_params(place);
        let place_id = place.id.clone();

        self.client.request(&self.endpoint, params, move |result| {
            let result = result.and_then(parse_details);
            if let Err(err) = &result {
                log::warn!("error fetching place details for {place_id}: {err}");
            }
            completion(result);
        });
    }
}

pub fn parse_details(json: JsonObject) -> Result<PlaceDetails, PlacesError> {
    let body: DetailsBody = serde_json::from_value(serde_json::Value::Object(json))
        .map_err(|e| PlacesError::Mapping(format!("details: {e}")))?;

    let DetailsResult { name, geometry } = body.result;
    let center = Coordinate::from(geometry.location);
    let radius_meters = match geometry.viewport {
        Some(viewport) => center.distance_to(&viewport.northeast.into()),
        None => DEFAULT_REGION_RADIUS_METERS,
    };

    Ok(PlaceDetails {
        latitude: center.latitude,
        longitude: center.longitude,
        region: CircularRegion {
            center,
            radius_meters,
            identifier: name.clone(),
        },
        name,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use serde_json::{json, Value};

    use super::*;
    use crate::activity::NetworkActivity;
    use crate::dispatch::callback_context;
    use crate::error::TransportError;
    use crate::testing::ScriptedTransport;

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn params_use_place_id_and_key() {
        let place = Place::new("p1", "1 Main St").with_api_key("k");
        let params = PlaceDetailsResolver::build_params(&place);
        assert_eq!(params["placeid"], "p1");
        assert_eq!(params["key"], "k");
    }

    #[test]
    fn missing_key_sends_empty_key() {
        let params = PlaceDetailsResolver::build_params(&Place::new("p1", "x"));
        assert_eq!(params["key"], "");
    }

    #[test]
    fn radius_is_distance_to_northeast_corner() {
        let details = parse_details(object(json!({
            "status": "OK",
            "result": {
                "name": "Main",
                "geometry": {
                    "location": {"lat": 10.0, "lng": 20.0},
                    "viewport": {
                        "northeast": {"lat": 10.001, "lng": 20.0},
                        "southwest": {"lat": 9.999, "lng": 19.999}
                    }
                }
            }
        })))
        .unwrap();

        let expected = Coordinate::new(10.0, 20.0).distance_to(&Coordinate::new(10.001, 20.0));
        assert!((details.region.radius_meters - expected).abs() < 1e-9);
        assert!((details.radius() - 111.2).abs() < 0.1);
        assert_eq!(details.name, "Main");
        assert_eq!(details.region.identifier, "Main");
        assert_eq!(details.region.center, Coordinate::new(10.0, 20.0));
        assert_eq!(details.latitude, 10.0);
        assert_eq!(details.longitude, 20.0);
    }

    #[test]
    fn no_viewport_defaults_to_ten_meters() {
        let details = parse_details(object(json!({
            "result": {"name": "Spot", "geometry": {"location": {"lat": 1.0, "lng": 2.0}}}
        })))
        .unwrap();
        assert_eq!(details.region.radius_meters, 10.0);
    }

    #[test]
    fn missing_fields_are_mapping_errors() {
        let cases = [
            json!({}),
            json!({"result": {"geometry": {"location": {"lat": 1.0, "lng": 2.0}}}}),
            json!({"result": {"name": "x", "geometry": {}}}),
            json!({"result": {"name": "x", "geometry": {"location": {"lat": "1", "lng": 2.0}}}}),
            json!({"result": {"name": "x", "geometry": {
                "location": {"lat": 1.0, "lng": 2.0},
                "viewport": {"southwest": {"lat": 0.0, "lng": 0.0}}
            }}}),
        ];
        for case in cases {
            let result = parse_details(object(case.clone()));
            assert!(matches!(result, Err(PlacesError::Mapping(_))), "{case}");
        }
    }

    #[test]
    fn resolve_delivers_errors_instead_of_dropping_them() {
        let (ctx, callbacks) = callback_context();
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("placeid=p1", Err(TransportError::new("offline")));
        let client = HttpJsonClient::with_transport(transport.clone(), ctx)
            .with_activity(NetworkActivity::new());
        let resolver =
            PlaceDetailsResolver::new(&Endpoints::with_base_url("http://places.test"), client);

        let outcome = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&outcome);
        resolver.resolve(&Place::new("p1", "x").with_api_key("k"), move |r| {
            *sink.lock().unwrap() = Some(r);
        });

        let done = || outcome.lock().unwrap().is_some();
        assert!(callbacks.run_until(Duration::from_secs(5), done));
        let result = outcome.lock().unwrap().take().unwrap();
        assert!(matches!(result, Err(PlacesError::Transport(_))));
        assert_eq!(
            transport.requests()[0].url,
            "http://places.test/maps/api/place/details/json?key=k&placeid=p1"
        );
    }
}

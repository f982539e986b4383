//! Domain model shared by the search service, the details resolver and the
//! session.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Bias radius used when none is given. Larger than the Earth's
/// circumference, so it never narrows anything.
pub const DEFAULT_BIAS_RADIUS_METERS: f64 = 20_000_000.0;

/// Region radius for places whose details carry no viewport.
pub const DEFAULT_REGION_RADIUS_METERS: f64 = 10.0;

const EARTH_MEAN_RADIUS_METERS: f64 = 6_371_008.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in meters (haversine).
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_MEAN_RADIUS_METERS * c
    }
}

/// A circle on the globe approximating a place's extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularRegion {
    pub center: Coordinate,
    pub radius_meters: f64,
    pub identifier: String,
}

/// Which categories of places a search may return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceType {
    #[default]
    All,
    Geocode,
    Address,
    Establishment,
    Regions,
    Cities,
}

impl PlaceType {
    /// The `types` value the remote API understands.
    pub fn filter_token(&self) -> &'static str {
        match self {
            PlaceType::All => "",
            PlaceType::Geocode => "geocode",
            PlaceType::Address => "address",
            PlaceType::Establishment => "establishment",
            PlaceType::Regions => "(regions)",
            PlaceType::Cities => "(cities)",
        }
    }
}

impl fmt::Display for PlaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filter_token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlaceType(pub String);

impl fmt::Display for UnknownPlaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown place type: {:?}", self.0)
    }
}

impl std::error::Error for UnknownPlaceType {}

/// Accepts either the filter token (`"(cities)"`) or the name (`"cities"`).
impl FromStr for PlaceType {
    type Err = UnknownPlaceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(PlaceType::All),
            "geocode" => Ok(PlaceType::Geocode),
            "address" => Ok(PlaceType::Address),
            "establishment" => Ok(PlaceType::Establishment),
            "regions" | "(regions)" => Ok(PlaceType::Regions),
            "cities" | "(cities)" => Ok(PlaceType::Cities),
            _ => Err(UnknownPlaceType(s.to_string())),
        }
    }
}

/// Center and radius used to weight search results geographically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationBias {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

impl LocationBias {
    pub fn new(latitude: f64, longitude: f64, radius_meters: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_meters,
        }
    }

    /// A bias around a point with the unbounded default radius.
    pub fn from_coordinate(coordinate: Coordinate) -> Self {
        Self::new(
            coordinate.latitude,
            coordinate.longitude,
            DEFAULT_BIAS_RADIUS_METERS,
        )
    }

    pub fn from_region(region: &CircularRegion) -> Self {
        Self::new(
            region.center.latitude,
            region.center.longitude,
            region.radius_meters,
        )
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// `location` parameter value: `"lat,lng"`.
    pub fn location_param(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    pub fn radius_param(&self) -> String {
        self.radius_meters.to_string()
    }
}

impl Default for LocationBias {
    fn default() -> Self {
        Self::new(0.0, 0.0, DEFAULT_BIAS_RADIUS_METERS)
    }
}

/// A search-result candidate.
///
/// Identity is `id`: two places with the same id compare equal even if the
/// description differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub description: String,
    /// Key of the search that produced this place, reused for its details.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Place {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

impl PartialEq for Place {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Place {}

impl Hash for Place {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Resolved geocoded details of a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub region: CircularRegion,
}

impl PlaceDetails {
    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn radius(&self) -> f64 {
        self.region.radius_meters
    }
}

impl fmt::Display for PlaceDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PlaceDetails: {} ({}, {})",
            self.name, self.latitude, self.longitude
        )
    }
}

// crates/cityfinder-core/src/model.rs
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Stable, globally unique city identifier.
pub type CityId = i64;

/// Geographic position of a city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A city in the directory.
///
/// Cities are immutable values created at dataset-load time. Identity is the
/// [`CityId`] alone: two `City` values with the same id compare equal and hash
/// the same regardless of their other fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    id: CityId,
    name: String,
    country: String,
    coordinates: Coordinates,
}

impl City {
    pub fn new(
        id: CityId,
        name: impl Into<String>,
        country: impl Into<String>,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            country: country.into(),
            coordinates,
        }
    }

    #[inline]
    pub fn id(&self) -> CityId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Two-letter country code, as delivered by the data source.
    #[inline]
    pub fn country(&self) -> &str {
        &self.country
    }

    #[inline]
    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// `"Sydney, AU"`
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }

    /// `"Lat: -33.8679, Lon: 151.2073"` for (-33.86790, 151.20732)
    pub fn coordinates_label(&self) -> String {
        format!(
            "Lat: {:.4}, Lon: {:.4}",
            self.coordinates.lat, self.coordinates.lon
        )
    }
}

impl PartialEq for City {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for City {}

impl Hash for City {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Transport shape of a city as served by the dataset endpoint:
///
/// ```json
/// { "_id": 707860, "name": "Hurzuf", "country": "UA",
///   "coord": { "lon": 34.283333, "lat": 44.549999 } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityRecord {
    #[serde(rename = "_id")]
    pub id: CityId,
    pub name: String,
    pub country: String,
    pub coord: Coordinates,
}

impl From<CityRecord> for City {
    fn from(r: CityRecord) -> Self {
        City {
            id: r.id,
            name: r.name,
            country: r.country,
            coordinates: r.coord,
        }
    }
}

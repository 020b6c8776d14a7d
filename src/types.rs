use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A `placeName` element found in a letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceReference {
    /// Text content of the element, whitespace-collapsed.
    pub name: String,
    /// Raw `ref` attribute, e.g. `tgn/7000874`.
    pub reference: String,
    /// Bare Getty identifier, e.g. `7000874`.
    pub identifier: String,
}

/// Coordinates as returned by the vocabulary service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geolocation {
    pub latitude: String,
    pub longitude: String,
}

impl Geolocation {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }
}

/// One row of the output dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRecord {
    pub name: String,
    pub latitude: String,
    pub longitude: String,
    pub identifier: String,
    pub date: String,
}

/// Resolves a vocabulary identifier to coordinates.
pub trait GeoResolver: Send + Sync {
    fn resolve(&self, identifier: &str) -> Result<Geolocation>;

    /// Number of lookups answered without a remote round trip.
    fn cache_hits(&self) -> u64 {
        0
    }
}

impl<R: GeoResolver + ?Sized> GeoResolver for Box<R> {
    fn resolve(&self, identifier: &str) -> Result<Geolocation> {
        (**self).resolve(identifier)
    }

    fn cache_hits(&self) -> u64 {
        (**self).cache_hits()
    }
}

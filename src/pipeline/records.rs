//! Record Builder.

use crate::types::{Geolocation, PlaceReference, RowRecord};

/// Combine a place reference, its coordinates and its letter's date into one row.
pub fn build_record(reference: &PlaceReference, geolocation: Geolocation, date: &str) -> RowRecord {
    RowRecord {
        name: reference.name.clone(),
        latitude: geolocation.latitude,
        longitude: geolocation.longitude,
        identifier: reference.identifier.clone(),
        date: date.to_string(),
    }
}

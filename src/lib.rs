//! Extracts place names from TEI-encoded letters, geolocates them through the
//! Getty Thesaurus of Geographic Names, and writes a CSV for the DARIAH
//! Geobrowser.

pub mod apis;
pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod types;

pub use config::{FailurePolicy, PipelineConfig};
pub use error::{PlacenameError, Result};
pub use pipeline::{Pipeline, PipelineResult};
pub use types::{GeoResolver, Geolocation, PlaceReference, RowRecord};

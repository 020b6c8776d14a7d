use crate::constants::{LATITUDE_FIELD, LONGITUDE_FIELD, USER_AGENT};
use crate::document::Document;
use crate::error::{PlacenameError, Result};
use crate::metrics::PipelineMetrics;
use crate::types::{GeoResolver, Geolocation};
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Looks up places in the Getty Thesaurus of Geographic Names by fetching
/// `<base>/<identifier>.rdf`.
pub struct GettyTgnResolver {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl GettyTgnResolver {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| PlacenameError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn rdf_url(&self, identifier: &str) -> String {
        rdf_url(&self.base_url, identifier)
    }

    fn fetch(&self, identifier: &str) -> Result<String> {
        let url = self.rdf_url(identifier);
        debug!("HTTP GET {}", url);
        let network = |source| PlacenameError::Network {
            identifier: identifier.to_string(),
            source,
        };
        let resp = self.client.get(&url).send().map_err(network)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PlacenameError::Resolution {
                identifier: identifier.to_string(),
                reason: format!("{url} answered with HTTP {status}"),
            });
        }
        let body = resp.text().map_err(network)?;
        debug!("HTTP response: status={}, size={} bytes", status.as_u16(), body.len());
        Ok(body)
    }
}

impl GeoResolver for GettyTgnResolver {
    #[instrument(skip(self))]
    fn resolve(&self, identifier: &str) -> Result<Geolocation> {
        let started = Instant::now();
        let outcome = self
            .fetch(identifier)
            .and_then(|rdf| parse_geolocation(identifier, rdf));
        match &outcome {
            Ok(_) => PipelineMetrics::record_lookup_success(started.elapsed().as_secs_f64()),
            Err(e) => PipelineMetrics::record_lookup_error(e.kind()),
        }
        outcome
    }
}

pub fn rdf_url(base_url: &str, identifier: &str) -> String {
    format!("{}/{}.rdf", base_url.trim_end_matches('/'), identifier)
}

/// Reads the first `latitude` and `longitude` fields from an RDF payload.
pub fn parse_geolocation(identifier: &str, rdf: String) -> Result<Geolocation> {
    let unresolved = |reason: String| PlacenameError::Resolution {
        identifier: identifier.to_string(),
        reason,
    };
    let doc = Document::parse(format!("{identifier}.rdf"), rdf)?;
    let field = |name: &str| -> Result<String> {
        let value = doc
            .find(name)
            .map(|element| element.text().trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| unresolved(format!("payload has no {name}")))?;
        if value.parse::<f64>().is_err() {
            return Err(unresolved(format!("{name} {value:?} is not a number")));
        }
        Ok(value)
    };
    Ok(Geolocation {
        latitude: field(LATITUDE_FIELD)?,
        longitude: field(LONGITUDE_FIELD)?,
    })
}

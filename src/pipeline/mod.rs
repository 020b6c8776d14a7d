//! Pipeline Driver: letters in, Geobrowser CSV out.

pub mod dataset;
pub mod records;

pub use dataset::{write_dataset, write_records};
pub use records::build_record;

use crate::config::{FailurePolicy, PipelineConfig};
use crate::document::read_document;
use crate::error::Result;
use crate::extractor::{document_date, place_references};
use crate::metrics::PipelineMetrics;
use crate::types::{GeoResolver, RowRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, info_span, instrument, warn};

/// A file that was skipped under `FailurePolicy::SkipFailedFiles`.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub kind: &'static str,
    pub message: String,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub files_matched: usize,
    pub files_processed: usize,
    pub records_written: usize,
    /// Successful lookups, including those in files that were later skipped.
    pub references_resolved: usize,
    pub cache_hits: u64,
    pub errors: Vec<FileFailure>,
    pub output_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct Pipeline<R> {
    config: PipelineConfig,
    resolver: R,
}

impl<R: GeoResolver> Pipeline<R> {
    pub fn new(config: PipelineConfig, resolver: R) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Process every matching file, then write the dataset once.
    ///
    /// With `StopOnFirstError` the first failure is returned and the output
    /// file is left untouched.
    #[instrument(skip(self), fields(input = %self.config.input_glob))]
    pub fn run(&self) -> Result<PipelineResult> {
        let started_at = Utc::now();
        let files = discover_inputs(&self.config.input_glob)?;
        info!("Matched {} input files", files.len());

        let mut dataset: Vec<RowRecord> = Vec::new();
        let mut errors = Vec::new();
        let mut files_processed = 0;
        let mut references_resolved = 0;

        for path in &files {
            let span = info_span!("file", path = %path.display());
            let _enter = span.enter();

            match self.collect_rows(path, &mut references_resolved) {
                Ok(records) => {
                    files_processed += 1;
                    dataset.extend(records);
                }
                Err(e) => {
                    PipelineMetrics::record_document_failed(e.kind());
                    match self.config.failure_policy {
                        FailurePolicy::StopOnFirstError => {
                            error!("Aborting run: {}", e);
                            return Err(e);
                        }
                        FailurePolicy::SkipFailedFiles => {
                            warn!("Skipping file: {}", e);
                            errors.push(FileFailure {
                                path: path.clone(),
                                kind: e.kind(),
                                message: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        let records_written = write_dataset(&self.config.output_path, &dataset)?;
        PipelineMetrics::record_rows_written(records_written);

        Ok(PipelineResult {
            files_matched: files.len(),
            files_processed,
            records_written,
            references_resolved,
            cache_hits: self.resolver.cache_hits(),
            errors,
            output_path: self.config.output_path.clone(),
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Rows for one letter, in document order. Fails on the first error.
    pub fn process_file(&self, path: &Path) -> Result<Vec<RowRecord>> {
        let mut resolved = 0;
        self.collect_rows(path, &mut resolved)
    }

    fn collect_rows(&self, path: &Path, resolved: &mut usize) -> Result<Vec<RowRecord>> {
        info!("Reading {}", path.display());
        let doc = read_document(path)?;
        PipelineMetrics::record_document_read();

        // The date is looked up first so a letter without one fails before any lookup
        let date = document_date(&doc)?;
        let references = place_references(&doc)?;
        PipelineMetrics::record_references_extracted(references.len());
        info!("Found {} place references dated {}", references.len(), date);

        let mut records = Vec::with_capacity(references.len());
        for reference in &references {
            let geolocation = self.resolver.resolve(&reference.identifier)?;
            *resolved += 1;
            debug!(
                name = %reference.name,
                identifier = %reference.identifier,
                latitude = %geolocation.latitude,
                longitude = %geolocation.longitude,
                "Resolved place"
            );
            records.push(build_record(reference, geolocation, &date));
        }
        Ok(records)
    }
}

/// Paths matching `pattern`. The `glob` crate yields them in sorted order.
pub fn discover_inputs(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in glob::glob(pattern)? {
        let path = entry?;
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

//! Dataset Writer: serializes rows in the DARIAH Geobrowser CSV layout.

use crate::constants::CSV_HEADER;
use crate::error::{PlacenameError, Result};
use crate::types::RowRecord;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Write `records` to any writer: the header, then one row per record.
pub fn write_records<W: Write>(writer: W, records: &[RowRecord]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    for record in records {
        csv.write_record([
            record.name.as_str(),
            record.name.as_str(),
            record.latitude.as_str(),
            record.longitude.as_str(),
            record.identifier.as_str(),
            record.date.as_str(),
            "",
            "",
        ])?;
    }
    csv.flush().map_err(|e| PlacenameError::Csv(e.into()))?;
    Ok(())
}

/// Write the full dataset to `path`, replacing any existing file.
///
/// Rows go to a sibling `.tmp` file first which is then renamed into place, so
/// `path` either keeps its previous content or holds the complete new dataset.
#[instrument(skip_all, fields(path = %path.display(), rows = records.len()))]
pub fn write_dataset(path: &Path, records: &[RowRecord]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PlacenameError::io(parent, e))?;
    }

    let tmp = tmp_path(path);
    let file = fs::File::create(&tmp).map_err(|e| PlacenameError::io(&tmp, e))?;
    if let Err(e) = write_records(file, records) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        PlacenameError::io(path, e)
    })?;

    info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(records.len())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("dataset"));
    name.push(".tmp");
    path.with_file_name(name)
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlacenameError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed markup in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Network request for identifier {identifier} failed: {source}")]
    Network {
        identifier: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Could not resolve identifier {identifier}: {reason}")]
    Resolution { identifier: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlacenameError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlacenameError::Io {
            path: path.into(),
            source,
        }
    }

    /// Short label used for metrics and the run summary.
    pub fn kind(&self) -> &'static str {
        match self {
            PlacenameError::Io { .. } => "io",
            PlacenameError::Parse { .. } => "parse",
            PlacenameError::Lookup(_) => "lookup",
            PlacenameError::Network { .. } => "network",
            PlacenameError::Resolution { .. } => "resolution",
            PlacenameError::Csv(_) => "csv",
            PlacenameError::Pattern(_) => "pattern",
            PlacenameError::Toml(_) | PlacenameError::Config(_) => "config",
        }
    }
}

impl From<glob::GlobError> for PlacenameError {
    fn from(err: glob::GlobError) -> Self {
        let path = err.path().to_path_buf();
        let source: std::io::Error = err.into();
        PlacenameError::io(path, source)
    }
}

pub type Result<T> = std::result::Result<T, PlacenameError>;

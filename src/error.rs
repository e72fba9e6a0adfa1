use thiserror::Error;

/// Errors raised while loading, joining or exporting name statistics.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid geometry: {0}")]
    Geometry(String),
    #[error("unknown name {0:?}")]
    UnknownName(String),
    #[error("year {year:?} not available for {name:?}")]
    UnknownYear { name: String, year: String },
}

impl DataError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        DataError::Io { path: path.into(), source }
    }
}

/// Rejected map granularity. Only region and department maps exist.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid map mode {0:?}: expected \"region\" or \"department\"")]
pub struct InvalidModeError(pub String);

pub type Result<T> = std::result::Result<T, DataError>;

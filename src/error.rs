//! Crate-wide error types.

use thiserror::Error;

pub type LensResult<T> = Result<T, LensError>;

#[derive(Debug, Error)]
pub enum LensError {
    #[error("missing required sample type ({0})")]
    MissingSampleType(String),

    #[error("time series analysis needs at least {required} profiles, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("label count ({labels}) does not match profile count ({profiles})")]
    LabelMismatch { labels: usize, profiles: usize },

    #[error("sample type mismatch: {0}")]
    SchemaMismatch(String),

    #[error("unsupported profile type: {0:?} (supported: cpu, heap, goroutine, allocs, mutex, block)")]
    UnsupportedProfileType(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("file not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to download {uri}: {reason}")]
    Download { uri: String, reason: String },

    #[error("failed to parse profile {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LensError {
    /// Stable machine-readable code, used by the CLI's JSON error output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingSampleType(_) => "MISSING_SAMPLE_TYPE",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::LabelMismatch { .. } => "LABEL_MISMATCH",
            Self::SchemaMismatch(_) => "SCHEMA_MISMATCH",
            Self::UnsupportedProfileType(_) => "UNSUPPORTED_TYPE",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::FileNotFound { .. } => "FILE_NOT_FOUND",
            Self::Download { .. } => "DOWNLOAD_FAILED",
            Self::Parse { .. } => "PARSE_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "SERIALIZATION_FAILED",
        }
    }
}

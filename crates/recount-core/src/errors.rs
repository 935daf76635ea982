//! Error types for the recount core library.

#[cfg(feature = "python")]
use pyo3::exceptions::{PyIOError, PyKeyError, PyTypeError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;

/// Top-level error enum for the recount core library.
#[derive(Debug, thiserror::Error)]
pub enum RecountError {
    #[error("no annotation for ({image_id:?}, {caption:?})")]
    KeyNotFound { image_id: String, caption: String },

    #[error("annotation for ({image_id:?}, {caption:?}) has no field {field:?}")]
    FieldMissing {
        image_id: String,
        caption: String,
        field: String,
    },

    #[error("field {field:?} of ({image_id:?}, {caption:?}) is not a string")]
    FieldNotString {
        image_id: String,
        caption: String,
        field: String,
    },

    #[error("unknown split: {0:?}")]
    UnknownSplit(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed {source_name}: {message}")]
    SourceParse {
        source_name: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RecountError {
    pub(crate) fn source_parse(source_name: &str, message: impl Into<String>) -> Self {
        Self::SourceParse {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn key_not_found(image_id: &str, caption: &str) -> Self {
        Self::KeyNotFound {
            image_id: image_id.to_string(),
            caption: caption.to_string(),
        }
    }
}

#[cfg(feature = "python")]
impl From<RecountError> for PyErr {
    fn from(err: RecountError) -> PyErr {
        match &err {
            RecountError::KeyNotFound { .. }
            | RecountError::FieldMissing { .. }
            | RecountError::UnknownSplit(_) => PyKeyError::new_err(err.to_string()),
            RecountError::FieldNotString { .. } => PyTypeError::new_err(err.to_string()),
            RecountError::InvalidArgument(_) => PyValueError::new_err(err.to_string()),
            RecountError::SourceParse { .. } => PyValueError::new_err(err.to_string()),
            RecountError::Io(_) => PyIOError::new_err(err.to_string()),
            RecountError::Json(_) => PyValueError::new_err(err.to_string()),
        }
    }
}

pub type RecountResult<T> = Result<T, RecountError>;

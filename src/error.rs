use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a World Creator document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// The document is not a World Creator project
    #[error("unexpected root element '{found}', expected 'WorldCreator'")]
    InvalidRoot { found: String },

    #[error("document has no Objects element")]
    MissingObjects,
}

/// Errors scoped to one object group or one instance record
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("DataCount '{0}' is not a non-negative integer")]
    MalformedCount(String),

    #[error("instance data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("{declared} records need {required} bytes, only {actual} decoded")]
    Truncated {
        declared: usize,
        required: usize,
        actual: usize,
    },

    #[error("record {index}: {reason}")]
    InvalidRecord { index: usize, reason: &'static str },
}

/// Errors raised while persisting layer output
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("layer name '{0}' appears more than once")]
    DuplicateLayer(String),

    #[error("layer name '{0}' cannot be used as a file name")]
    InvalidLayerName(String),

    #[error("failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

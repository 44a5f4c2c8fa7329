//! Error taxonomy for the indexing and query pipeline.
//!
//! Library code returns [`RecallError`]; the CLI wraps it in `anyhow` with
//! context. Not every variant is fatal: `MalformedFrontMatter` fails a single
//! note and `InvalidClassificationLabel` skips a single record.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, RecallError>;

#[derive(Debug, thiserror::Error)]
pub enum RecallError {
    #[error("malformed front matter in {}: {reason}", path.display())]
    MalformedFrontMatter { path: PathBuf, reason: String },

    #[error("no chunks were produced from the vault; check the vault root and note contents")]
    EmptyCorpus,

    #[error("index holds {vectors} vectors but metadata holds {records} records; rebuild the index")]
    IndexMetadataMismatch { vectors: usize, records: usize },

    #[error("{service} service unavailable: {message}")]
    ServiceUnavailable {
        service: &'static str,
        message: String,
    },

    #[error("invalid classification label: '{0}'")]
    InvalidClassificationLabel(String),

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("corrupt vector index: {0}")]
    CorruptIndex(String),

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RecallError {
    pub(crate) fn unavailable(service: &'static str, message: impl Into<String>) -> Self {
        RecallError::ServiceUnavailable {
            service,
            message: message.into(),
        }
    }

    pub(crate) fn embedding(message: impl Into<String>) -> Self {
        Self::unavailable(crate::http::EMBEDDING, message)
    }

    pub(crate) fn generation(message: impl Into<String>) -> Self {
        Self::unavailable(crate::http::GENERATION, message)
    }
}

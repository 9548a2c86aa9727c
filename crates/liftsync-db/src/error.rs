use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid document for {key}: {reason}")]
    InvalidDocument { key: String, reason: String },

    #[error("Read-back verification failed for {0}")]
    VerificationFailed(String),

    #[error("Storage write failed: {0}")]
    WriteFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DbResult<T> = Result<T, DbError>;

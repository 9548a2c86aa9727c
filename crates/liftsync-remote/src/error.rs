use thiserror::Error;

/// Failures talking to the remote database.
///
/// These never cross the workout service boundary; callers convert them into
/// a cache, queue, or empty fallback.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote unavailable: {0}")]
    Unavailable(String),

    #[error("Remote returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to decode remote response: {0}")]
    Decode(String),

    #[error("Remote rejected the credentials")]
    Unauthenticated,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            RemoteError::Http {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            RemoteError::Unavailable(e.to_string())
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

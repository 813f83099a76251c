use drivekit_query::QueryError;
use drivekit_upload::TransportError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DriveError>;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("files API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    #[error("content upload failed: {0}")]
    Upload(#[from] drivekit_upload::Error),

    #[error("invalid search query: {0}")]
    Query(#[from] QueryError),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl DriveError {
    /// HTTP status of a rejected call.
    pub fn status(&self) -> Option<u16> {
        match self {
            DriveError::Api { status, .. } => Some(*status),
            DriveError::Upload(e) => e.response().map(|r| r.status),
            _ => None,
        }
    }
}

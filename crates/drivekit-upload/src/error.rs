//! Error types for drivekit-upload.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::effects::HttpResponse;

pub type Result<T> = std::result::Result<T, Error>;

/// A failure below HTTP: connection refused, reset, timeout, DNS.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("upload session rejected: HTTP {}", .0.status)]
    SessionInitiation(Box<HttpResponse>),

    #[error("upload session response has no Location header")]
    MissingSessionUri,

    #[error("no upload session is open")]
    SessionNotOpen,

    #[error("transport error while opening upload session: {0}")]
    SessionTransport(#[source] TransportError),

    #[error("chunk rejected: HTTP {}", .0.status)]
    ChunkUploadClient(Box<HttpResponse>),

    #[error("giving up after {attempts} transient failures")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: TransientCause,
    },

    #[error("upload did not finish within {deadline:?}")]
    DeadlineExceeded {
        deadline: Duration,
        #[source]
        last: TransientCause,
    },

    #[error("upload cancelled")]
    Cancelled,

    #[error("failed to read payload: {0}")]
    Source(#[from] io::Error),

    #[error("invalid upload options: {0}")]
    InvalidOptions(String),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] TransportError),
}

/// Why a transmission is worth retrying.
#[derive(Debug, Error)]
pub enum TransientCause {
    #[error("server error: HTTP {}", .0.status)]
    Status(Box<HttpResponse>),

    #[error("transport failure: {0}")]
    Transport(#[source] TransportError),
}

impl Error {
    /// Raw server response attached to a terminal HTTP failure, if any.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Error::SessionInitiation(response) | Error::ChunkUploadClient(response) => {
                Some(response)
            }
            Error::RetriesExhausted { last, .. } | Error::DeadlineExceeded { last, .. } => {
                match last {
                    TransientCause::Status(response) => Some(response),
                    TransientCause::Transport(_) => None,
                }
            }
            _ => None,
        }
    }
}

//! Resumable, chunked uploads against a files API.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable configuration and value types
//! - [`core`] - Pure transformations (interval arithmetic, range headers, status classes)
//! - [`effects`] - I/O operations behind the [`HttpClient`] trait
//!
//! # Protocol
//!
//! An upload opens a session (`POST`/`PATCH` with `uploadType=resumable`), then
//! sends the payload in one or more `PUT`s against the session URI returned in
//! the `Location` header. A `308` acknowledges a prefix of the payload; a `5xx`
//! or a dropped connection is retried after an exponential backoff, first asking
//! the server how many bytes it already holds.
//!
//! ```no_run
//! use drivekit_upload::{AccessToken, Payload, ReqwestClient, UploadOptions, Uploader};
//!
//! # async fn run() -> drivekit_upload::Result<()> {
//! let client = ReqwestClient::new()?;
//! let uploader = Uploader::new(client, AccessToken::new("ya29.token"));
//! let payload = Payload::from_bytes(b"hello".to_vec())
//!     .content_type("text/plain")
//!     .name("hello.txt");
//!
//! let resource = uploader
//!     .upload(&payload, &UploadOptions::default().chunk_size(256 * 1024))
//!     .await?;
//! println!("{resource:?}");
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use crate::core::BackoffScheduler;
pub use data::{
    AccessToken, ByteSource, DEFAULT_BASE_URL, FileSource, Payload, Progress, ProgressObserver,
    RetryPolicy, UploadOptions, UploadPhase, UploadSession, UploadTarget, UploadedResource,
};
pub use effects::{
    ChunkOutcome, ChunkTransmitter, HttpClient, HttpRequest, HttpResponse, Method,
    SessionInitiator, Uploader, default_metadata,
};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{Error, Result, TransientCause, TransportError};

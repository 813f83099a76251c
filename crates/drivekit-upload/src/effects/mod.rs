//! I/O operations for resumable uploads.
//!
//! Everything that talks to the network goes through [`HttpClient`]; the
//! [`Uploader`] state machine composes session initiation, chunk
//! transmission and backoff into a single call.

mod http;
mod observer;
mod session;
mod transmit;
mod uploader;

pub use http::{BodyProgress, HttpClient, HttpRequest, HttpResponse, Method};
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
pub use session::{SessionInitiator, default_metadata, session_request};
pub use transmit::{ChunkOutcome, ChunkTransmitter};
pub use uploader::Uploader;

//! Immutable configuration and value types for uploads.

mod options;
mod payload;
mod progress;
mod resource;
mod session;

pub use options::{
    DEFAULT_BASE_URL, ProgressObserver, RetryPolicy, UploadOptions, UploadPhase, UploadTarget,
};
pub use payload::{ByteSource, DEFAULT_CONTENT_TYPE, FileSource, Payload};
pub use progress::Progress;
pub use resource::UploadedResource;
pub use session::{AccessToken, UploadSession};

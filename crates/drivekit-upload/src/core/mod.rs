//! Pure transformations for resumable uploads.
//!
//! Interval arithmetic, header values, URLs and status classes. Nothing here
//! touches the network; the only suspension point is [`BackoffScheduler`]'s timer.

mod backoff;
mod endpoint;
mod range;
mod status;

pub use backoff::{BackoffScheduler, MAX_JITTER_MS, jitter, next_interval};
pub use endpoint::{UPLOAD_TYPE_PARAM, build_query, session_url};
pub use range::{chunk_end, content_range, offset_after_range, probe_range};
pub use status::{RESUME_INCOMPLETE, StatusClass, classify};

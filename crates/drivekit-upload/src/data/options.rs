use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::progress::Progress;

/// Endpoint that opens resumable sessions for new and replaced files.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3/files/";

/// Observer receiving advisory progress notifications.
pub type ProgressObserver = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Phases of an upload.
///
/// Uploads move through these phases:
/// Initiating → Transmitting → (RetryWaiting → Resuming → Transmitting)* → Completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    /// Opening the resumable session.
    #[default]
    Initiating,

    /// Sending a byte range of the payload.
    Transmitting,

    /// Waiting out the backoff interval after a transient failure.
    RetryWaiting,

    /// Asking the server which bytes it already holds.
    Resuming,

    /// The server returned the final resource description.
    Completed,
}

impl fmt::Display for UploadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadPhase::Initiating => write!(f, "Initiating"),
            UploadPhase::Transmitting => write!(f, "Transmitting"),
            UploadPhase::RetryWaiting => write!(f, "RetryWaiting"),
            UploadPhase::Resuming => write!(f, "Resuming"),
            UploadPhase::Completed => write!(f, "Completed"),
        }
    }
}

/// Whether the upload creates a new file or replaces the content of an existing one.
///
/// Fixed when the session is opened: `Create` opens it with `POST`,
/// `Replace` with `PATCH` against `{base}{file_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadTarget {
    #[default]
    Create,
    Replace { file_id: String },
}

impl UploadTarget {
    pub fn replace(file_id: impl Into<String>) -> Self {
        UploadTarget::Replace {
            file_id: file_id.into(),
        }
    }

    pub fn file_id(&self) -> Option<&str> {
        match self {
            UploadTarget::Create => None,
            UploadTarget::Replace { file_id } => Some(file_id),
        }
    }
}

/// Backoff and retry bounds for transient failures.
///
/// With the defaults an upload retries forever: every `5xx` or dropped
/// connection is followed by a wait and a status probe. Set
/// [`max_attempts`](RetryPolicy::max_attempts) or
/// [`deadline`](RetryPolicy::deadline) to give up instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// First wait after a failure, and the value restored after any acknowledgment.
    ///
    /// Default: 1s
    pub base_interval: Duration,

    /// Ceiling for the wait between attempts.
    ///
    /// Default: 60s
    pub max_interval: Duration,

    /// Consecutive transient failures tolerated before giving up.
    ///
    /// The counter restarts whenever the server confirms bytes beyond the
    /// previously confirmed offset.
    ///
    /// Default: None (unbounded)
    pub max_attempts: Option<u32>,

    /// No retry is started once this much time has passed since the upload began.
    ///
    /// Default: None (unbounded)
    pub deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(1000),
            max_interval: Duration::from_millis(60_000),
            max_attempts: None,
            deadline: None,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn base_interval(mut self, base_interval: Duration) -> Self {
        self.base_interval = base_interval;
        self
    }

    #[must_use]
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = max_interval;
        self
    }

    #[must_use]
    pub fn max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Configuration for a single upload.
///
/// # Examples
///
/// ```
/// use drivekit_upload::{RetryPolicy, UploadOptions, UploadTarget};
/// use std::time::Duration;
///
/// let options = UploadOptions::default()
///     .chunk_size(8 * 1024 * 1024)
///     .target(UploadTarget::replace("1AbCdEf"))
///     .param("supportsAllDrives", "true")
///     .retry(RetryPolicy::default().deadline(Some(Duration::from_secs(600))));
/// ```
#[derive(Clone)]
pub struct UploadOptions {
    /// Maximum bytes per `PUT`. `0` sends the remainder in one request.
    ///
    /// Each chunk is read from the source into memory before it is sent.
    ///
    /// Default: 0
    pub chunk_size: u64,

    /// Session endpoint; the file id is appended when replacing.
    ///
    /// Default: [`DEFAULT_BASE_URL`]
    pub base_url: String,

    /// Extra query parameters for the session request. `uploadType=resumable`
    /// is always appended after these.
    ///
    /// Default: empty
    pub params: Vec<(String, String)>,

    /// Create a new file or replace an existing one.
    ///
    /// Default: [`UploadTarget::Create`]
    pub target: UploadTarget,

    /// JSON body of the session request.
    ///
    /// When `None`, `{"name": <payload name>, "mimeType": <content type>}` is sent.
    ///
    /// Default: None
    pub metadata: Option<Value>,

    /// Backoff and retry bounds.
    pub retry: RetryPolicy,

    /// Progress observer.
    ///
    /// Invoked on phase transitions and while request bodies stream. Purely
    /// advisory: a panicking observer is logged and otherwise ignored.
    ///
    /// Default: None
    pub on_progress: Option<ProgressObserver>,
}

impl fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadOptions")
            .field("chunk_size", &self.chunk_size)
            .field("base_url", &self.base_url)
            .field("params", &self.params)
            .field("target", &self.target)
            .field("metadata", &self.metadata)
            .field("retry", &self.retry)
            .field("on_progress", &"{ ... }")
            .finish()
    }
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            chunk_size: 0,
            base_url: DEFAULT_BASE_URL.to_string(),
            params: Vec::new(),
            target: UploadTarget::Create,
            metadata: None,
            retry: RetryPolicy::default(),
            on_progress: None,
        }
    }
}

impl UploadOptions {
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Add a single query parameter to the session request.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn target(mut self, target: UploadTarget) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the progress observer.
    ///
    /// # Examples
    ///
    /// ```
    /// use drivekit_upload::{UploadOptions, UploadPhase};
    /// use std::sync::Arc;
    ///
    /// let options = UploadOptions::default().on_progress(Arc::new(|progress| {
    ///     if progress.phase == UploadPhase::Transmitting {
    ///         if let Some(pct) = progress.percentage() {
    ///             println!("{pct:.1}%");
    ///         }
    ///     }
    /// }));
    /// ```
    #[must_use]
    pub fn on_progress(mut self, on_progress: ProgressObserver) -> Self {
        self.on_progress = Some(on_progress);
        self
    }
}

use std::time::Duration;

use crate::data::options::UploadPhase;

/// Snapshot of an upload handed to progress observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Current phase of the upload.
    pub phase: UploadPhase,

    /// Bytes of the payload the server holds, plus bytes of the in-flight
    /// request body already handed to the transport.
    pub bytes_sent: u64,

    /// Total payload length.
    pub total_bytes: u64,

    /// Consecutive transient failures (0 = none since the offset last advanced).
    pub retry_count: u32,

    /// Wait before the next attempt. Only set in [`UploadPhase::RetryWaiting`].
    pub retry_delay: Option<Duration>,
}

impl Progress {
    pub(crate) fn new(phase: UploadPhase, bytes_sent: u64, total_bytes: u64) -> Self {
        Self {
            phase,
            bytes_sent,
            total_bytes,
            retry_count: 0,
            retry_delay: None,
        }
    }

    /// Percentage of the payload sent.
    ///
    /// Returns `None` for an empty payload that has not completed yet.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        if self.total_bytes == 0 {
            return self.is_completed().then_some(100.0);
        }
        Some((self.bytes_sent as f64 / self.total_bytes as f64) * 100.0)
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.phase == UploadPhase::Completed
    }

    #[must_use]
    pub fn is_retrying(&self) -> bool {
        self.retry_count > 0
    }
}

use std::fmt;
use std::ops::Range;

use crate::core::{BackoffScheduler, chunk_end};
use crate::data::options::{UploadOptions, UploadTarget};
use crate::data::payload::{ByteSource, Payload};

/// Opaque bearer credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    /// Value of an `Authorization` header carrying this token.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Mutable state of one upload, owned by the orchestrator until it reaches a
/// terminal state.
///
/// `offset` only moves when the server acknowledges bytes, and the session
/// URI is written once.
#[derive(Debug)]
pub struct UploadSession {
    token: AccessToken,
    total_len: u64,
    content_type: String,
    target: UploadTarget,
    chunk_size: u64,
    session_uri: Option<String>,
    offset: u64,
    retry: BackoffScheduler,
    failures: u32,
}

impl UploadSession {
    pub fn new<S: ByteSource>(
        token: AccessToken,
        payload: &Payload<S>,
        options: &UploadOptions,
    ) -> Self {
        Self {
            token,
            total_len: payload.len(),
            content_type: payload.declared_type().to_string(),
            target: options.target.clone(),
            chunk_size: options.chunk_size,
            session_uri: None,
            offset: 0,
            retry: BackoffScheduler::new(options.retry.base_interval, options.retry.max_interval),
            failures: 0,
        }
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn target(&self) -> &UploadTarget {
        &self.target
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn session_uri(&self) -> Option<&str> {
        self.session_uri.as_deref()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn retry(&self) -> &BackoffScheduler {
        &self.retry
    }

    pub fn retry_mut(&mut self) -> &mut BackoffScheduler {
        &mut self.retry
    }

    /// Consecutive transient failures since the offset last advanced.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Byte range the next transmission covers.
    pub fn next_range(&self) -> Range<u64> {
        self.offset..chunk_end(self.offset, self.chunk_size, self.total_len)
    }

    /// Record the session endpoint. Later calls are ignored.
    pub(crate) fn bind(&mut self, session_uri: String) {
        if self.session_uri.is_none() {
            self.session_uri = Some(session_uri);
        }
    }

    /// The server confirmed every byte before `offset`.
    ///
    /// Always resets the backoff interval. The failure counter only restarts
    /// when the confirmed offset moves forward.
    pub fn acknowledge(&mut self, offset: u64) {
        let offset = offset.min(self.total_len);
        if offset > self.offset {
            self.failures = 0;
        }
        self.offset = offset;
        self.retry.reset();
    }

    pub(crate) fn record_failure(&mut self) -> u32 {
        self.failures = self.failures.saturating_add(1);
        self.failures
    }
}

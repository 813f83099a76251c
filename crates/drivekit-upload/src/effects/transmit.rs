use std::sync::Arc;

use tracing::debug;

use crate::core::{StatusClass, classify, content_range, offset_after_range, probe_range};
use crate::data::{
    ByteSource, Payload, Progress, ProgressObserver, UploadPhase, UploadSession, UploadedResource,
};
use crate::effects::http::{HttpClient, HttpRequest, HttpResponse, Method};
use crate::effects::observer::notify;
use crate::error::{Error, Result, TransientCause};

/// What one transmission (or probe) means for the upload.
#[derive(Debug)]
pub enum ChunkOutcome {
    /// The server returned the final resource.
    Complete(UploadedResource),
    /// The server holds every byte before this offset.
    Partial(u64),
    /// Terminal rejection, surfaced verbatim.
    ClientError(HttpResponse),
    /// Worth retrying after a backoff.
    TransientError(TransientCause),
}

/// What a `308` without a `Range` header means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingRange {
    /// Nothing was kept: start over from byte 0.
    Restart,
    /// Unknown: retry from the current offset.
    Keep,
}

/// Sends byte ranges of one payload to an open session.
pub struct ChunkTransmitter<'a, C, S> {
    client: &'a C,
    payload: &'a Payload<S>,
    observer: Option<&'a ProgressObserver>,
}

impl<'a, C: HttpClient, S: ByteSource> ChunkTransmitter<'a, C, S> {
    pub fn new(client: &'a C, payload: &'a Payload<S>) -> Self {
        Self {
            client,
            payload,
            observer: None,
        }
    }

    /// Report body progress to `observer` while ranges are in flight.
    #[must_use]
    pub fn observer(mut self, observer: Option<&'a ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Send the range starting at the session offset.
    ///
    /// A `308` moves the session offset to the acknowledged position (byte 0
    /// when the response has no `Range`) and resets the backoff interval.
    ///
    /// # Errors
    ///
    /// Only for local failures: no session URI, or the payload could not be read.
    pub async fn send_range(&self, session: &mut UploadSession) -> Result<ChunkOutcome> {
        let uri = session.session_uri().ok_or(Error::SessionNotOpen)?.to_string();
        let range = session.next_range();
        let total = session.total_len();
        let body = self.payload.source().read_range(range.clone()).await?;
        let content_range = content_range(range.start, range.end, total);

        let mut request = HttpRequest::new(Method::Put, uri)
            .header("Content-Type", session.content_type())
            .header("X-Upload-Content-Type", session.content_type())
            .header("Content-Range", content_range.as_str())
            .body(body);

        if let Some(observer) = self.observer {
            let observer = Arc::clone(observer);
            let base = range.start;
            let retry_count = session.failures();
            request = request.on_body_progress(Arc::new(move |sent| {
                let mut progress = Progress::new(UploadPhase::Transmitting, base + sent, total);
                progress.retry_count = retry_count;
                notify(Some(&observer), &progress);
            }));
        }

        debug!(content_range = %content_range, "sending chunk");
        let result = self.client.send(request).await;
        Ok(interpret(session, result, MissingRange::Restart))
    }

    /// Ask the server which bytes it holds with an empty `PUT`.
    ///
    /// Interpreted like a transmission, except that a `308` without a `Range`
    /// header leaves the offset where it was.
    pub async fn probe(&self, session: &mut UploadSession) -> Result<ChunkOutcome> {
        let uri = session.session_uri().ok_or(Error::SessionNotOpen)?.to_string();
        let request = HttpRequest::new(Method::Put, uri)
            .header("Content-Range", probe_range(session.total_len()))
            .header("X-Upload-Content-Type", session.content_type());

        debug!(offset = session.offset(), "probing upload status");
        let result = self.client.send(request).await;
        Ok(interpret(session, result, MissingRange::Keep))
    }
}

fn interpret<E>(
    session: &mut UploadSession,
    result: std::result::Result<HttpResponse, E>,
    missing: MissingRange,
) -> ChunkOutcome
where
    E: std::error::Error + Send + Sync + 'static,
{
    let response = match result {
        Ok(response) => response,
        Err(e) => return ChunkOutcome::TransientError(TransientCause::Transport(Box::new(e))),
    };

    match classify(response.status) {
        StatusClass::Complete => {
            ChunkOutcome::Complete(UploadedResource::from_body(&response.body))
        }
        StatusClass::Partial => {
            let next = match response.header("Range").and_then(offset_after_range) {
                Some(next) => next,
                None if missing == MissingRange::Restart => 0,
                None => session.offset(),
            };
            session.acknowledge(next);
            ChunkOutcome::Partial(session.offset())
        }
        StatusClass::ClientError => ChunkOutcome::ClientError(response),
        StatusClass::Transient => {
            ChunkOutcome::TransientError(TransientCause::Status(Box::new(response)))
        }
    }
}

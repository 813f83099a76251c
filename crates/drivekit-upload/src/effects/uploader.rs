use std::future::Future;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::data::{
    AccessToken, ByteSource, Payload, Progress, UploadOptions, UploadPhase, UploadSession,
    UploadedResource,
};
use crate::effects::http::HttpClient;
use crate::effects::observer::notify;
use crate::effects::session::{SessionInitiator, default_metadata};
use crate::effects::transmit::{ChunkOutcome, ChunkTransmitter};
use crate::error::{Error, Result, TransientCause};

enum State {
    Initiating,
    Transmitting,
    RetryWaiting(TransientCause),
    Resuming,
    Complete(UploadedResource),
    Failed(Error),
}

/// Drives resumable uploads to completion.
///
/// One `Uploader` can run any number of uploads, sequentially or
/// concurrently; each call to [`upload`](Self::upload) owns its own session.
pub struct Uploader<C> {
    client: C,
    token: AccessToken,
}

impl<C: HttpClient> Uploader<C> {
    pub fn new(client: C, token: AccessToken) -> Self {
        Self { client, token }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Upload `payload` and return the resource the server created.
    ///
    /// Transient failures (`5xx`, transport errors) are retried after an
    /// exponential backoff, resuming from the offset the server reports.
    /// Retries are unbounded unless [`RetryPolicy`](crate::RetryPolicy) sets
    /// `max_attempts` or `deadline`.
    ///
    /// Dropping the returned future abandons the upload.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidOptions`] before any request is made
    /// - [`Error::SessionInitiation`], [`Error::MissingSessionUri`] and
    ///   [`Error::SessionTransport`] when the session cannot be opened
    /// - [`Error::ChunkUploadClient`] when the server rejects a chunk
    /// - [`Error::RetriesExhausted`] and [`Error::DeadlineExceeded`] when a
    ///   retry bound is hit
    /// - [`Error::Source`] when the payload cannot be read
    pub async fn upload<S: ByteSource>(
        &self,
        payload: &Payload<S>,
        options: &UploadOptions,
    ) -> Result<UploadedResource> {
        validate(options)?;

        let mut session = UploadSession::new(self.token.clone(), payload, options);
        let metadata = options
            .metadata
            .clone()
            .unwrap_or_else(|| default_metadata(payload));
        let observer = options.on_progress.as_ref();
        let transmitter = ChunkTransmitter::new(&self.client, payload).observer(observer);
        let started = Instant::now();

        let mut state = State::Initiating;
        loop {
            state = match state {
                State::Initiating => {
                    self.report(&session, options, UploadPhase::Initiating);
                    match SessionInitiator::new(&self.client)
                        .initiate(&session, &metadata, options)
                        .await
                    {
                        Ok(uri) => {
                            debug!(total = session.total_len(), "upload session opened");
                            session.bind(uri);
                            State::Transmitting
                        }
                        Err(e) => State::Failed(e),
                    }
                }
                State::Transmitting => {
                    self.report(&session, options, UploadPhase::Transmitting);
                    match transmitter.send_range(&mut session).await? {
                        ChunkOutcome::Complete(resource) => State::Complete(resource),
                        ChunkOutcome::Partial(offset) => {
                            debug!(offset, total = session.total_len(), "chunk acknowledged");
                            State::Transmitting
                        }
                        ChunkOutcome::ClientError(response) => {
                            State::Failed(Error::ChunkUploadClient(Box::new(response)))
                        }
                        ChunkOutcome::TransientError(cause) => State::RetryWaiting(cause),
                    }
                }
                State::RetryWaiting(cause) => {
                    match check_budget(&mut session, options, started, cause) {
                        Ok(cause) => {
                            let delay = session.retry().interval();
                            warn!(
                                error = %cause,
                                offset = session.offset(),
                                delay_ms = delay.as_millis() as u64,
                                "transient upload failure, retrying"
                            );
                            let mut progress = Progress::new(
                                UploadPhase::RetryWaiting,
                                session.offset(),
                                session.total_len(),
                            );
                            progress.retry_count = session.failures();
                            progress.retry_delay = Some(delay);
                            notify(observer, &progress);

                            session.retry_mut().wait().await;
                            State::Resuming
                        }
                        Err(e) => State::Failed(e),
                    }
                }
                State::Resuming => {
                    self.report(&session, options, UploadPhase::Resuming);
                    match transmitter.probe(&mut session).await? {
                        ChunkOutcome::Complete(resource) => State::Complete(resource),
                        ChunkOutcome::Partial(offset) => {
                            debug!(offset, "resuming upload");
                            State::Transmitting
                        }
                        ChunkOutcome::ClientError(response) => {
                            State::Failed(Error::ChunkUploadClient(Box::new(response)))
                        }
                        ChunkOutcome::TransientError(cause) => State::RetryWaiting(cause),
                    }
                }
                State::Complete(resource) => {
                    session.acknowledge(session.total_len());
                    self.report(&session, options, UploadPhase::Completed);
                    info!(
                        id = resource.id().unwrap_or_default(),
                        bytes = session.total_len(),
                        "upload complete"
                    );
                    return Ok(resource);
                }
                State::Failed(e) => {
                    warn!(error = %e, offset = session.offset(), "upload failed");
                    return Err(e);
                }
            };
        }
    }

    /// Like [`upload`](Self::upload), but gives up with [`Error::Cancelled`]
    /// as soon as `cancel` resolves.
    ///
    /// The in-flight request and any pending backoff timer are dropped; no
    /// further requests are made.
    pub async fn upload_until<S, F>(
        &self,
        payload: &Payload<S>,
        options: &UploadOptions,
        cancel: F,
    ) -> Result<UploadedResource>
    where
        S: ByteSource,
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            () = cancel => {
                info!("upload cancelled");
                Err(Error::Cancelled)
            }
            result = self.upload(payload, options) => result,
        }
    }

    fn report(&self, session: &UploadSession, options: &UploadOptions, phase: UploadPhase) {
        let mut progress = Progress::new(phase, session.offset(), session.total_len());
        progress.retry_count = session.failures();
        notify(options.on_progress.as_ref(), &progress);
    }
}

fn validate(options: &UploadOptions) -> Result<()> {
    if options.base_url.is_empty() {
        return Err(Error::InvalidOptions("base_url is empty".to_string()));
    }
    if options.retry.base_interval > options.retry.max_interval {
        return Err(Error::InvalidOptions(format!(
            "base interval {:?} exceeds max interval {:?}",
            options.retry.base_interval, options.retry.max_interval
        )));
    }
    Ok(())
}

/// Count the failure against the retry bounds. Hands the cause back when
/// another attempt is allowed.
fn check_budget(
    session: &mut UploadSession,
    options: &UploadOptions,
    started: Instant,
    cause: TransientCause,
) -> Result<TransientCause> {
    let attempts = session.record_failure();
    if options.retry.max_attempts.is_some_and(|max| attempts > max) {
        return Err(Error::RetriesExhausted {
            attempts,
            last: cause,
        });
    }
    if let Some(deadline) = options.retry.deadline {
        if started.elapsed() + session.retry().interval() > deadline {
            return Err(Error::DeadlineExceeded { deadline, last: cause });
        }
    }
    Ok(cause)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RetryPolicy;
    use std::time::Duration;

    #[test]
    fn rejects_inverted_intervals() {
        let options = UploadOptions::default().retry(
            RetryPolicy::default()
                .base_interval(Duration::from_secs(10))
                .max_interval(Duration::from_secs(1)),
        );
        assert!(matches!(validate(&options), Err(Error::InvalidOptions(_))));
        assert!(validate(&UploadOptions::default()).is_ok());
    }

    #[test]
    fn rejects_empty_base_url() {
        let options = UploadOptions::default().base_url("");
        assert!(matches!(validate(&options), Err(Error::InvalidOptions(_))));
    }
}

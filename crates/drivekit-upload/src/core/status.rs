/// Status code of an incomplete resumable upload ("Resume Incomplete").
pub const RESUME_INCOMPLETE: u16 = 308;

/// How a response to a chunk transmission or probe drives the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 200 or 201: the body is the final resource.
    Complete,
    /// 308: the server holds a prefix of the payload.
    Partial,
    /// Any other status below 500: terminal, never retried.
    ClientError,
    /// 500 and above: retried after a backoff.
    Transient,
}

/// Classify a chunk or probe response status.
///
/// # Examples
///
/// ```
/// use drivekit_upload::core::{classify, StatusClass};
///
/// assert_eq!(classify(201), StatusClass::Complete);
/// assert_eq!(classify(308), StatusClass::Partial);
/// assert_eq!(classify(403), StatusClass::ClientError);
/// assert_eq!(classify(503), StatusClass::Transient);
/// ```
pub fn classify(status: u16) -> StatusClass {
    match status {
        200 | 201 => StatusClass::Complete,
        RESUME_INCOMPLETE => StatusClass::Partial,
        s if s >= 500 => StatusClass::Transient,
        _ => StatusClass::ClientError,
    }
}

/// End (exclusive) of the next chunk starting at `offset`.
///
/// A `chunk_size` of 0 means the remainder of the payload.
///
/// # Examples
///
/// ```
/// use drivekit_upload::core::chunk_end;
///
/// assert_eq!(chunk_end(0, 20_000_000, 25_000_000), 20_000_000);
/// assert_eq!(chunk_end(20_000_000, 20_000_000, 25_000_000), 25_000_000);
/// assert_eq!(chunk_end(1000, 0, 5000), 5000);
/// ```
pub fn chunk_end(offset: u64, chunk_size: u64, total: u64) -> u64 {
    if chunk_size > 0 {
        offset.saturating_add(chunk_size).min(total)
    } else {
        total
    }
}

/// `Content-Range` value for sending `[start, end)` of a `total`-byte payload.
///
/// An empty range cannot be written as `first-last`, so it is sent in the
/// unknown-range form `bytes */{total}`.
pub fn content_range(start: u64, end: u64, total: u64) -> String {
    if end <= start {
        return probe_range(total);
    }
    format!("bytes {}-{}/{}", start, end - 1, total)
}

/// `Content-Range` value of a zero-length status probe.
pub fn probe_range(total: u64) -> String {
    format!("bytes */{total}")
}

/// Next offset implied by a `Range` response header such as `bytes=0-999`.
///
/// The last number in the header is the last byte the server holds, so the
/// next offset is one past it. Returns `None` when the header carries no number.
pub fn offset_after_range(header: &str) -> Option<u64> {
    header
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .next_back()?
        .parse::<u64>()
        .ok()?
        .checked_add(1)
}

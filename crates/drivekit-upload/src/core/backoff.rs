use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Largest jitter term, in milliseconds.
pub const MAX_JITTER_MS: u64 = 999;

/// Calculate the interval that follows `interval` after a failure.
///
/// The formula is: `min(interval * 2 + jitter, max)`
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use drivekit_upload::core::next_interval;
///
/// let max = Duration::from_secs(60);
/// assert_eq!(
///     next_interval(Duration::from_millis(1000), Duration::from_millis(250), max),
///     Duration::from_millis(2250)
/// );
///
/// // The ceiling wins over doubling
/// assert_eq!(next_interval(Duration::from_secs(40), Duration::ZERO, max), max);
/// ```
pub fn next_interval(interval: Duration, jitter: Duration, max: Duration) -> Duration {
    interval.saturating_mul(2).saturating_add(jitter).min(max)
}

/// Draw a jitter term: a whole number of milliseconds in `[0, 999]`.
///
/// Each call draws independently.
pub fn jitter() -> Duration {
    Duration::from_millis(rand::rng().random_range(0..=MAX_JITTER_MS))
}

/// Exponential backoff with jitter, enforced with a timer.
///
/// Holds the retry interval of one upload session. The interval starts at
/// `base`, grows after each wait, and drops back to `base` on [`reset`].
/// Waiting suspends the task on a tokio timer and never blocks a thread.
///
/// [`reset`]: BackoffScheduler::reset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffScheduler {
    interval: Duration,
    base: Duration,
    max: Duration,
}

impl Default for BackoffScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), Duration::from_millis(60_000))
    }
}

impl BackoffScheduler {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            interval: base,
            base,
            max,
        }
    }

    /// Delay the next wait will last.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Restore the base interval.
    pub fn reset(&mut self) {
        self.interval = self.base;
    }

    /// Grow the interval without waiting. Returns the interval it replaced.
    pub fn advance(&mut self) -> Duration {
        let current = self.interval;
        self.interval = next_interval(current, jitter(), self.max);
        current
    }

    /// Sleep for the current interval, then grow it. Returns the time slept.
    pub async fn wait(&mut self) -> Duration {
        let delay = self.interval;
        tokio::time::sleep(delay).await;
        self.advance();
        delay
    }

    /// Invoke `action` once the current interval has elapsed, growing the
    /// interval before the action runs to completion.
    pub async fn schedule<F, Fut>(&mut self, action: F) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        tokio::time::sleep(self.interval).await;
        let pending = action();
        self.advance();
        pending.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    const MAX: Duration = Duration::from_millis(60_000);

    #[test]
    fn test_next_interval_doubles_and_adds_jitter() {
        let base = Duration::from_millis(1000);
        assert_eq!(next_interval(base, Duration::ZERO, MAX), Duration::from_millis(2000));
        assert_eq!(
            next_interval(base, Duration::from_millis(999), MAX),
            Duration::from_millis(2999)
        );
    }

    #[test]
    fn test_next_interval_caps_at_max() {
        assert_eq!(
            next_interval(Duration::from_millis(30_000), Duration::from_millis(1), MAX),
            MAX
        );
        assert_eq!(next_interval(MAX, Duration::from_millis(999), MAX), MAX);
    }

    #[test]
    fn test_next_interval_overflow_protection() {
        let huge = Duration::from_secs(u64::MAX / 2);
        assert_eq!(next_interval(huge, Duration::from_millis(999), MAX), MAX);
    }

    #[test]
    fn test_jitter_is_whole_milliseconds_in_range() {
        for _ in 0..1000 {
            let j = jitter();
            assert!(j <= Duration::from_millis(MAX_JITTER_MS));
            assert_eq!(j.as_nanos() % 1_000_000, 0);
        }
    }

    #[test]
    fn test_starts_at_base() {
        assert_eq!(BackoffScheduler::default().interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_one_failure_lands_between_2000_and_2999() {
        let mut backoff = BackoffScheduler::default();
        assert_eq!(backoff.advance(), Duration::from_millis(1000));
        let interval = backoff.interval();
        assert!(interval >= Duration::from_millis(2000), "{interval:?}");
        assert!(interval <= Duration::from_millis(2999), "{interval:?}");
    }

    #[test]
    fn test_reset_restores_base() {
        let mut backoff = BackoffScheduler::default();
        for _ in 0..4 {
            backoff.advance();
        }
        assert!(backoff.interval() > Duration::from_millis(1000));
        backoff.reset();
        assert_eq!(backoff.interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_never_exceeds_ceiling() {
        let mut backoff = BackoffScheduler::default();
        let mut previous = backoff.interval();
        for _ in 0..200 {
            backoff.advance();
            assert!(backoff.interval() <= MAX);
            assert!(backoff.interval() >= previous);
            previous = backoff.interval();
        }
        assert_eq!(backoff.interval(), MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_sleeps_current_interval_then_grows() {
        let mut backoff = BackoffScheduler::default();
        let started = Instant::now();
        let slept = backoff.wait().await;
        assert_eq!(slept, Duration::from_millis(1000));
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert!(backoff.interval() >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_runs_action_after_delay() {
        let mut backoff = BackoffScheduler::new(Duration::from_millis(50), MAX);
        let started = Instant::now();
        let value = backoff.schedule(|| async { 7 }).await;
        assert_eq!(value, 7);
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(backoff.interval() >= Duration::from_millis(100));
    }
}

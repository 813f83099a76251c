use std::sync::Arc;

use drivekit_upload::{Progress, ProgressObserver, UploadPhase};
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

const PB_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {wide_msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

/// Terminal progress bar fed by upload progress notifications.
pub struct UploadTracker {
    pb: ProgressBar,
}

impl UploadTracker {
    pub fn new(len: u64, prefix: &str) -> Self {
        let pb = ProgressBar::new(len);
        let pb = match PB_TEMPLATE.as_ref() {
            Some(style) => pb.with_style(style.clone()),
            None => pb,
        };
        pb.set_prefix(prefix.to_string());
        Self { pb }
    }

    /// Observer to hand to the upload options.
    pub fn observer(&self) -> ProgressObserver {
        let pb = self.pb.clone();
        Arc::new(move |progress: &Progress| {
            pb.set_position(progress.bytes_sent);
            pb.set_message(status_line(progress));
        })
    }

    pub fn finish(self, msg: &str) {
        self.pb.finish_with_message(msg.to_string());
    }

    pub fn abandon(self, msg: &str) {
        self.pb.abandon_with_message(msg.to_string());
    }
}

fn status_line(progress: &Progress) -> String {
    match (progress.phase, progress.retry_delay) {
        (UploadPhase::RetryWaiting, Some(delay)) => format!(
            "retry #{} in {:.1}s",
            progress.retry_count,
            delay.as_secs_f64()
        ),
        (phase, _) => phase.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn progress(phase: UploadPhase, retry_delay: Option<Duration>) -> Progress {
        Progress {
            phase,
            bytes_sent: 10,
            total_bytes: 100,
            retry_count: 2,
            retry_delay,
        }
    }

    #[test]
    fn status_line_shows_pending_retry() {
        assert_eq!(
            status_line(&progress(UploadPhase::RetryWaiting, Some(Duration::from_millis(2500)))),
            "retry #2 in 2.5s"
        );
        assert_eq!(status_line(&progress(UploadPhase::Transmitting, None)), "Transmitting");
    }

    #[test]
    fn observer_moves_the_bar() {
        let tracker = UploadTracker::new(100, "test");
        let observer = tracker.observer();
        observer(&progress(UploadPhase::Transmitting, None));
        assert_eq!(tracker.pb.position(), 10);
    }
}

use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::data::{Progress, ProgressObserver};

/// Hand `progress` to the observer, if any.
///
/// Observers are advisory: a panic inside one is logged and swallowed so it
/// can never change the course of an upload.
pub(crate) fn notify(observer: Option<&ProgressObserver>, progress: &Progress) {
    let Some(observer) = observer else {
        return;
    };
    if panic::catch_unwind(AssertUnwindSafe(|| observer(progress))).is_err() {
        warn!(phase = %progress.phase, "progress observer panicked");
    }
}

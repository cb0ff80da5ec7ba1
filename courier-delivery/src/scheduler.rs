//! Delayed execution of delivery attempts

use std::{future::Future, sync::Arc, time::Duration};

use courier_common::{EmailSubmission, tracing::trace};
use tokio::{runtime::Handle, time::Instant};

/// Longest single timer; longer delays are slept in steps.
const MAX_TIMER: Duration = Duration::from_secs(24 * 60 * 60);

/// Runs a callback once a submission's delay has elapsed.
///
/// Every scheduled item gets its own task and timer, so items fire
/// independently of each other and in no particular order. There is no way
/// to cancel an item once scheduled.
#[derive(Debug, Clone)]
pub struct Scheduler {
    handle: Handle,
}

impl Scheduler {
    #[must_use]
    pub const fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Scheduler on the runtime of the caller.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    #[must_use]
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Calls `on_fire(submission, needs_confirmation)` exactly once, no
    /// earlier than `submission.delay_secs()` seconds from now.
    pub fn schedule<F, Fut>(
        &self,
        submission: Arc<EmailSubmission>,
        needs_confirmation: bool,
        on_fire: F,
    ) where
        F: FnOnce(Arc<EmailSubmission>, bool) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = Duration::from_secs(submission.delay_secs());
        trace!(
            "Scheduling {} to fire in {}s",
            submission.id(),
            delay.as_secs()
        );

        self.handle.spawn(async move {
            let deadline = Instant::now() + delay;
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                tokio::time::sleep(remaining.min(MAX_TIMER)).await;
            }
            on_fire(submission, needs_confirmation).await;
        });
    }
}

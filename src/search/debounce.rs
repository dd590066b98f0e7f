use crate::config::DEFAULT_DEBOUNCE_MS;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Quiet window before typed location text is mirrored.
pub const LOCATION_DEBOUNCE: Duration = Duration::from_millis(DEFAULT_DEBOUNCE_MS);

/// Cancellable delayed mirror of a rapidly changing value.
///
/// Each [`push`](Debouncer::push) arms a timer for the window and drops any
/// timer still pending, so only the last value of a burst comes out of
/// [`next`](Debouncer::next). Must be used inside a tokio runtime.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Restart the timer with a new value
    pub fn push(&mut self, value: T) {
        self.cancel();
        // deadline is fixed here, not when the task is first polled
        let delay = sleep(self.window);
        self.pending = Some(tokio::spawn(async move {
            delay.await;
            value
        }));
    }

    /// Drop the pending value, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait for the pending value to settle. `None` when nothing is pending.
    pub async fn next(&mut self) -> Option<T> {
        let handle = self.pending.take()?;
        handle.await.ok()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

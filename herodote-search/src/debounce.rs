//! Trailing-edge debounce timer.

use std::time::Duration;
use tokio::time::Instant;

/// A single re-armable "settle after a quiet period" timer.
///
/// Arming replaces any pending value and restarts the quiet window, so at most
/// one timer is ever pending. [`Debouncer::settled`] resolves once, with the
/// last armed value, after the window elapses without another arm.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Start (or restart) the quiet window for `value`.
    pub fn arm(&mut self, value: T) {
        self.pending = Some((Instant::now() + self.quiet, value));
    }

    /// Drop the pending fire, returning its value.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait for the armed value to settle. Never resolves while disarmed.
    ///
    /// Cancel safe: dropping the future keeps the pending value armed.
    pub async fn settled(&mut self) -> T {
        let Some(deadline) = self.pending.as_ref().map(|(deadline, _)| *deadline) else {
            return std::future::pending().await;
        };

        tokio::time::sleep_until(deadline).await;

        match self.pending.take() {
            Some((_, value)) => value,
            None => std::future::pending().await,
        }
    }
}

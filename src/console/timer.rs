use std::future::pending;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, Sleep};

/// Cancellable one-shot timer; scheduling replaces any pending deadline
#[derive(Debug, Default)]
pub struct ClearTimer {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ClearTimer {
    pub fn schedule(&mut self, delay: Duration) {
        self.sleep = Some(Box::pin(sleep(delay)));
    }

    /// Returns true if a pending deadline was dropped
    pub fn cancel(&mut self) -> bool {
        self.sleep.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.sleep.is_some()
    }

    /// Resolves when the pending deadline passes; never resolves when idle
    ///
    /// Cancel-safe: dropping the future keeps the deadline armed.
    pub async fn fired(&mut self) {
        match self.sleep.as_mut() {
            Some(deadline) => deadline.await,
            None => pending::<()>().await,
        }
        self.sleep = None;
    }
}

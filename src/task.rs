use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// A spawned unit of work owned by whoever holds it.
///
/// Dropping the task aborts it; a scope that owns timers or fetches cancels
/// them simply by going away.
#[derive(Debug)]
#[must_use = "dropping a ScheduledTask aborts it"]
pub struct ScheduledTask {
    label: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn spawn<F>(label: &'static str, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            label,
            handle: Some(tokio::spawn(future)),
        }
    }

    /// Run `f` once `delay` has elapsed, unless cancelled first.
    pub fn after<F>(label: &'static str, delay: Duration, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::spawn(label, async move {
            tokio::time::sleep(delay).await;
            f();
        })
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|handle| handle.is_finished())
    }

    pub fn cancel(mut self) {
        self.abort();
    }

    /// Wait for completion. Returns `false` if the task was aborted or panicked.
    pub async fn join(mut self) -> bool {
        match self.handle.take() {
            Some(handle) => handle.await.is_ok(),
            None => false,
        }
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                debug!("Cancelling task: {}", self.label);
            }
            handle.abort();
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.abort();
    }
}

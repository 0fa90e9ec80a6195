//! Fixed-interval refresh of a view's data.
//!
//! A poller delivers results only while its view is mounted. Tearing it down
//! does not cancel a request already in flight; that result is dropped.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::ApiError;

/// Refresh interval of the dashboard views.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug)]
struct Lifecycle {
    mounted: AtomicBool,
    stop: Notify,
}

/// Owner side of a running poller. Dropping it tears the poller down.
#[derive(Debug)]
pub struct PollHandle {
    lifecycle: Arc<Lifecycle>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn is_mounted(&self) -> bool {
        self.lifecycle.mounted.load(Ordering::Acquire)
    }

    /// Stop delivering results. Idempotent.
    pub fn teardown(&self) {
        if self.lifecycle.mounted.swap(false, Ordering::AcqRel) {
            self.lifecycle.stop.notify_one();
        }
    }

    /// Tear down and wait for the loop to exit, including any fetch in flight.
    pub async fn join(mut self) {
        self.teardown();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "poll task ended abnormally");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Run `fetch` now and then every `every`, handing each result to `deliver`.
pub fn spawn_poller<T, F, Fut, D>(every: Duration, mut fetch: F, mut deliver: D) -> PollHandle
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    D: FnMut(Result<T, ApiError>) + Send + 'static,
{
    let lifecycle = Arc::new(Lifecycle { mounted: AtomicBool::new(true), stop: Notify::new() });
    let state = Arc::clone(&lifecycle);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = state.stop.notified() => break,
            }
            if !state.mounted.load(Ordering::Acquire) {
                break;
            }

            let result = fetch().await;

            if !state.mounted.load(Ordering::Acquire) {
                tracing::debug!("discarding result fetched after teardown");
                break;
            }
            deliver(result);
        }

        tracing::debug!("poller stopped");
    });

    PollHandle { lifecycle, task: Some(task) }
}

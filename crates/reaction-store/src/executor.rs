//! Bounded task pool and single-delivery result channels.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use reaction_core::{Operation, StoreError, StoreResult};
use tokio::sync::{oneshot, Semaphore};
use tracing::{debug, info_span, Instrument};

/// Deferred result of a store operation
///
/// Resolves exactly once, either by awaiting it or via [`StoreChannel::recv`].
/// Dropping the channel does not cancel the operation.
#[must_use = "the operation runs regardless, but its result is lost if the channel is dropped"]
pub struct StoreChannel<T> {
    rx: oneshot::Receiver<StoreResult<T>>,
}

impl<T> StoreChannel<T> {
    /// Wait for the operation's result
    pub async fn recv(self) -> StoreResult<T> {
        self.await
    }
}

impl<T> Future for StoreChannel<T> {
    type Output = StoreResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // A closed sender means the task died before reporting.
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|delivered| delivered.unwrap_or(Err(StoreError::Unavailable)))
    }
}

impl<T> std::fmt::Debug for StoreChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreChannel").finish_non_exhaustive()
    }
}

/// Runs store operations as tokio tasks, at most `max_in_flight` at once
///
/// Tasks beyond the limit are spawned immediately but wait for a permit
/// before touching storage.
#[derive(Debug, Clone)]
pub struct TaskPool {
    permits: Arc<Semaphore>,
    max_in_flight: usize,
}

impl TaskPool {
    /// Create a pool; a limit of zero is raised to one
    pub fn new(max_in_flight: usize) -> Self {
        let max_in_flight = max_in_flight.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Permits not currently held by a running operation
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Stop accepting work; queued and future operations resolve to
    /// `StoreError::Unavailable`
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Spawn `work` and return the channel its result is delivered on
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn spawn<T, F>(&self, op: Operation, work: F) -> StoreChannel<T>
    where
        T: Send + 'static,
        F: Future<Output = StoreResult<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let permits = Arc::clone(&self.permits);

        let task = async move {
            let result = match permits.acquire_owned().await {
                Ok(_permit) => work.await,
                Err(_) => Err(StoreError::Unavailable),
            };

            if tx.send(result).is_err() {
                debug!("Result channel dropped before delivery");
            }
        };

        tokio::spawn(task.instrument(info_span!("reaction_store", op = %op)));

        StoreChannel { rx }
    }
}

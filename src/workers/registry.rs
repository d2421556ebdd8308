use crate::workers::order_status_poller::{OrderStatusPoller, PollState};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

/// Supervises the background pollers: one task per order, all sharing a
/// shutdown signal, each individually cancellable.
#[derive(Clone)]
pub struct PollerRegistry {
    shutdown_tx: Arc<watch::Sender<bool>>,
    handles: Arc<Mutex<HashMap<Uuid, JoinHandle<PollState>>>>,
}

impl Default for PollerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PollerRegistry {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutdown_tx: Arc::new(shutdown_tx),
            handles: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn handles(&self) -> MutexGuard<'_, HashMap<Uuid, JoinHandle<PollState>>> {
        self.handles.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Starts `poller` as a detached task. A poller already running for the
    /// same order is aborted and replaced.
    pub fn spawn(&self, poller: OrderStatusPoller) {
        let order_id = poller.order_id();
        let shutdown_rx = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(poller.run(shutdown_rx));

        let mut handles = self.handles();
        handles.retain(|_, h| !h.is_finished());
        if let Some(previous) = handles.insert(order_id, handle) {
            warn!(order_id = %order_id, "replacing running poller");
            previous.abort();
        }
    }

    /// Number of pollers that have not finished yet.
    pub fn active_count(&self) -> usize {
        let mut handles = self.handles();
        handles.retain(|_, h| !h.is_finished());
        handles.len()
    }

    pub fn is_polling(&self, order_id: Uuid) -> bool {
        self.handles()
            .get(&order_id)
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Aborts the poller for `order_id`. The order keeps its current status.
    pub fn cancel(&self, order_id: Uuid) -> bool {
        match self.handles().remove(&order_id) {
            Some(handle) => {
                handle.abort();
                info!(order_id = %order_id, "order status poller cancelled");
                true
            }
            None => false,
        }
    }

    /// Waits for the poller of `order_id` to finish and returns its final state.
    pub async fn wait(&self, order_id: Uuid) -> Option<Result<PollState, JoinError>> {
        let handle = self.handles().remove(&order_id)?;
        Some(handle.await)
    }

    /// Signals every poller to stop and waits up to `timeout` for them.
    /// Pollers still running after the deadline are aborted.
    pub async fn shutdown(&self, timeout: Duration) {
        self.shutdown_tx.send_replace(true);
        let handles: Vec<(Uuid, JoinHandle<PollState>)> = self.handles().drain().collect();
        if handles.is_empty() {
            return;
        }
        info!(pollers = handles.len(), "stopping order status pollers");

        let aborts: Vec<_> = handles.iter().map(|(_, h)| h.abort_handle()).collect();
        let joined = futures::future::join_all(handles.into_iter().map(|(_, h)| h));
        if tokio::time::timeout(timeout, joined).await.is_err() {
            warn!(
                timeout_secs = timeout.as_secs_f64(),
                "timed out waiting for pollers; aborting the rest"
            );
            for abort in aborts {
                abort.abort();
            }
        }
    }
}

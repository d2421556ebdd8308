use crate::gateway::{DepositGateway, GatewayError, OrderStatus, OrderStatusRequest};
use crate::orders::{OrderStore, PaymentStatus, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while polling. They are logged; the visible outcome is the
/// order's terminal payment status.
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    /// The attempt ceiling was reached without a final gateway status.
    #[error("no final status for order {order_id} after {attempts} attempt(s)")]
    Exhausted { order_id: Uuid, attempts: u32 },

    /// Writing the terminal status back to the order failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay before the first status query and between subsequent ones.
    pub poll_interval: Duration,
    /// Every tick counts as an attempt, whether or not the gateway call succeeded.
    pub max_attempts: u32,
    /// How long shutdown waits for running pollers to stop.
    pub shutdown_timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            max_attempts: 20,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Approved,
    Failed,
}

impl PollState {
    /// `APPROVED` maps to `Approved`; every other final status is a failure.
    pub fn from_final(status: OrderStatus) -> Self {
        if status == OrderStatus::Approved {
            PollState::Approved
        } else {
            PollState::Failed
        }
    }

    pub fn payment_status(&self) -> Option<PaymentStatus> {
        match self {
            PollState::Polling => None,
            PollState::Approved => Some(PaymentStatus::Approved),
            PollState::Failed => Some(PaymentStatus::Failed),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.payment_status().is_some()
    }
}

/// Polls the gateway for one order until it reports a final status or the
/// attempt ceiling is reached, then writes the outcome back to the store.
pub struct OrderStatusPoller {
    gateway: Arc<dyn DepositGateway>,
    store: OrderStore,
    order_id: Uuid,
    request: OrderStatusRequest,
    config: PollerConfig,
    attempts: u32,
    state: PollState,
}

impl OrderStatusPoller {
    pub fn new(
        gateway: Arc<dyn DepositGateway>,
        store: OrderStore,
        order_id: Uuid,
        request: OrderStatusRequest,
        config: PollerConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            order_id,
            request,
            config,
            attempts: 0,
            state: PollState::Polling,
        }
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) -> PollState {
        info!(
            order_id = %self.order_id,
            gateway_order_id = %self.request.order_id,
            poll_interval_secs = self.config.poll_interval.as_secs_f64(),
            max_attempts = self.config.max_attempts,
            "order status poller started"
        );

        let period = self.config.poll_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !self.state.is_terminal() {
            if *shutdown_rx.borrow() {
                info!(order_id = %self.order_id, attempts = self.attempts, "order status poller stopping");
                break;
            }

            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        info!(order_id = %self.order_id, "poller supervisor gone, stopping");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }

        info!(
            order_id = %self.order_id,
            state = ?self.state,
            attempts = self.attempts,
            "order status poller stopped"
        );
        self.state
    }

    /// Runs one timer tick of the state machine and returns the resulting state.
    ///
    /// A terminal transition is written to the store before returning. Ticks
    /// after a terminal state are no-ops.
    pub async fn tick(&mut self) -> PollState {
        if self.state.is_terminal() {
            return self.state;
        }

        if self.attempts >= self.config.max_attempts {
            let err = PollerError::Exhausted {
                order_id: self.order_id,
                attempts: self.attempts,
            };
            warn!(error = %err, "order status polling exhausted");
            return self.transition(PollState::Failed).await;
        }

        self.attempts += 1;
        let next = match self.gateway.order_status(&mut self.request).await {
            Ok(response) if !response.is_success() => {
                warn!(
                    order_id = %self.order_id,
                    attempt = self.attempts,
                    code = %response.code,
                    message = response.message.as_deref().unwrap_or(""),
                    "non-OK order status response"
                );
                PollState::Polling
            }
            Ok(response) => match &response.data {
                None => {
                    debug!(
                        order_id = %self.order_id,
                        attempt = self.attempts,
                        "order status response carried no data"
                    );
                    PollState::Polling
                }
                Some(data) if data.status.is_final() => {
                    info!(
                        order_id = %self.order_id,
                        merchant_order_id = %data.merchant_order_id,
                        status = %data.status,
                        attempt = self.attempts,
                        "final order status received"
                    );
                    PollState::from_final(data.status)
                }
                Some(data) => {
                    debug!(
                        order_id = %self.order_id,
                        status = %data.status,
                        attempt = self.attempts,
                        "order not in a final status yet"
                    );
                    PollState::Polling
                }
            },
            Err(e @ GatewayError::Rejected { .. }) => {
                warn!(
                    order_id = %self.order_id,
                    attempt = self.attempts,
                    error = %e,
                    "order status query rejected"
                );
                PollState::Polling
            }
            Err(e) => {
                warn!(
                    order_id = %self.order_id,
                    attempt = self.attempts,
                    error = %e,
                    "order status query failed"
                );
                PollState::Polling
            }
        };

        if next.is_terminal() {
            self.transition(next).await
        } else {
            self.state
        }
    }

    async fn transition(&mut self, next: PollState) -> PollState {
        self.state = next;
        if let Some(status) = next.payment_status() {
            if let Err(e) = self.write_back(status).await {
                error!(order_id = %self.order_id, error = %e, "failed to record payment status");
            }
        }
        self.state
    }

    async fn write_back(&self, status: PaymentStatus) -> Result<(), PollerError> {
        let order = self.store.finalize(self.order_id, status).await?;
        info!(
            order_id = %order.id(),
            payment_status = %order.payment_status,
            "payment status recorded"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

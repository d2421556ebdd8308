//! Deposit flow
//!
//! Creates the order, submits the signed deposit to the gateway and hands the
//! order over to a background status poller. The caller gets the gateway's
//! deposit URL back as soon as the deposit is accepted.

use crate::gateway::{
    DepositGateway, DepositRequest, DepositSettings, GatewayError, OrderStatusRequest,
};
use crate::orders::{Order, OrderStore, StoreError, User};
use crate::workers::{OrderStatusPoller, PollerConfig, PollerRegistry};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_MAX_INSERT_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Error)]
pub enum DepositFlowError {
    #[error("could not store a new order after {attempts} attempt(s): {source}")]
    OrderNotStored {
        attempts: u32,
        #[source]
        source: StoreError,
    },

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("deposit for order {order_id} was accepted without a payload")]
    MissingDepositData { order_id: Uuid },
}

impl DepositFlowError {
    pub fn http_status_code(&self) -> u16 {
        match self {
            DepositFlowError::OrderNotStored { .. } => 500,
            DepositFlowError::Gateway(e) => e.http_status_code(),
            DepositFlowError::MissingDepositData { .. } => 502,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            DepositFlowError::OrderNotStored { .. } => "Unable to add new order".to_string(),
            DepositFlowError::Gateway(e) => e.user_message(),
            DepositFlowError::MissingDepositData { .. } => {
                "Payment gateway returned an incomplete response".to_string()
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            DepositFlowError::OrderNotStored { .. } => true,
            DepositFlowError::Gateway(e) => e.is_retryable(),
            DepositFlowError::MissingDepositData { .. } => false,
        }
    }
}

/// Outcome handed back to the request that started the deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositStarted {
    pub order_id: Uuid,
    pub gateway_order_id: String,
    pub deposit_url: String,
}

/// Inserts the order produced by `make_order`, asking for a fresh one (and so
/// a fresh id) whenever the id is already taken.
pub async fn insert_with_retry<F>(
    store: &OrderStore,
    max_attempts: u32,
    mut make_order: F,
) -> Result<Order, DepositFlowError>
where
    F: FnMut() -> Order,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let order = make_order();
        match store.insert(order.clone()).await {
            Ok(()) => return Ok(order),
            Err(e @ StoreError::DuplicateKey { .. }) if attempt < max_attempts => {
                warn!(error = %e, attempt, "order id collision, retrying with a new id");
            }
            Err(source) => {
                return Err(DepositFlowError::OrderNotStored {
                    attempts: attempt,
                    source,
                })
            }
        }
    }
}

pub struct DepositFlow {
    store: OrderStore,
    gateway: Arc<dyn DepositGateway>,
    settings: DepositSettings,
    pollers: PollerRegistry,
    poller_config: PollerConfig,
    max_insert_attempts: u32,
}

impl DepositFlow {
    pub fn new(
        store: OrderStore,
        gateway: Arc<dyn DepositGateway>,
        settings: DepositSettings,
        pollers: PollerRegistry,
        poller_config: PollerConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            settings,
            pollers,
            poller_config,
            max_insert_attempts: DEFAULT_MAX_INSERT_ATTEMPTS,
        }
    }

    pub fn with_max_insert_attempts(mut self, attempts: u32) -> Self {
        self.max_insert_attempts = attempts;
        self
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    pub fn pollers(&self) -> &PollerRegistry {
        &self.pollers
    }

    pub async fn start_deposit(
        &self,
        user: &User,
        amount: Decimal,
        description: &str,
    ) -> Result<DepositStarted, DepositFlowError> {
        let order = insert_with_retry(&self.store, self.max_insert_attempts, || {
            user.place_order(amount, description)
        })
        .await?;
        let order_id = order.id();
        info!(order_id = %order_id, amount = %order.amount_str(), "order created");

        let request = DepositRequest::from_order(&order, &self.settings);
        let response = self.gateway.deposit(&request).await.map_err(|e| {
            warn!(order_id = %order_id, error = %e, "deposit request failed");
            e
        })?;
        let data = response
            .data
            .ok_or(DepositFlowError::MissingDepositData { order_id })?;

        let poller = OrderStatusPoller::new(
            self.gateway.clone(),
            self.store.clone(),
            order_id,
            OrderStatusRequest::new(data.order_id.clone(), data.merchant_order_id.clone()),
            self.poller_config.clone(),
        );
        self.pollers.spawn(poller);

        info!(
            order_id = %order_id,
            gateway_order_id = %data.order_id,
            "deposit started, polling order status"
        );

        Ok(DepositStarted {
            order_id,
            gateway_order_id: data.order_id,
            deposit_url: data.deposit_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::types::fixtures;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn insert_retries_with_fresh_id_on_collision() {
        let store = OrderStore::new();
        let taken = Uuid::new_v4();
        store
            .insert(Order::with_id(taken, fixtures::user(), dec!(1), "existing"))
            .await
            .unwrap();

        let mut ids = vec![taken, taken, Uuid::new_v4()].into_iter();
        let order = insert_with_retry(&store, 10, || {
            Order::with_id(ids.next().unwrap(), fixtures::user(), dec!(2), "new")
        })
        .await
        .unwrap();

        assert_ne!(order.id(), taken);
        assert_eq!(store.len().await, 2);
        assert_eq!(store.get(taken).await.unwrap().description, "existing");
    }

    #[tokio::test]
    async fn insert_gives_up_after_max_attempts() {
        let store = OrderStore::new();
        let taken = Uuid::new_v4();
        store
            .insert(Order::with_id(taken, fixtures::user(), dec!(1), "existing"))
            .await
            .unwrap();

        let mut calls = 0;
        let err = insert_with_retry(&store, 3, || {
            calls += 1;
            Order::with_id(taken, fixtures::user(), dec!(2), "new")
        })
        .await
        .unwrap_err();

        assert_eq!(calls, 3);
        match err {
            DepositFlowError::OrderNotStored { attempts, source } => {
                assert_eq!(attempts, 3);
                assert_eq!(source, StoreError::DuplicateKey { id: taken });
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn flow_errors_map_to_http() {
        let err = DepositFlowError::from(GatewayError::rejected("400", Some("bad".to_string())));
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.user_message(), "bad");

        let err = DepositFlowError::MissingDepositData {
            order_id: Uuid::new_v4(),
        };
        assert_eq!(err.http_status_code(), 502);
        assert!(!err.is_retryable());
    }
}

use crate::orders::types::{Order, PaymentStatus};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("another order with id {id} already exists")]
    DuplicateKey { id: Uuid },

    #[error("order {id} not found")]
    NotFound { id: Uuid },

    #[error("order {id} already finalized as {status}")]
    AlreadyFinalized { id: Uuid, status: PaymentStatus },

    #[error("{status} is not a terminal payment status")]
    NotTerminal { status: PaymentStatus },
}

/// In-memory keyed collection of orders, shared by HTTP handlers and pollers.
///
/// Cloning is cheap and every clone sees the same orders. Contents are lost
/// when the process exits.
#[derive(Debug, Default, Clone)]
pub struct OrderStore {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `order`; never replaces an existing order with the same id.
    pub async fn insert(&self, order: Order) -> StoreResult<()> {
        let mut orders = self.orders.write().await;
        let id = order.id();
        if orders.contains_key(&id) {
            return Err(StoreError::DuplicateKey { id });
        }
        orders.insert(id, order);
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Option<Order> {
        let orders = self.orders.read().await;
        orders.get(&id).cloned()
    }

    /// Snapshot of every order, in no particular order.
    pub async fn list_all(&self) -> Vec<Order> {
        let orders = self.orders.read().await;
        orders.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    /// Moves a `pending` order to a terminal status. Allowed exactly once per order.
    pub async fn finalize(&self, id: Uuid, status: PaymentStatus) -> StoreResult<Order> {
        if !status.is_terminal() {
            return Err(StoreError::NotTerminal { status });
        }

        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(StoreError::NotFound { id })?;
        if order.payment_status.is_terminal() {
            return Err(StoreError::AlreadyFinalized {
                id,
                status: order.payment_status,
            });
        }
        order.payment_status = status;
        Ok(order.clone())
    }
}

//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use zota_deposit_backend::gateway::types::{DepositData, OrderStatusData};
use zota_deposit_backend::gateway::{
    DepositGateway, DepositRequest, DepositResponse, GatewayError, GatewayResult, OrderStatus,
    OrderStatusRequest, OrderStatusResponse,
};
use zota_deposit_backend::workers::PollerConfig;

pub const DEPOSIT_URL: &str = "https://secure.zotapay-sandbox.com/deposit/form/gw-1";
pub const GATEWAY_ORDER_ID: &str = "gw-1";

pub enum DepositOutcome {
    Accepted,
    AcceptedWithoutData,
    Fails(GatewayError),
}

/// In-process gateway: accepts (or refuses) deposits and replays a script of
/// order-status answers, repeating the last one once the script runs out.
pub struct FakeGateway {
    deposit: DepositOutcome,
    statuses: Mutex<VecDeque<GatewayResult<OrderStatus>>>,
    fallback: OrderStatus,
    pub deposits: Mutex<Vec<DepositRequest>>,
    pub status_queries: Mutex<Vec<OrderStatusRequest>>,
}

impl FakeGateway {
    pub fn new(deposit: DepositOutcome, fallback: OrderStatus) -> Self {
        Self {
            deposit,
            statuses: Mutex::new(VecDeque::new()),
            fallback,
            deposits: Mutex::new(Vec::new()),
            status_queries: Mutex::new(Vec::new()),
        }
    }

    pub fn accepting(fallback: OrderStatus) -> Self {
        Self::new(DepositOutcome::Accepted, fallback)
    }

    pub fn with_script(self, script: Vec<GatewayResult<OrderStatus>>) -> Self {
        *self.statuses.lock().unwrap() = script.into();
        self
    }

    pub fn deposit_count(&self) -> usize {
        self.deposits.lock().unwrap().len()
    }

    pub fn status_query_count(&self) -> usize {
        self.status_queries.lock().unwrap().len()
    }
}

#[async_trait]
impl DepositGateway for FakeGateway {
    async fn deposit(&self, request: &DepositRequest) -> GatewayResult<DepositResponse> {
        self.deposits.lock().unwrap().push(request.clone());
        match &self.deposit {
            DepositOutcome::Accepted => Ok(DepositResponse {
                code: "200".to_string(),
                message: None,
                data: Some(DepositData {
                    deposit_url: DEPOSIT_URL.to_string(),
                    merchant_order_id: request.merchant_order_id.clone(),
                    order_id: GATEWAY_ORDER_ID.to_string(),
                }),
            }),
            DepositOutcome::AcceptedWithoutData => Ok(DepositResponse {
                code: "200".to_string(),
                message: None,
                data: None,
            }),
            DepositOutcome::Fails(err) => Err(err.clone()),
        }
    }

    async fn order_status(
        &self,
        request: &mut OrderStatusRequest,
    ) -> GatewayResult<OrderStatusResponse> {
        self.status_queries.lock().unwrap().push(request.clone());
        let next = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(self.fallback));
        let status = next?;
        Ok(OrderStatusResponse {
            code: "200".to_string(),
            message: None,
            data: Some(OrderStatusData {
                kind: "SALE".to_string(),
                status,
                error_message: String::new(),
                processor_transaction_id: String::new(),
                order_id: request.order_id.clone(),
                merchant_order_id: request.merchant_order_id.clone(),
                amount: String::new(),
                currency: "USD".to_string(),
                customer_email: String::new(),
            }),
        })
    }
}

pub fn fast_poller(max_attempts: u32) -> PollerConfig {
    PollerConfig {
        poll_interval: Duration::from_millis(10),
        max_attempts,
        shutdown_timeout: Duration::from_secs(1),
    }
}

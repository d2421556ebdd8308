use crate::gateway::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of `code` on every successful Zota response. It is a string on the wire.
pub const SUCCESS_CODE: &str = "200";

/// Body of `POST /api/v1/deposit/request/{endpointID}/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub merchant_order_id: String,
    pub merchant_order_desc: String,
    pub order_amount: String,
    pub order_currency: String,

    pub customer_email: String,
    pub customer_first_name: String,
    pub customer_last_name: String,
    #[serde(rename = "customerIP")]
    pub customer_ip: String,
    pub customer_phone: String,

    pub customer_address: String,
    pub customer_country_code: String,
    pub customer_city: String,
    pub customer_zip_code: String,

    pub redirect_url: String,
    pub checkout_url: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepositData {
    #[serde(rename = "merchantOrderID")]
    pub merchant_order_id: String,
    #[serde(rename = "depositUrl")]
    pub deposit_url: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepositResponse {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<DepositData>,
}

impl DepositResponse {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Turns a non-success code into [`GatewayError::Rejected`].
    pub fn into_result(self) -> GatewayResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(GatewayError::rejected(self.code, self.message))
        }
    }
}

/// Gateway-side order status as reported by the order-status query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order was created
    Created,
    /// Order is being processed, continue polling
    Processing,
    Approved,
    Declined,
    /// Declined by the fraud-prevention system
    Filtered,
    /// Awaiting the next processing step
    Pending,
    /// Not a final status; gateway support should be informed
    Unknown,
    /// Declined due to a technical error on the gateway side
    Error,
}

impl OrderStatus {
    pub const FINAL: [OrderStatus; 4] = [
        OrderStatus::Approved,
        OrderStatus::Declined,
        OrderStatus::Filtered,
        OrderStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Approved => "APPROVED",
            OrderStatus::Declined => "DECLINED",
            OrderStatus::Filtered => "FILTERED",
            OrderStatus::Pending => "PENDING",
            OrderStatus::Unknown => "UNKNOWN",
            OrderStatus::Error => "ERROR",
        }
    }

    pub fn is_final(&self) -> bool {
        Self::FINAL.contains(self)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query parameters of `GET /api/v1/query/order-status/`.
///
/// `timestamp` and `signature` are regenerated by the client before every call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderStatusRequest {
    #[serde(rename = "orderID")]
    pub order_id: String,
    #[serde(rename = "merchantOrderID")]
    pub merchant_order_id: String,
    pub timestamp: i64,
    pub signature: String,
}

impl OrderStatusRequest {
    pub fn new(order_id: impl Into<String>, merchant_order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            merchant_order_id: merchant_order_id.into(),
            timestamp: 0,
            signature: String::new(),
        }
    }

    /// Stamps `timestamp` and recomputes the signature for it.
    pub fn sign_at(&mut self, timestamp: i64, merchant_id: &str, secret_key: &str) {
        self.timestamp = timestamp;
        self.signature = crate::gateway::signature::order_status_signature(
            merchant_id,
            &self.merchant_order_id,
            &self.order_id,
            timestamp,
            secret_key,
        );
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderStatusData {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub status: OrderStatus,
    #[serde(rename = "errorMessage", default)]
    pub error_message: String,
    #[serde(rename = "processorTransactionID", default)]
    pub processor_transaction_id: String,
    #[serde(rename = "orderID", default)]
    pub order_id: String,
    #[serde(rename = "merchantOrderID", default)]
    pub merchant_order_id: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(rename = "customerEmail", default)]
    pub customer_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderStatusResponse {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<OrderStatusData>,
}

impl OrderStatusResponse {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    pub fn into_result(self) -> GatewayResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(GatewayError::rejected(self.code, self.message))
        }
    }

    /// The reported status when it is final; `None` while there is no payload.
    pub fn final_status(&self) -> Option<OrderStatus> {
        self.data
            .as_ref()
            .map(|data| data.status)
            .filter(OrderStatus::is_final)
    }
}

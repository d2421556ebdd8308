//! Zota payment gateway integration: request signing, payload types and the
//! HTTP client for deposit submission and order-status queries.

pub mod client;
pub mod deposit;
pub mod error;
pub mod http;
pub mod signature;
pub mod types;

pub use client::{DepositGateway, ZotaClient, ZotaConfig};
pub use deposit::DepositSettings;
pub use error::{GatewayError, GatewayResult};
pub use types::{
    DepositRequest, DepositResponse, OrderStatus, OrderStatusRequest, OrderStatusResponse,
};

//! Error handling for the deposit API
//!
//! Maps domain failures onto HTTP status codes, machine-readable error codes
//! and messages that are safe to show to the customer.

use crate::services::deposit_flow::DepositFlowError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,
    #[serde(rename = "ORDER_NOT_FOUND")]
    OrderNotFound,
    #[serde(rename = "ORDER_STORE_ERROR")]
    OrderStoreError,
    #[serde(rename = "PAYMENT_GATEWAY_REJECTED")]
    PaymentGatewayRejected,
    #[serde(rename = "PAYMENT_GATEWAY_ERROR")]
    PaymentGatewayError,
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

#[derive(Debug, Clone)]
pub enum AppErrorKind {
    /// Request input failed validation
    Validation { field: String, message: String },
    /// No order with the given id
    OrderNotFound { order_id: String },
    /// The deposit flow failed
    Flow(DepositFlowError),
}

/// Unified application error type
#[derive(Debug, Clone)]
pub struct AppError {
    pub kind: AppErrorKind,
    pub request_id: Option<String>,
}

impl AppError {
    pub fn new(kind: AppErrorKind) -> Self {
        Self {
            kind,
            request_id: None,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Validation {
            field: field.into(),
            message: message.into(),
        })
    }

    pub fn order_not_found(order_id: impl Into<String>) -> Self {
        Self::new(AppErrorKind::OrderNotFound {
            order_id: order_id.into(),
        })
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Map error to HTTP status code
    pub fn status_code(&self) -> u16 {
        match &self.kind {
            AppErrorKind::Validation { .. } => 400,
            AppErrorKind::OrderNotFound { .. } => 404,
            AppErrorKind::Flow(err) => err.http_status_code(),
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> ErrorCode {
        match &self.kind {
            AppErrorKind::Validation { .. } => ErrorCode::ValidationError,
            AppErrorKind::OrderNotFound { .. } => ErrorCode::OrderNotFound,
            AppErrorKind::Flow(err) => match err {
                DepositFlowError::OrderNotStored { .. } => ErrorCode::OrderStoreError,
                DepositFlowError::Gateway(gw) if !gw.is_retryable() => {
                    ErrorCode::PaymentGatewayRejected
                }
                DepositFlowError::Gateway(_) | DepositFlowError::MissingDepositData { .. } => {
                    ErrorCode::PaymentGatewayError
                }
            },
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match &self.kind {
            AppErrorKind::Validation { field, message } => {
                format!("Invalid '{}': {}", field, message)
            }
            AppErrorKind::OrderNotFound { order_id } => {
                format!("Order '{}' not found", order_id)
            }
            AppErrorKind::Flow(err) => err.user_message(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match &self.kind {
            AppErrorKind::Validation { .. } | AppErrorKind::OrderNotFound { .. } => false,
            AppErrorKind::Flow(err) => err.is_retryable(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AppErrorKind::Validation { field, message } => {
                write!(f, "validation failed for {}: {}", field, message)
            }
            AppErrorKind::OrderNotFound { order_id } => write!(f, "order {} not found", order_id),
            AppErrorKind::Flow(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {}

impl From<DepositFlowError> for AppError {
    fn from(err: DepositFlowError) -> Self {
        AppError::new(AppErrorKind::Flow(err))
    }
}

//! Order endpoints: list, look up and place deposit orders.

use crate::api::AppState;
use crate::error::AppError;
use crate::middleware::logging::request_id;
use crate::orders::Order;
use crate::services::identity::current_user;
use axum::{
    extract::{FromRequest, Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

pub const MAX_DESCRIPTION_CHARS: usize = 128;

/// Body of `POST /order`, sent either as a form or as JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderForm {
    pub description: String,
    pub amount: Decimal,
}

impl CreateOrderForm {
    pub fn validate(&self) -> Result<(), AppError> {
        let chars = self.description.chars().count();
        if chars == 0 {
            return Err(AppError::validation("description", "is required"));
        }
        if chars > MAX_DESCRIPTION_CHARS {
            return Err(AppError::validation(
                "description",
                format!("must be at most {} characters", MAX_DESCRIPTION_CHARS),
            ));
        }
        if self.amount <= Decimal::ZERO {
            return Err(AppError::validation("amount", "must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
}

pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong".to_string(),
    })
}

pub async fn list_orders(State(state): State<AppState>) -> Json<OrdersResponse> {
    Json(OrdersResponse {
        orders: state.store.list_all().await,
    })
}

pub async fn get_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let with_request_id = |err: AppError| match request_id(&headers) {
        Some(rid) => err.with_request_id(rid),
        None => err,
    };

    let order_id = Uuid::parse_str(&id)
        .map_err(|_| with_request_id(AppError::validation("id", "must be a UUID")))?;

    state
        .store
        .get(order_id)
        .await
        .map(Json)
        .ok_or_else(|| with_request_id(AppError::order_not_found(id)))
}

/// Places an order for the current customer and redirects the browser to the
/// gateway's payment page.
pub async fn create_order(State(state): State<AppState>, request: Request) -> Response {
    let rid = request_id(request.headers());
    match place_order(&state, request).await {
        Ok(deposit_url) => (StatusCode::FOUND, [(header::LOCATION, deposit_url)]).into_response(),
        Err(err) => match rid {
            Some(rid) => err.with_request_id(rid).into_response(),
            None => err.into_response(),
        },
    }
}

async fn place_order(state: &AppState, request: Request) -> Result<String, AppError> {
    let form = extract_form(state, request).await?;
    form.validate()?;

    let user = current_user();
    let started = state
        .flow
        .start_deposit(&user, form.amount, &form.description)
        .await?;

    info!(
        order_id = %started.order_id,
        gateway_order_id = %started.gateway_order_id,
        "redirecting customer to deposit page"
    );
    Ok(started.deposit_url)
}

async fn extract_form(state: &AppState, request: Request) -> Result<CreateOrderForm, AppError> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false);

    if is_json {
        let Json(form) = Json::<CreateOrderForm>::from_request(request, state)
            .await
            .map_err(|rejection| AppError::validation("body", rejection.body_text()))?;
        Ok(form)
    } else {
        let Form(form) = Form::<CreateOrderForm>::from_request(request, state)
            .await
            .map_err(|rejection| AppError::validation("body", rejection.body_text()))?;
        Ok(form)
    }
}

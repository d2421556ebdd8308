//! Integration tests for the Zota HTTP client against a local stub server

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use zota_deposit_backend::gateway::error::NO_MESSAGE;
    use zota_deposit_backend::gateway::signature::{deposit_signature, order_status_signature};
    use zota_deposit_backend::gateway::{
        DepositGateway, DepositRequest, GatewayError, OrderStatus, OrderStatusRequest, ZotaClient,
        ZotaConfig,
    };
    use zota_deposit_backend::services::identity::current_user;

    const SECRET: &str = "e31edd0d-76a6-4f1c-be19-4504ff5b89d7";
    const ENDPOINT_ID: &str = "111111";
    const MERCHANT_ID: &str = "MYMERCHANTID";

    #[derive(Clone, Default)]
    struct Captured {
        deposits: Arc<Mutex<Vec<(String, Value)>>>,
        queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    }

    #[derive(Clone)]
    struct StubState {
        captured: Captured,
        status: StatusCode,
        body: String,
    }

    async fn deposit_handler(
        State(state): State<StubState>,
        Path(endpoint_id): Path<String>,
        Json(body): Json<Value>,
    ) -> (StatusCode, String) {
        state
            .captured
            .deposits
            .lock()
            .unwrap()
            .push((endpoint_id, body));
        (state.status, state.body.clone())
    }

    async fn status_handler(
        State(state): State<StubState>,
        Query(params): Query<HashMap<String, String>>,
    ) -> (StatusCode, String) {
        state.captured.queries.lock().unwrap().push(params);
        (state.status, state.body.clone())
    }

    /// Serves a fixed answer on both gateway routes and returns the client
    /// pointed at it.
    async fn stub(status: StatusCode, body: Value) -> (ZotaClient, Captured) {
        stub_raw(status, body.to_string()).await
    }

    async fn stub_raw(status: StatusCode, body: String) -> (ZotaClient, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route(
                "/api/v1/deposit/request/{endpoint_id}/",
                post(deposit_handler),
            )
            .route("/api/v1/query/order-status/", get(status_handler))
            .with_state(StubState {
                captured: captured.clone(),
                status,
                body,
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (client_for(format!("http://{}/", addr)), captured)
    }

    fn client_for(base_url: String) -> ZotaClient {
        ZotaClient::new(ZotaConfig {
            secret_key: SECRET.to_string(),
            endpoint_id: ENDPOINT_ID.to_string(),
            merchant_id: MERCHANT_ID.to_string(),
            base_url,
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn deposit_request() -> DepositRequest {
        let order = current_user().place_order(dec!(13.37), "test");
        let settings = client_for("http://unused".to_string())
            .config()
            .deposit_settings();
        DepositRequest::from_order(&order, &settings)
    }

    #[tokio::test]
    async fn test_deposit_posts_signed_request() {
        let (client, captured) = stub(
            StatusCode::OK,
            json!({
                "code": "200",
                "data": {
                    "depositUrl": "https://pay.example/form/1",
                    "merchantOrderID": "m-1",
                    "orderID": "gw-1"
                }
            }),
        )
        .await;
        let request = deposit_request();

        let response = client.deposit(&request).await.unwrap();
        let data = response.data.unwrap();
        assert_eq!(data.deposit_url, "https://pay.example/form/1");
        assert_eq!(data.order_id, "gw-1");

        let deposits = captured.deposits.lock().unwrap();
        assert_eq!(deposits.len(), 1);
        let (endpoint_id, body) = &deposits[0];
        assert_eq!(endpoint_id, ENDPOINT_ID);
        assert_eq!(body["orderAmount"], "13.37");
        assert_eq!(body["customerIP"], "146.70.188.231");
        assert_eq!(body["merchantOrderId"], request.merchant_order_id);
        assert_eq!(
            body["signature"],
            deposit_signature(
                ENDPOINT_ID,
                &request.merchant_order_id,
                "13.37",
                "federlizer@protonmail.com",
                SECRET,
            )
        );
    }

    #[tokio::test]
    async fn test_deposit_rejection_carries_gateway_message() {
        let (client, _) = stub(
            StatusCode::BAD_REQUEST,
            json!({"code": "400", "message": "endpoint not found"}),
        )
        .await;

        let err = client.deposit(&deposit_request()).await.unwrap_err();
        match err {
            GatewayError::Rejected { code, message } => {
                assert_eq!(code, "400");
                assert_eq!(message, "endpoint not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejection_without_message_uses_generic_text() {
        let (client, _) = stub(StatusCode::OK, json!({"code": "401"})).await;

        let err = client.deposit(&deposit_request()).await.unwrap_err();
        assert_eq!(err.user_message(), NO_MESSAGE);
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_decode_error() {
        let (client, _) = stub_raw(StatusCode::OK, "<html>oops</html>".to_string()).await;

        let err = client.deposit(&deposit_request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{}", addr));
        let err = client.deposit(&deposit_request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_order_status_signs_query() {
        let (client, captured) = stub(
            StatusCode::OK,
            json!({
                "code": "200",
                "data": {
                    "type": "SALE",
                    "status": "APPROVED",
                    "errorMessage": "",
                    "orderID": "gw-1",
                    "merchantOrderID": "m-1",
                    "amount": "13.37",
                    "currency": "USD"
                }
            }),
        )
        .await;
        let mut request = OrderStatusRequest::new("gw-1", "m-1");

        let response = client.order_status(&mut request).await.unwrap();
        assert_eq!(response.final_status(), Some(OrderStatus::Approved));
        assert!(request.timestamp > 0);

        let queries = captured.queries.lock().unwrap();
        let params = &queries[0];
        assert_eq!(params["merchantID"], MERCHANT_ID);
        assert_eq!(params["orderID"], "gw-1");
        assert_eq!(params["merchantOrderID"], "m-1");
        assert_eq!(params["timestamp"], request.timestamp.to_string());
        assert_eq!(
            params["signature"],
            order_status_signature(MERCHANT_ID, "m-1", "gw-1", request.timestamp, SECRET)
        );
        assert_eq!(params["signature"], request.signature);
    }

    #[tokio::test]
    async fn test_order_status_rejection() {
        let (client, _) = stub(
            StatusCode::UNAUTHORIZED,
            json!({"code": "401", "message": "invalid signature"}),
        )
        .await;
        let mut request = OrderStatusRequest::new("gw-1", "m-1");

        let err = client.order_status(&mut request).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected { ref code, .. } if code == "401"));
    }

    #[tokio::test]
    async fn test_processing_status_is_not_final() {
        let (client, _) = stub(
            StatusCode::OK,
            json!({"code": "200", "data": {"status": "PROCESSING"}}),
        )
        .await;
        let mut request = OrderStatusRequest::new("gw-1", "m-1");

        let response = client.order_status(&mut request).await.unwrap();
        assert_eq!(response.final_status(), None);
    }
}

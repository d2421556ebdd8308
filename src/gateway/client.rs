use crate::gateway::deposit::DepositSettings;
use crate::gateway::error::GatewayResult;
use crate::gateway::http::GatewayHttpClient;
use crate::gateway::types::{
    DepositRequest, DepositResponse, OrderStatusRequest, OrderStatusResponse,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// The two calls the service makes against the payment gateway.
#[async_trait]
pub trait DepositGateway: Send + Sync {
    /// Submits a signed deposit. Any code other than `"200"` is an error.
    async fn deposit(&self, request: &DepositRequest) -> GatewayResult<DepositResponse>;

    /// Re-stamps and re-signs `request`, then queries the order status.
    /// Whether the returned status is final is left to the caller.
    async fn order_status(
        &self,
        request: &mut OrderStatusRequest,
    ) -> GatewayResult<OrderStatusResponse>;
}

#[derive(Debug, Clone)]
pub struct ZotaConfig {
    pub secret_key: String,
    pub endpoint_id: String,
    pub merchant_id: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ZotaConfig {
    pub fn deposit_settings(&self) -> DepositSettings {
        DepositSettings::new(self.endpoint_id.clone(), self.secret_key.clone())
    }
}

pub struct ZotaClient {
    config: ZotaConfig,
    http: GatewayHttpClient,
}

impl ZotaClient {
    pub fn new(config: ZotaConfig) -> GatewayResult<Self> {
        let http = GatewayHttpClient::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ZotaConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl DepositGateway for ZotaClient {
    async fn deposit(&self, request: &DepositRequest) -> GatewayResult<DepositResponse> {
        let url = self.endpoint(&format!(
            "/api/v1/deposit/request/{}/",
            self.config.endpoint_id
        ));
        let response: DepositResponse = self.http.post_json(&url, request).await?;
        let response = response.into_result()?;

        if let Some(data) = &response.data {
            info!(
                merchant_order_id = %data.merchant_order_id,
                gateway_order_id = %data.order_id,
                "zota deposit accepted"
            );
        }
        Ok(response)
    }

    async fn order_status(
        &self,
        request: &mut OrderStatusRequest,
    ) -> GatewayResult<OrderStatusResponse> {
        request.sign_at(
            chrono::Utc::now().timestamp(),
            &self.config.merchant_id,
            &self.config.secret_key,
        );

        let query = [
            ("merchantID", self.config.merchant_id.clone()),
            ("orderID", request.order_id.clone()),
            ("merchantOrderID", request.merchant_order_id.clone()),
            ("timestamp", request.timestamp.to_string()),
            ("signature", request.signature.clone()),
        ];
        let response: OrderStatusResponse = self
            .http
            .get_json(&self.endpoint("/api/v1/query/order-status/"), &query)
            .await?;
        response.into_result()
    }
}

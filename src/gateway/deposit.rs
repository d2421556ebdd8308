use crate::gateway::signature::deposit_signature;
use crate::gateway::types::DepositRequest;
use crate::orders::Order;

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_REDIRECT_URL: &str = "https://federlizer.com/deposit-completed";
pub const DEFAULT_CHECKOUT_URL: &str = "https://federlizer.com/checkout";

/// Merchant-side values that go into every deposit request.
#[derive(Debug, Clone)]
pub struct DepositSettings {
    pub endpoint_id: String,
    pub secret_key: String,
    pub currency: String,
    pub redirect_url: String,
    pub checkout_url: String,
}

impl DepositSettings {
    pub fn new(endpoint_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            endpoint_id: endpoint_id.into(),
            secret_key: secret_key.into(),
            currency: DEFAULT_CURRENCY.to_string(),
            redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            checkout_url: DEFAULT_CHECKOUT_URL.to_string(),
        }
    }
}

impl DepositRequest {
    /// Builds and signs the deposit payload for `order`.
    pub fn from_order(order: &Order, settings: &DepositSettings) -> Self {
        let user = &order.user;
        let merchant_order_id = order.id().to_string();
        let order_amount = order.amount_str();
        let signature = deposit_signature(
            &settings.endpoint_id,
            &merchant_order_id,
            &order_amount,
            &user.email,
            &settings.secret_key,
        );

        Self {
            merchant_order_id,
            merchant_order_desc: order.description.clone(),
            order_amount,
            order_currency: settings.currency.clone(),

            customer_email: user.email.clone(),
            customer_first_name: user.first_name.clone(),
            customer_last_name: user.last_name.clone(),
            customer_ip: user.ip_address.clone(),
            customer_phone: user.phone.clone(),

            customer_address: user.address.line.clone(),
            customer_country_code: user.address.country_code.clone(),
            customer_city: user.address.city.clone(),
            customer_zip_code: user.address.zip_code.clone(),

            redirect_url: settings.redirect_url.clone(),
            checkout_url: settings.checkout_url.clone(),
            signature,
        }
    }
}

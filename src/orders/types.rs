use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub line: String,
    pub country_code: String,
    pub city: String,
    pub zip_code: String,
}

/// Identity snapshot copied into every order it places.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub ip_address: String,
    pub phone: String,
    pub address: Address,
}

impl User {
    pub fn place_order(&self, amount: Decimal, description: impl Into<String>) -> Order {
        Order::new(self.clone(), amount, description)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    id: Uuid,
    pub description: String,
    #[serde(serialize_with = "serialize_amount")]
    amount: Decimal,
    pub user: User,
    pub payment_status: PaymentStatus,
}

impl Order {
    /// New `pending` order with a freshly generated id.
    pub fn new(user: User, amount: Decimal, description: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), user, amount, description)
    }

    pub fn with_id(id: Uuid, user: User, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            amount: amount.normalize(),
            user,
            payment_status: PaymentStatus::Pending,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Amount in the exact form used for signing and for the deposit payload.
    pub fn amount_str(&self) -> String {
        crate::gateway::signature::format_amount(&self.amount)
    }
}

fn serialize_amount<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&crate::gateway::signature::format_amount(amount))
}

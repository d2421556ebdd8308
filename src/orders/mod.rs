pub mod store;
pub mod types;

pub use store::{OrderStore, StoreError, StoreResult};
pub use types::{Address, Order, PaymentStatus, User};

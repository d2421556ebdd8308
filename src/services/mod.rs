pub mod deposit_flow;
pub mod identity;

pub use deposit_flow::{DepositFlow, DepositFlowError, DepositStarted};

pub mod order_status_poller;
pub mod registry;

pub use order_status_poller::{OrderStatusPoller, PollState, PollerConfig, PollerError};
pub use registry::PollerRegistry;

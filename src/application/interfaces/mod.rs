pub mod notifier;
pub mod payment_gateway;

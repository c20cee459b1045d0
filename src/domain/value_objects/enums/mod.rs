pub mod billing_intervals;
pub mod billing_modes;
pub mod payment_statuses;
pub mod subscription_statuses;
pub mod user_roles;

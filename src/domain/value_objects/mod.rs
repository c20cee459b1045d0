pub mod billing_events;
pub mod enums;
pub mod fingerprint;
pub mod iam;
pub mod plans;
pub mod subscriptions;
pub mod votes;

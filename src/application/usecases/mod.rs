pub mod anonymous_votes;
pub mod billing_mode;
pub mod checkout;
pub mod public_board;
pub mod registration;
pub mod subscription_webhooks;

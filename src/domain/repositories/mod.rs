pub mod anonymous_votes;
pub mod organizations;
pub mod payments;
pub mod plans;
pub mod platform_settings;
pub mod registration;
pub mod subscriptions;
pub mod suggestions;
pub mod users;

pub mod anonymous_votes;
pub mod categories;
pub mod organizations;
pub mod payments;
pub mod plans;
pub mod subscriptions;
pub mod suggestions;
pub mod users;

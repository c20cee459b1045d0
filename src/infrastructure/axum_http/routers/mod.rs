pub mod admin;
pub mod auth;
pub mod billing;
pub mod public_board;
pub mod stripe_webhook;

use crate::{
    application::usecases::billing_mode::BillingModeCache,
    infrastructure::postgres::repositories::platform_settings::PlatformSettingsPostgres,
};

/// Billing mode cache shared by every router that talks to Stripe.
pub type SharedBillingMode = BillingModeCache<PlatformSettingsPostgres>;

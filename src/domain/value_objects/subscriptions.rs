use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{plans::PlanEntity, subscriptions::SubscriptionEntity},
    value_objects::enums::{
        billing_intervals::BillingInterval, subscription_statuses::SubscriptionStatus,
    },
};

/// An `active` subscription joined with the plan it currently bills for.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSubscription {
    pub subscription: SubscriptionEntity,
    pub plan: PlanEntity,
}

/// How Stripe should bill a mid-cycle price change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProrationBehavior {
    /// Prorate and invoice the difference immediately.
    AlwaysInvoice,
    /// Switch price without credit or charge.
    None,
}

impl ProrationBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProrationBehavior::AlwaysInvoice => "always_invoice",
            ProrationBehavior::None => "none",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubscriptionDto {
    pub plan_id: Uuid,
    pub plan_slug: String,
    pub plan_name: String,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
}

impl From<ActiveSubscription> for SubscriptionDto {
    fn from(value: ActiveSubscription) -> Self {
        Self {
            plan_id: value.plan.id,
            plan_slug: value.plan.slug,
            plan_name: value.plan.name,
            status: SubscriptionStatus::from_provider(&value.subscription.status),
            current_period_start: value.subscription.current_period_start,
            current_period_end: value.subscription.current_period_end,
            cancel_at_period_end: value.subscription.cancel_at_period_end,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CurrentBillingDto {
    pub organization_id: Uuid,
    pub plan: String,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub has_billing_account: bool,
    pub subscription: Option<SubscriptionDto>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub plan_id: Uuid,
    pub interval: BillingInterval,
}

#[derive(Debug, Deserialize)]
pub struct SwitchPlanRequest {
    pub plan_id: Uuid,
    pub interval: BillingInterval,
}

#[derive(Debug, Serialize)]
pub struct RedirectUrlResponse {
    pub url: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SwitchPlanResponse {
    pub plan: String,
    pub upgraded: bool,
}

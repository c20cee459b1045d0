use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    entities::plans::PlanEntity, value_objects::enums::billing_intervals::BillingInterval,
};

/// Lowest tier; organizations land here when their subscription is deleted.
pub const FREE_PLAN_SLUG: &str = "free";

/// Plan granted to newly registered organizations for the trial period.
pub const TRIAL_PLAN_SLUG: &str = "pro";

pub const TRIAL_DAYS: i64 = 15;

#[derive(Debug, Serialize, PartialEq)]
pub struct PlanDto {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub price_monthly: i64,
    pub price_yearly: i64,
    pub features: Vec<String>,
    pub monthly_available: bool,
    pub yearly_available: bool,
}

impl From<PlanEntity> for PlanDto {
    fn from(value: PlanEntity) -> Self {
        let monthly_available = value.stripe_price_for(BillingInterval::Monthly).is_some();
        let yearly_available = value.stripe_price_for(BillingInterval::Yearly).is_some();

        Self {
            id: value.id,
            slug: value.slug,
            name: value.name,
            price_monthly: value.price_monthly,
            price_yearly: value.price_yearly,
            features: value.features,
            monthly_available,
            yearly_available,
        }
    }
}

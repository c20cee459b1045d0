use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::billing_intervals::BillingInterval,
    infrastructure::postgres::schema::plans,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PlanEntity {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub price_monthly: i64,
    pub price_yearly: i64,
    pub features: Vec<String>,
    pub stripe_price_monthly: Option<String>,
    pub stripe_price_yearly: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl PlanEntity {
    pub fn price_for(&self, interval: BillingInterval) -> i64 {
        match interval {
            BillingInterval::Monthly => self.price_monthly,
            BillingInterval::Yearly => self.price_yearly,
        }
    }

    /// Stripe price id for the interval; blank ids count as unconfigured.
    pub fn stripe_price_for(&self, interval: BillingInterval) -> Option<&str> {
        let price = match interval {
            BillingInterval::Monthly => self.stripe_price_monthly.as_deref(),
            BillingInterval::Yearly => self.stripe_price_yearly.as_deref(),
        };
        price.filter(|value| !value.trim().is_empty())
    }
}

/// Raw row used for Diesel queries. Features stay as JSON and are parsed into a list.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plans)]
pub struct PlanRow {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub price_monthly: i64,
    pub price_yearly: i64,
    pub features: serde_json::Value,
    pub stripe_price_monthly: Option<String>,
    pub stripe_price_yearly: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl From<PlanRow> for PlanEntity {
    fn from(value: PlanRow) -> Self {
        let features = serde_json::from_value(value.features).unwrap_or_default();

        Self {
            id: value.id,
            slug: value.slug,
            name: value.name,
            price_monthly: value.price_monthly,
            price_yearly: value.price_yearly,
            features,
            stripe_price_monthly: value.stripe_price_monthly,
            stripe_price_yearly: value.stripe_price_yearly,
            is_active: value.is_active,
            sort_order: value.sort_order,
        }
    }
}

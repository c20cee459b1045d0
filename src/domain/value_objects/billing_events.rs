use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_objects::enums::subscription_statuses::SubscriptionStatus;

/// Subscription state as reported by the payment provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSubscription {
    pub id: String,
    pub customer_id: Option<String>,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    /// Price of the first subscription item, which is the billed plan.
    pub price_id: Option<String>,
}

/// Checkout fields the webhook needs. Metadata round-trips from `start_checkout`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutCompleted {
    pub session_id: Option<String>,
    pub organization_id: Option<Uuid>,
    pub plan_id: Option<Uuid>,
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceEvent {
    pub id: String,
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
    pub charge_id: Option<String>,
    pub amount_paid: i64,
    pub amount_due: i64,
    pub currency: String,
    pub hosted_invoice_url: Option<String>,
    pub price_id: Option<String>,
}

/// Verified webhook event, one variant per event type the billing flow reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum BillingEvent {
    CheckoutSessionCompleted(CheckoutCompleted),
    InvoicePaid(InvoiceEvent),
    InvoicePaymentFailed(InvoiceEvent),
    SubscriptionUpdated(ProviderSubscription),
    SubscriptionDeleted(ProviderSubscription),
    Ignored { event_type: String },
}

impl BillingEvent {
    pub fn event_type(&self) -> &str {
        match self {
            BillingEvent::CheckoutSessionCompleted(_) => "checkout.session.completed",
            BillingEvent::InvoicePaid(_) => "invoice.paid",
            BillingEvent::InvoicePaymentFailed(_) => "invoice.payment_failed",
            BillingEvent::SubscriptionUpdated(_) => "customer.subscription.updated",
            BillingEvent::SubscriptionDeleted(_) => "customer.subscription.deleted",
            BillingEvent::Ignored { event_type } => event_type,
        }
    }
}

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::{
    billing_events::{BillingEvent, ProviderSubscription},
    enums::billing_modes::BillingMode,
    subscriptions::ProrationBehavior,
};

#[derive(Debug, Error)]
pub enum WebhookVerificationError {
    #[error("signature rejected: {0}")]
    Signature(anyhow::Error),
    #[error("signed payload could not be decoded: {0}")]
    Payload(anyhow::Error),
}

/// Outbound payment provider calls. Every call names the billing mode so the
/// implementation can pick the matching credential set.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_customer(
        &self,
        mode: BillingMode,
        email: &str,
        organization_name: &str,
        organization_id: Uuid,
    ) -> Result<String>;

    /// Creates a subscription-mode checkout session and returns its redirect URL.
    async fn create_checkout_session(
        &self,
        mode: BillingMode,
        customer_id: &str,
        price_id: &str,
        metadata: HashMap<String, String>,
    ) -> Result<String>;

    async fn create_portal_session(&self, mode: BillingMode, customer_id: &str) -> Result<String>;

    async fn retrieve_subscription(
        &self,
        mode: BillingMode,
        subscription_id: &str,
    ) -> Result<ProviderSubscription>;

    /// Moves the subscription's billed item to `price_id`.
    async fn change_subscription_price(
        &self,
        mode: BillingMode,
        subscription_id: &str,
        price_id: &str,
        proration: ProrationBehavior,
    ) -> Result<()>;

    /// Verifies the signature over the raw body, then decodes the event.
    fn verify_webhook(
        &self,
        mode: BillingMode,
        payload: &[u8],
        signature: &str,
    ) -> std::result::Result<BillingEvent, WebhookVerificationError>;
}

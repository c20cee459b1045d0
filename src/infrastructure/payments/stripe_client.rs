use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    application::interfaces::payment_gateway::{PaymentGateway, WebhookVerificationError},
    config::config_model::{StripeCredentials, StripeSettings},
    domain::value_objects::{
        billing_events::{BillingEvent, CheckoutCompleted, InvoiceEvent, ProviderSubscription},
        enums::{billing_modes::BillingMode, subscription_statuses::SubscriptionStatus},
        subscriptions::ProrationBehavior,
    },
};

type HmacSha256 = Hmac<Sha256>;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Signed webhooks older than this are rejected as replays.
pub const SIGNATURE_TOLERANCE_SECS: u64 = 300;

/// Minimal Stripe client for one credential set, built on reqwest.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub type_: String,
    pub livemode: Option<bool>,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: Option<String>,
    pub customer: Option<String>,
    pub subscription: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub customer: Option<String>,
    pub status: String,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    pub billing_cycle_anchor: Option<i64>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub items: StripeList<StripeSubscriptionItem>,
}

#[derive(Debug, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,
}

impl<T> Default for StripeList<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscriptionItem {
    pub id: String,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    pub price: Option<StripePrice>,
}

#[derive(Debug, Deserialize)]
pub struct StripePrice {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeInvoice {
    pub id: String,
    pub customer: Option<String>,
    pub subscription: Option<String>,
    pub parent: Option<StripeInvoiceParent>,
    pub charge: Option<String>,
    #[serde(default)]
    pub amount_paid: i64,
    #[serde(default)]
    pub amount_due: i64,
    #[serde(default)]
    pub currency: String,
    pub hosted_invoice_url: Option<String>,
    #[serde(default)]
    pub lines: StripeList<StripeInvoiceLine>,
}

#[derive(Debug, Deserialize)]
pub struct StripeInvoiceParent {
    pub subscription_details: Option<StripeSubscriptionDetails>,
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscriptionDetails {
    pub subscription: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeInvoiceLine {
    pub price: Option<StripePrice>,
}

impl StripeSubscription {
    /// Returns the subscription period start timestamp, falling back to the first item
    /// or the billing cycle anchor when the top-level field is absent.
    pub fn period_start(&self) -> Option<i64> {
        self.current_period_start
            .or_else(|| {
                self.items
                    .data
                    .first()
                    .and_then(|item| item.current_period_start)
            })
            .or(self.billing_cycle_anchor)
    }

    pub fn period_end(&self) -> Option<i64> {
        self.current_period_end.or_else(|| {
            self.items
                .data
                .first()
                .and_then(|item| item.current_period_end)
        })
    }

    pub fn into_provider_subscription(self) -> ProviderSubscription {
        let current_period_start = self.period_start().and_then(ts_to_datetime);
        let current_period_end = self.period_end().and_then(ts_to_datetime);
        let price_id = self
            .items
            .data
            .first()
            .and_then(|item| item.price.as_ref())
            .map(|price| price.id.clone());

        ProviderSubscription {
            id: self.id,
            customer_id: self.customer,
            status: SubscriptionStatus::from_provider(&self.status),
            current_period_start,
            current_period_end,
            cancel_at_period_end: self.cancel_at_period_end,
            price_id,
        }
    }
}

impl StripeInvoice {
    fn into_invoice_event(self) -> InvoiceEvent {
        // Newer API versions moved the subscription under `parent`.
        let subscription_id = self.subscription.or_else(|| {
            self.parent
                .and_then(|parent| parent.subscription_details)
                .and_then(|details| details.subscription)
        });
        let price_id = self
            .lines
            .data
            .first()
            .and_then(|line| line.price.as_ref())
            .map(|price| price.id.clone());

        InvoiceEvent {
            id: self.id,
            customer_id: self.customer,
            subscription_id,
            charge_id: self.charge,
            amount_paid: self.amount_paid,
            amount_due: self.amount_due,
            currency: self.currency,
            hosted_invoice_url: self.hosted_invoice_url,
            price_id,
        }
    }
}

impl From<StripeCheckoutSession> for CheckoutCompleted {
    fn from(value: StripeCheckoutSession) -> Self {
        let metadata_uuid =
            |key: &str| value.metadata.get(key).and_then(|raw| Uuid::parse_str(raw).ok());

        Self {
            organization_id: metadata_uuid("organization_id"),
            plan_id: metadata_uuid("plan_id"),
            session_id: value.id,
            customer_id: value.customer,
            subscription_id: value.subscription,
        }
    }
}

impl StripeEvent {
    /// Decodes the event object for the types the billing flow handles.
    pub fn into_billing_event(self) -> Result<BillingEvent> {
        let object = self.data.object;
        let event = match self.type_.as_str() {
            "checkout.session.completed" => BillingEvent::CheckoutSessionCompleted(
                serde_json::from_value::<StripeCheckoutSession>(object)
                    .context("decode checkout session")?
                    .into(),
            ),
            "invoice.paid" => BillingEvent::InvoicePaid(
                serde_json::from_value::<StripeInvoice>(object)
                    .context("decode invoice")?
                    .into_invoice_event(),
            ),
            "invoice.payment_failed" => BillingEvent::InvoicePaymentFailed(
                serde_json::from_value::<StripeInvoice>(object)
                    .context("decode invoice")?
                    .into_invoice_event(),
            ),
            "customer.subscription.updated" => BillingEvent::SubscriptionUpdated(
                serde_json::from_value::<StripeSubscription>(object)
                    .context("decode subscription")?
                    .into_provider_subscription(),
            ),
            "customer.subscription.deleted" => BillingEvent::SubscriptionDeleted(
                serde_json::from_value::<StripeSubscription>(object)
                    .context("decode subscription")?
                    .into_provider_subscription(),
            ),
            other => BillingEvent::Ignored {
                event_type: other.to_string(),
            },
        };

        Ok(event)
    }
}

impl StripeClient {
    pub fn new(credentials: &StripeCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: credentials.secret_key.clone(),
            webhook_secret: credentials.webhook_secret.clone(),
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let details = serde_json::from_str::<StripeErrorEnvelope>(&body)
            .ok()
            .map(|envelope| envelope.error);

        error!(
            status = %status,
            stripe_request_id = ?request_id,
            stripe_error_type = ?details.as_ref().and_then(|d| d.type_.as_deref()),
            stripe_error_code = ?details.as_ref().and_then(|d| d.code.as_deref()),
            stripe_error_param = ?details.as_ref().and_then(|d| d.param.as_deref()),
            stripe_error_message = ?details.as_ref().and_then(|d| d.message.as_deref()),
            response_body = %body,
            context = %context,
            "stripe api request failed"
        );

        anyhow::bail!(
            "Stripe API request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }

    async fn post_form<T>(&self, path: &str, body: &[(String, String)], context: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let resp = self
            .http
            .post(format!("{STRIPE_API_BASE}{path}"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, context).await?;
        Ok(resp.json().await?)
    }

    pub async fn create_customer(
        &self,
        email: &str,
        organization_name: &str,
        organization_id: Uuid,
    ) -> Result<String> {
        let body = vec![
            ("email".to_string(), email.to_string()),
            ("name".to_string(), organization_name.to_string()),
            (
                "metadata[organization_id]".to_string(),
                organization_id.to_string(),
            ),
        ];

        #[derive(Deserialize)]
        struct CustomerResp {
            id: String,
        }

        let parsed: CustomerResp = self.post_form("/customers", &body, "create customer").await?;
        Ok(parsed.id)
    }

    /// Creates a subscription-mode Checkout Session and returns its URL. Metadata
    /// is copied onto the subscription so later events can be traced back.
    pub async fn create_checkout_session(
        &self,
        customer_id: &str,
        price_id: &str,
        metadata: HashMap<String, String>,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<String> {
        let mut body: Vec<(String, String)> = vec![
            ("mode".to_string(), "subscription".to_string()),
            ("customer".to_string(), customer_id.to_string()),
            ("line_items[0][price]".to_string(), price_id.to_string()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
        ];

        for (key, value) in metadata {
            body.push((format!("subscription_data[metadata][{key}]"), value.clone()));
            body.push((format!("metadata[{key}]"), value));
        }

        #[derive(Deserialize)]
        struct CheckoutResp {
            url: Option<String>,
        }

        let parsed: CheckoutResp = self
            .post_form("/checkout/sessions", &body, "create checkout session")
            .await?;
        parsed
            .url
            .ok_or_else(|| anyhow::anyhow!("Stripe Checkout session URL is missing"))
    }

    pub async fn create_portal_session(&self, customer_id: &str, return_url: &str) -> Result<String> {
        let body = vec![
            ("customer".to_string(), customer_id.to_string()),
            ("return_url".to_string(), return_url.to_string()),
        ];

        #[derive(Deserialize)]
        struct PortalResp {
            url: String,
        }

        let parsed: PortalResp = self
            .post_form("/billing_portal/sessions", &body, "create portal session")
            .await?;
        Ok(parsed.url)
    }

    pub async fn retrieve_subscription(&self, subscription_id: &str) -> Result<StripeSubscription> {
        let resp = self
            .http
            .get(format!("{STRIPE_API_BASE}/subscriptions/{subscription_id}"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "retrieve subscription").await?;

        Ok(resp.json().await?)
    }

    /// Replaces the price on the subscription's first item.
    pub async fn update_subscription_price(
        &self,
        subscription_id: &str,
        price_id: &str,
        proration: ProrationBehavior,
    ) -> Result<()> {
        let subscription = self.retrieve_subscription(subscription_id).await?;
        let item = subscription
            .items
            .data
            .first()
            .ok_or_else(|| anyhow::anyhow!("subscription {subscription_id} has no items"))?;

        let body = vec![
            ("items[0][id]".to_string(), item.id.clone()),
            ("items[0][price]".to_string(), price_id.to_string()),
            (
                "proration_behavior".to_string(),
                proration.as_str().to_string(),
            ),
        ];

        let _: serde_json::Value = self
            .post_form(
                &format!("/subscriptions/{subscription_id}"),
                &body,
                "update subscription price",
            )
            .await?;
        Ok(())
    }

    /// Verifies the webhook signature. https://stripe.com/docs/webhooks/signatures
    pub fn verify_webhook_signature(&self, payload: &[u8], signature_header: &str) -> Result<()> {
        self.verify_webhook_signature_at(payload, signature_header, Utc::now().timestamp())
    }

    /// Checks the `Stripe-Signature` header over the raw body. Decoding is a separate step.
    pub fn verify_webhook_signature_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<()> {
        let mut timestamp: Option<&str> = None;
        let mut signatures: Vec<&str> = Vec::new();

        for part in signature_header.split(',') {
            let part = part.trim();
            if let Some(rest) = part.strip_prefix("t=") {
                timestamp = Some(rest);
            } else if let Some(rest) = part.strip_prefix("v1=") {
                signatures.push(rest);
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| anyhow::anyhow!("missing timestamp in stripe-signature"))?;
        if signatures.is_empty() {
            anyhow::bail!("missing v1 in stripe-signature");
        }

        let signed_at: i64 = timestamp.parse().context("invalid stripe-signature timestamp")?;
        if now.abs_diff(signed_at) > SIGNATURE_TOLERANCE_SECS {
            anyhow::bail!("stripe-signature timestamp outside tolerance");
        }

        let verified = signatures.iter().any(|signature| {
            let Ok(provided) = hex::decode(signature) else {
                return false;
            };
            let Ok(mut mac) = HmacSha256::new_from_slice(self.webhook_secret.as_bytes()) else {
                return false;
            };
            mac.update(timestamp.as_bytes());
            mac.update(b".");
            mac.update(payload);
            mac.verify_slice(&provided).is_ok()
        });

        if !verified {
            anyhow::bail!("invalid webhook signature");
        }

        Ok(())
    }

    pub fn decode_webhook_event(payload: &[u8]) -> Result<StripeEvent> {
        serde_json::from_slice(payload).context("decode stripe event")
    }
}

/// Test and live clients side by side; every call picks one by billing mode.
pub struct StripeClients {
    test: StripeClient,
    live: StripeClient,
    success_url: String,
    cancel_url: String,
    portal_return_url: String,
}

impl StripeClients {
    pub fn new(settings: &StripeSettings, app_base_url: &str) -> Self {
        let base = app_base_url.trim_end_matches('/');
        Self {
            test: StripeClient::new(&settings.test),
            live: StripeClient::new(&settings.live),
            success_url: format!("{base}/settings/billing?checkout=success"),
            cancel_url: format!("{base}/settings/billing?checkout=canceled"),
            portal_return_url: format!("{base}/settings/billing"),
        }
    }

    fn client(&self, mode: BillingMode) -> &StripeClient {
        match mode {
            BillingMode::Test => &self.test,
            BillingMode::Live => &self.live,
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeClients {
    async fn create_customer(
        &self,
        mode: BillingMode,
        email: &str,
        organization_name: &str,
        organization_id: Uuid,
    ) -> Result<String> {
        self.client(mode)
            .create_customer(email, organization_name, organization_id)
            .await
    }

    async fn create_checkout_session(
        &self,
        mode: BillingMode,
        customer_id: &str,
        price_id: &str,
        metadata: HashMap<String, String>,
    ) -> Result<String> {
        self.client(mode)
            .create_checkout_session(
                customer_id,
                price_id,
                metadata,
                &self.success_url,
                &self.cancel_url,
            )
            .await
    }

    async fn create_portal_session(&self, mode: BillingMode, customer_id: &str) -> Result<String> {
        self.client(mode)
            .create_portal_session(customer_id, &self.portal_return_url)
            .await
    }

    async fn retrieve_subscription(
        &self,
        mode: BillingMode,
        subscription_id: &str,
    ) -> Result<ProviderSubscription> {
        Ok(self
            .client(mode)
            .retrieve_subscription(subscription_id)
            .await?
            .into_provider_subscription())
    }

    async fn change_subscription_price(
        &self,
        mode: BillingMode,
        subscription_id: &str,
        price_id: &str,
        proration: ProrationBehavior,
    ) -> Result<()> {
        self.client(mode)
            .update_subscription_price(subscription_id, price_id, proration)
            .await
    }

    fn verify_webhook(
        &self,
        mode: BillingMode,
        payload: &[u8],
        signature: &str,
    ) -> std::result::Result<BillingEvent, WebhookVerificationError> {
        self.client(mode)
            .verify_webhook_signature(payload, signature)
            .map_err(WebhookVerificationError::Signature)?;
        let event =
            StripeClient::decode_webhook_event(payload).map_err(WebhookVerificationError::Payload)?;

        if let Some(livemode) = event.livemode {
            if livemode != (mode == BillingMode::Live) {
                warn!(
                    event_id = ?event.id,
                    mode = %mode,
                    livemode,
                    "stripe webhook livemode does not match billing mode"
                );
            }
        }

        event
            .into_billing_event()
            .map_err(WebhookVerificationError::Payload)
    }
}

fn ts_to_datetime(ts: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(ts, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "whsec_test_secret";

    fn client() -> StripeClient {
        StripeClient::new(&StripeCredentials {
            secret_key: "sk_test_123".to_string(),
            webhook_secret: SECRET.to_string(),
        })
    }

    fn sign(payload: &[u8], timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    fn event(type_: &str, object: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "evt_1",
            "type": type_,
            "livemode": false,
            "data": { "object": object }
        }))
        .unwrap()
    }

    #[test]
    fn valid_signature_is_accepted() {
        let payload = event("customer.created", json!({ "id": "cus_1" }));
        let now = 1_760_000_000;

        client()
            .verify_webhook_signature_at(&payload, &sign(&payload, now), now + 10)
            .unwrap();

        let verified = StripeClient::decode_webhook_event(&payload).unwrap();
        assert_eq!(verified.type_, "customer.created");
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let payload = event("invoice.paid", json!({ "id": "in_1" }));
        let now = 1_760_000_000;
        let header = sign(&payload, now);
        let tampered = event("invoice.paid", json!({ "id": "in_2" }));

        assert!(
            client()
                .verify_webhook_signature_at(&tampered, &header, now)
                .is_err()
        );
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let payload = event("invoice.paid", json!({ "id": "in_1" }));
        let signed_at = 1_760_000_000;

        let result = client().verify_webhook_signature_at(
            &payload,
            &sign(&payload, signed_at),
            signed_at + SIGNATURE_TOLERANCE_SECS as i64 + 1,
        );

        assert!(result.is_err());
    }

    #[test]
    fn extreme_timestamps_are_rejected_without_overflow() {
        let payload = event("invoice.paid", json!({ "id": "in_1" }));
        let now = 1_760_000_000;

        for signed_at in [i64::MIN, i64::MAX] {
            let header = format!("t={signed_at},v1=deadbeef");
            assert!(
                client()
                    .verify_webhook_signature_at(&payload, &header, now)
                    .is_err()
            );
        }
    }

    #[test]
    fn signed_but_undecodable_payload_is_a_payload_error() {
        let payload = br#"{"not":"an event"}"#;
        let header = sign(payload, Utc::now().timestamp());
        let clients = StripeClients {
            test: client(),
            live: client(),
            success_url: String::new(),
            cancel_url: String::new(),
            portal_return_url: String::new(),
        };

        let bad_signature = clients.verify_webhook(BillingMode::Test, payload, "t=1,v1=00");
        let bad_payload = clients.verify_webhook(BillingMode::Test, payload, &header);

        assert!(matches!(bad_signature, Err(WebhookVerificationError::Signature(_))));
        assert!(matches!(bad_payload, Err(WebhookVerificationError::Payload(_))));
    }

    #[test]
    fn any_matching_v1_signature_is_enough() {
        let payload = event("invoice.paid", json!({ "id": "in_1" }));
        let now = 1_760_000_000;
        let valid = sign(&payload, now);
        let header = format!("t={now},v1=deadbeef,{}", valid.split(',').nth(1).unwrap());

        assert!(
            client()
                .verify_webhook_signature_at(&payload, &header, now)
                .is_ok()
        );
    }

    #[test]
    fn checkout_session_event_carries_metadata() {
        let organization_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        let stripe_event: StripeEvent = serde_json::from_slice(&event(
            "checkout.session.completed",
            json!({
                "id": "cs_1",
                "customer": "cus_1",
                "subscription": "sub_1",
                "metadata": {
                    "organization_id": organization_id.to_string(),
                    "plan_id": plan_id.to_string()
                }
            }),
        ))
        .unwrap();

        let BillingEvent::CheckoutSessionCompleted(session) =
            stripe_event.into_billing_event().unwrap()
        else {
            panic!("expected checkout session event");
        };

        assert_eq!(session.organization_id, Some(organization_id));
        assert_eq!(session.plan_id, Some(plan_id));
        assert_eq!(session.subscription_id.as_deref(), Some("sub_1"));
    }

    #[test]
    fn subscription_event_falls_back_to_item_periods() {
        let stripe_event: StripeEvent = serde_json::from_slice(&event(
            "customer.subscription.updated",
            json!({
                "id": "sub_1",
                "customer": "cus_1",
                "status": "unpaid",
                "cancel_at_period_end": true,
                "items": { "data": [{
                    "id": "si_1",
                    "current_period_start": 1_760_000_000,
                    "current_period_end": 1_762_592_000,
                    "price": { "id": "price_pro_m" }
                }] }
            }),
        ))
        .unwrap();

        let BillingEvent::SubscriptionUpdated(subscription) =
            stripe_event.into_billing_event().unwrap()
        else {
            panic!("expected subscription update");
        };

        assert_eq!(subscription.status, SubscriptionStatus::PastDue);
        assert!(subscription.cancel_at_period_end);
        assert_eq!(subscription.price_id.as_deref(), Some("price_pro_m"));
        assert_eq!(
            subscription.current_period_start.map(|at| at.timestamp()),
            Some(1_760_000_000)
        );
    }

    #[test]
    fn invoice_reads_subscription_from_parent_details() {
        let stripe_event: StripeEvent = serde_json::from_slice(&event(
            "invoice.payment_failed",
            json!({
                "id": "in_1",
                "customer": "cus_1",
                "amount_paid": 0,
                "amount_due": 1900,
                "currency": "usd",
                "parent": { "subscription_details": { "subscription": "sub_1" } },
                "lines": { "data": [{ "price": { "id": "price_pro_m" } }] }
            }),
        ))
        .unwrap();

        let BillingEvent::InvoicePaymentFailed(invoice) =
            stripe_event.into_billing_event().unwrap()
        else {
            panic!("expected failed invoice");
        };

        assert_eq!(invoice.subscription_id.as_deref(), Some("sub_1"));
        assert_eq!(invoice.amount_due, 1900);
        assert_eq!(invoice.price_id.as_deref(), Some("price_pro_m"));
    }

    #[test]
    fn unknown_event_types_are_ignored() {
        let stripe_event: StripeEvent =
            serde_json::from_slice(&event("customer.created", json!({ "id": "cus_1" }))).unwrap();

        assert_eq!(
            stripe_event.into_billing_event().unwrap(),
            BillingEvent::Ignored {
                event_type: "customer.created".to_string()
            }
        );
    }
}

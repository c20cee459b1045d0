use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    application::{
        interfaces::payment_gateway::{PaymentGateway, WebhookVerificationError},
        usecases::billing_mode::BillingModeSource,
    },
    domain::{
        entities::{
            payments::InsertPaymentEntity,
            subscriptions::{SubscriptionStateChangeset, UpsertSubscriptionEntity},
        },
        repositories::{
            organizations::OrganizationRepository, payments::PaymentRepository,
            plans::PlanRepository, subscriptions::SubscriptionRepository,
        },
        value_objects::{
            billing_events::{BillingEvent, CheckoutCompleted, InvoiceEvent, ProviderSubscription},
            enums::{
                billing_modes::BillingMode, payment_statuses::PaymentStatus,
                subscription_statuses::SubscriptionStatus,
            },
        },
    },
};

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("webhook payload could not be decoded")]
    InvalidPayload,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl WebhookError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            WebhookError::InvalidSignature | WebhookError::InvalidPayload => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type WebhookResult<T> = std::result::Result<T, WebhookError>;

/// Mirrors Stripe subscription state into local rows. Every handler is safe to
/// run again for a redelivered event; events about customers or subscriptions
/// this system never recorded are acknowledged without changes.
pub struct SubscriptionWebhookUseCase<O, P, S, Pay, G, M>
where
    O: OrganizationRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
    M: BillingModeSource + 'static,
{
    organization_repo: Arc<O>,
    plan_repo: Arc<P>,
    subscription_repo: Arc<S>,
    payment_repo: Arc<Pay>,
    payment_gateway: Arc<G>,
    billing_mode: Arc<M>,
    free_plan_slug: String,
}

impl<O, P, S, Pay, G, M> SubscriptionWebhookUseCase<O, P, S, Pay, G, M>
where
    O: OrganizationRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
    M: BillingModeSource + 'static,
{
    pub fn new(
        organization_repo: Arc<O>,
        plan_repo: Arc<P>,
        subscription_repo: Arc<S>,
        payment_repo: Arc<Pay>,
        payment_gateway: Arc<G>,
        billing_mode: Arc<M>,
        free_plan_slug: String,
    ) -> Self {
        Self {
            organization_repo,
            plan_repo,
            subscription_repo,
            payment_repo,
            payment_gateway,
            billing_mode,
            free_plan_slug,
        }
    }

    /// Verifies the raw body against the active mode's signing secret, then dispatches.
    pub async fn handle_stripe_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> WebhookResult<()> {
        let mode = self.billing_mode.current_mode().await.map_err(|err| {
            error!(error = ?err, "stripe_webhook: failed to resolve billing mode");
            WebhookError::Internal(err)
        })?;

        let event = self
            .payment_gateway
            .verify_webhook(mode, payload, signature)
            .map_err(|err| match err {
                WebhookVerificationError::Signature(err) => {
                    warn!(
                        error = %err,
                        mode = %mode,
                        status = WebhookError::InvalidSignature.status_code().as_u16(),
                        "stripe_webhook: verification failed"
                    );
                    WebhookError::InvalidSignature
                }
                WebhookVerificationError::Payload(err) => {
                    error!(
                        error = ?err,
                        mode = %mode,
                        status = WebhookError::InvalidPayload.status_code().as_u16(),
                        "stripe_webhook: signed event could not be decoded"
                    );
                    WebhookError::InvalidPayload
                }
            })?;

        let event_type = event.event_type().to_string();
        info!(event_type = %event_type, mode = %mode, "stripe_webhook: event verified");

        self.dispatch(event, mode).await.map_err(|err| {
            error!(
                event_type = %event_type,
                error = ?err,
                "stripe_webhook: handler failed, provider will redeliver"
            );
            err
        })
    }

    pub async fn dispatch(&self, event: BillingEvent, mode: BillingMode) -> WebhookResult<()> {
        match event {
            BillingEvent::CheckoutSessionCompleted(session) => {
                self.on_checkout_completed(session, mode).await
            }
            BillingEvent::InvoicePaid(invoice) => {
                self.on_invoice(invoice, mode, PaymentStatus::Paid).await
            }
            BillingEvent::InvoicePaymentFailed(invoice) => {
                self.on_invoice(invoice, mode, PaymentStatus::Failed).await
            }
            BillingEvent::SubscriptionUpdated(subscription) => {
                self.on_subscription_updated(subscription).await
            }
            BillingEvent::SubscriptionDeleted(subscription) => {
                self.on_subscription_deleted(subscription).await
            }
            BillingEvent::Ignored { event_type } => {
                debug!(event_type = %event_type, "stripe_webhook: unhandled event type");
                Ok(())
            }
        }
    }

    async fn on_checkout_completed(
        &self,
        session: CheckoutCompleted,
        mode: BillingMode,
    ) -> WebhookResult<()> {
        let (Some(organization_id), Some(plan_id), Some(customer_id), Some(subscription_id)) = (
            session.organization_id,
            session.plan_id,
            session.customer_id.clone(),
            session.subscription_id.clone(),
        ) else {
            warn!(
                session_id = ?session.session_id,
                organization_id = ?session.organization_id,
                plan_id = ?session.plan_id,
                has_customer = session.customer_id.is_some(),
                has_subscription = session.subscription_id.is_some(),
                "stripe_webhook: checkout session missing metadata, ignoring"
            );
            return Ok(());
        };

        let organization = self
            .organization_repo
            .find_by_id(organization_id)
            .await
            .map_err(|err| {
                error!(%organization_id, db_error = ?err, "stripe_webhook: failed to load organization");
                WebhookError::Internal(err)
            })?;
        if organization.is_none() {
            warn!(%organization_id, "stripe_webhook: checkout for unknown organization, ignoring");
            return Ok(());
        }

        self.organization_repo
            .set_stripe_customer_id(organization_id, &customer_id)
            .await
            .map_err(|err| {
                error!(
                    %organization_id,
                    customer_id = %customer_id,
                    db_error = ?err,
                    "stripe_webhook: failed to store stripe customer id"
                );
                WebhookError::Internal(err)
            })?;

        let provider_subscription = self
            .payment_gateway
            .retrieve_subscription(mode, &subscription_id)
            .await
            .map_err(|err| {
                error!(
                    %organization_id,
                    subscription_id = %subscription_id,
                    error = ?err,
                    "stripe_webhook: failed to retrieve subscription from stripe"
                );
                WebhookError::Internal(err)
            })?;

        let Some(plan) = self.plan_repo.find_by_id(plan_id).await.map_err(|err| {
            error!(%plan_id, db_error = ?err, "stripe_webhook: failed to load plan");
            WebhookError::Internal(err)
        })?
        else {
            warn!(%organization_id, %plan_id, "stripe_webhook: checkout references unknown plan, ignoring");
            return Ok(());
        };

        let subscription = UpsertSubscriptionEntity {
            organization_id,
            plan_id: plan.id,
            stripe_subscription_id: subscription_id.clone(),
            stripe_customer_id: Some(customer_id.clone()),
            status: provider_subscription.status.to_string(),
            current_period_start: provider_subscription.current_period_start,
            current_period_end: provider_subscription.current_period_end,
            cancel_at_period_end: provider_subscription.cancel_at_period_end,
        };

        self.subscription_repo
            .upsert_by_stripe_subscription_id(subscription)
            .await
            .map_err(|err| {
                error!(
                    %organization_id,
                    subscription_id = %subscription_id,
                    db_error = ?err,
                    "stripe_webhook: failed to upsert subscription"
                );
                WebhookError::Internal(err)
            })?;

        self.organization_repo
            .set_plan(organization_id, &plan.slug)
            .await
            .map_err(|err| {
                error!(
                    %organization_id,
                    plan = %plan.slug,
                    db_error = ?err,
                    "stripe_webhook: failed to update organization plan"
                );
                WebhookError::Internal(err)
            })?;

        info!(
            %organization_id,
            plan = %plan.slug,
            subscription_id = %subscription_id,
            status = %provider_subscription.status,
            "stripe_webhook: checkout reconciled"
        );
        Ok(())
    }

    async fn on_invoice(
        &self,
        invoice: InvoiceEvent,
        mode: BillingMode,
        outcome: PaymentStatus,
    ) -> WebhookResult<()> {
        let Some(customer_id) = invoice.customer_id.as_deref() else {
            warn!(invoice_id = %invoice.id, "stripe_webhook: invoice without customer, ignoring");
            return Ok(());
        };

        let Some(organization) = self
            .organization_repo
            .find_by_stripe_customer_id(customer_id)
            .await
            .map_err(|err| {
                error!(
                    customer_id,
                    db_error = ?err,
                    "stripe_webhook: failed to resolve organization by customer"
                );
                WebhookError::Internal(err)
            })?
        else {
            info!(
                customer_id,
                invoice_id = %invoice.id,
                "stripe_webhook: invoice for unknown customer, ignoring"
            );
            return Ok(());
        };

        let plan_name = match invoice.price_id.as_deref() {
            Some(price_id) => self
                .plan_repo
                .find_by_stripe_price_id(price_id)
                .await
                .map_err(WebhookError::Internal)?
                .map(|plan| plan.name),
            None => None,
        }
        .or_else(|| Some(organization.plan.clone()));

        let amount = match outcome {
            PaymentStatus::Paid => invoice.amount_paid,
            PaymentStatus::Failed => invoice.amount_due,
        };

        let payment = InsertPaymentEntity {
            organization_id: organization.id,
            stripe_invoice_id: invoice.id.clone(),
            stripe_charge_id: invoice.charge_id.clone(),
            amount,
            currency: invoice.currency.clone(),
            status: outcome.to_string(),
            plan_name,
            hosted_invoice_url: invoice.hosted_invoice_url.clone(),
            mode: mode.to_string(),
        };

        self.payment_repo.record_payment(payment).await.map_err(|err| {
            error!(
                organization_id = %organization.id,
                invoice_id = %invoice.id,
                db_error = ?err,
                "stripe_webhook: failed to record payment"
            );
            WebhookError::Internal(err)
        })?;

        if let Some(subscription_id) = invoice.subscription_id.as_deref() {
            let status = match outcome {
                PaymentStatus::Paid => SubscriptionStatus::Active,
                PaymentStatus::Failed => SubscriptionStatus::PastDue,
            };

            let updated = self
                .subscription_repo
                .update_status_by_stripe_subscription_id(subscription_id, status)
                .await
                .map_err(|err| {
                    error!(
                        subscription_id,
                        status = %status,
                        db_error = ?err,
                        "stripe_webhook: failed to update subscription status from invoice"
                    );
                    WebhookError::Internal(err)
                })?;

            if !updated {
                debug!(subscription_id, "stripe_webhook: invoice subscription not tracked locally");
            }
        }

        info!(
            organization_id = %organization.id,
            invoice_id = %invoice.id,
            outcome = %outcome,
            amount,
            "stripe_webhook: invoice recorded"
        );
        Ok(())
    }

    async fn on_subscription_updated(&self, update: ProviderSubscription) -> WebhookResult<()> {
        let Some(local) = self
            .subscription_repo
            .find_by_stripe_subscription_id(&update.id)
            .await
            .map_err(|err| {
                error!(
                    subscription_id = %update.id,
                    db_error = ?err,
                    "stripe_webhook: failed to load subscription"
                );
                WebhookError::Internal(err)
            })?
        else {
            info!(subscription_id = %update.id, "stripe_webhook: update for unknown subscription, ignoring");
            return Ok(());
        };

        let matched_plan = match update.price_id.as_deref() {
            Some(price_id) => self
                .plan_repo
                .find_by_stripe_price_id(price_id)
                .await
                .map_err(|err| {
                    error!(price_id, db_error = ?err, "stripe_webhook: failed to match plan by price");
                    WebhookError::Internal(err)
                })?,
            None => None,
        };

        let changes = SubscriptionStateChangeset {
            plan_id: matched_plan.as_ref().map_or(local.plan_id, |plan| plan.id),
            status: update.status.to_string(),
            current_period_start: update.current_period_start.or(local.current_period_start),
            current_period_end: update.current_period_end.or(local.current_period_end),
            cancel_at_period_end: update.cancel_at_period_end,
        };

        self.subscription_repo
            .apply_provider_state(&update.id, changes)
            .await
            .map_err(|err| {
                error!(
                    subscription_id = %update.id,
                    db_error = ?err,
                    "stripe_webhook: failed to apply subscription update"
                );
                WebhookError::Internal(err)
            })?;

        if let Some(plan) = matched_plan.as_ref() {
            self.organization_repo
                .set_plan(local.organization_id, &plan.slug)
                .await
                .map_err(|err| {
                    error!(
                        organization_id = %local.organization_id,
                        plan = %plan.slug,
                        db_error = ?err,
                        "stripe_webhook: failed to update organization plan"
                    );
                    WebhookError::Internal(err)
                })?;
        }

        info!(
            subscription_id = %update.id,
            organization_id = %local.organization_id,
            status = %update.status,
            plan = ?matched_plan.map(|plan| plan.slug),
            "stripe_webhook: subscription updated"
        );
        Ok(())
    }

    async fn on_subscription_deleted(&self, deleted: ProviderSubscription) -> WebhookResult<()> {
        let Some(local) = self
            .subscription_repo
            .find_by_stripe_subscription_id(&deleted.id)
            .await
            .map_err(|err| {
                error!(
                    subscription_id = %deleted.id,
                    db_error = ?err,
                    "stripe_webhook: failed to load subscription"
                );
                WebhookError::Internal(err)
            })?
        else {
            info!(subscription_id = %deleted.id, "stripe_webhook: deletion for unknown subscription, ignoring");
            return Ok(());
        };

        self.subscription_repo
            .update_status_by_stripe_subscription_id(&deleted.id, SubscriptionStatus::Canceled)
            .await
            .map_err(|err| {
                error!(
                    subscription_id = %deleted.id,
                    db_error = ?err,
                    "stripe_webhook: failed to cancel subscription"
                );
                WebhookError::Internal(err)
            })?;

        self.organization_repo
            .set_plan(local.organization_id, &self.free_plan_slug)
            .await
            .map_err(|err| {
                error!(
                    organization_id = %local.organization_id,
                    db_error = ?err,
                    "stripe_webhook: failed to downgrade organization"
                );
                WebhookError::Internal(err)
            })?;

        info!(
            subscription_id = %deleted.id,
            organization_id = %local.organization_id,
            plan = %self.free_plan_slug,
            "stripe_webhook: subscription canceled, organization downgraded"
        );
        Ok(())
    }
}

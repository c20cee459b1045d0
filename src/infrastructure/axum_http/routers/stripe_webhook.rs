use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use serde_json::json;

use super::SharedBillingMode;
use crate::{
    application::usecases::subscription_webhooks::{SubscriptionWebhookUseCase, WebhookError},
    infrastructure::{
        axum_http::error_responses::AppError,
        payments::stripe_client::StripeClients,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                organizations::OrganizationPostgres, payments::PaymentPostgres,
                plans::PlanPostgres, subscriptions::SubscriptionPostgres,
            },
        },
    },
};

const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

type StripeWebhookUseCase = SubscriptionWebhookUseCase<
    OrganizationPostgres,
    PlanPostgres,
    SubscriptionPostgres,
    PaymentPostgres,
    StripeClients,
    SharedBillingMode,
>;

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    stripe: Arc<StripeClients>,
    billing_mode: Arc<SharedBillingMode>,
    free_plan_slug: String,
) -> Router {
    let organization_repository = OrganizationPostgres::new(Arc::clone(&db_pool));
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let webhook_usecase = SubscriptionWebhookUseCase::new(
        Arc::new(organization_repository),
        Arc::new(plan_repository),
        Arc::new(subscription_repository),
        Arc::new(payment_repository),
        stripe,
        billing_mode,
        free_plan_slug,
    );

    Router::new()
        .route("/stripe", post(stripe_webhook))
        .with_state(Arc::new(webhook_usecase))
}

/// Takes the raw body; the signature covers the exact bytes Stripe sent.
pub async fn stripe_webhook(
    State(webhook_usecase): State<Arc<StripeWebhookUseCase>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(WebhookError::InvalidSignature)?;

    webhook_usecase
        .handle_stripe_webhook(&body, signature)
        .await?;

    Ok(Json(json!({ "received": true })))
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use super::SharedBillingMode;
use crate::{
    application::usecases::checkout::CheckoutUseCase,
    domain::value_objects::subscriptions::{CheckoutRequest, SwitchPlanRequest},
    infrastructure::{
        axum_http::{auth::AuthUser, error_responses::AppError},
        payments::stripe_client::StripeClients,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                organizations::OrganizationPostgres, plans::PlanPostgres,
                subscriptions::SubscriptionPostgres,
            },
        },
    },
};

type BillingUseCase = CheckoutUseCase<
    OrganizationPostgres,
    PlanPostgres,
    SubscriptionPostgres,
    StripeClients,
    SharedBillingMode,
>;

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    stripe: Arc<StripeClients>,
    billing_mode: Arc<SharedBillingMode>,
) -> Router {
    let organization_repository = OrganizationPostgres::new(Arc::clone(&db_pool));
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let checkout_usecase = CheckoutUseCase::new(
        Arc::new(organization_repository),
        Arc::new(plan_repository),
        Arc::new(subscription_repository),
        stripe,
        billing_mode,
    );

    Router::new()
        .route("/plans", get(list_plans))
        .route("/subscription", get(current_billing))
        .route("/checkout", post(start_checkout))
        .route("/switch-plan", post(switch_plan))
        .route("/portal", post(open_billing_portal))
        .with_state(Arc::new(checkout_usecase))
}

pub async fn list_plans(
    State(checkout_usecase): State<Arc<BillingUseCase>>,
) -> Result<impl IntoResponse, AppError> {
    let plans = checkout_usecase.list_plans().await?;
    Ok(Json(plans))
}

pub async fn current_billing(
    State(checkout_usecase): State<Arc<BillingUseCase>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    auth.require_admin()?;

    let billing = checkout_usecase
        .current_billing(auth.organization_id)
        .await?;
    Ok(Json(billing))
}

pub async fn start_checkout(
    State(checkout_usecase): State<Arc<BillingUseCase>>,
    auth: AuthUser,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_admin()?;

    let redirect = checkout_usecase
        .start_checkout(
            auth.organization_id,
            &auth.email,
            request.plan_id,
            request.interval,
        )
        .await?;
    Ok(Json(redirect))
}

pub async fn switch_plan(
    State(checkout_usecase): State<Arc<BillingUseCase>>,
    auth: AuthUser,
    Json(request): Json<SwitchPlanRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_admin()?;

    let switched = checkout_usecase
        .switch_plan(auth.organization_id, request.plan_id, request.interval)
        .await?;
    Ok(Json(switched))
}

pub async fn open_billing_portal(
    State(checkout_usecase): State<Arc<BillingUseCase>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    auth.require_admin()?;

    let redirect = checkout_usecase
        .open_billing_portal(auth.organization_id)
        .await?;
    Ok(Json(redirect))
}

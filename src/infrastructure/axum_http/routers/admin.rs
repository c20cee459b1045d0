use std::sync::Arc;

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::SharedBillingMode;
use crate::{
    domain::value_objects::enums::billing_modes::BillingMode,
    infrastructure::axum_http::{auth::AuthUser, error_responses::AppError},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct BillingModeBody {
    pub mode: BillingMode,
}

pub fn routes(billing_mode: Arc<SharedBillingMode>) -> Router {
    Router::new()
        .route("/billing-mode", get(get_billing_mode).put(set_billing_mode))
        .with_state(billing_mode)
}

pub async fn get_billing_mode(
    State(billing_mode): State<Arc<SharedBillingMode>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    auth.require_super_admin()?;

    let mode = billing_mode.get().await?;
    Ok(Json(BillingModeBody { mode }))
}

/// Takes effect for this process at once; other instances see it within the cache TTL.
pub async fn set_billing_mode(
    State(billing_mode): State<Arc<SharedBillingMode>>,
    auth: AuthUser,
    Json(body): Json<BillingModeBody>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_super_admin()?;

    billing_mode.set_mode(body.mode).await?;

    info!(user_id = %auth.user_id, mode = %body.mode, "admin: billing mode updated");
    Ok(Json(body))
}

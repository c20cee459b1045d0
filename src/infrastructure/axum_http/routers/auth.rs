use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};

use crate::{
    application::usecases::registration::RegistrationUseCase,
    domain::{
        repositories::{
            organizations::OrganizationRepository, registration::RegistrationRepository,
            users::UserRepository,
        },
        value_objects::iam::{LoginRequest, RegisterRequest},
    },
    infrastructure::{
        axum_http::error_responses::AppError,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                organizations::OrganizationPostgres, registration::RegistrationPostgres,
                users::UserPostgres,
            },
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, jwt_secret: String) -> Router {
    let registration_repository = RegistrationPostgres::new(Arc::clone(&db_pool));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let organization_repository = OrganizationPostgres::new(Arc::clone(&db_pool));
    let registration_usecase = RegistrationUseCase::new(
        Arc::new(registration_repository),
        Arc::new(user_repository),
        Arc::new(organization_repository),
        jwt_secret,
    );

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(Arc::new(registration_usecase))
}

pub async fn register<R, U, O>(
    State(registration_usecase): State<Arc<RegistrationUseCase<R, U, O>>>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError>
where
    R: RegistrationRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    O: OrganizationRepository + Send + Sync + 'static,
{
    let response = registration_usecase.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login<R, U, O>(
    State(registration_usecase): State<Arc<RegistrationUseCase<R, U, O>>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError>
where
    R: RegistrationRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    O: OrganizationRepository + Send + Sync + 'static,
{
    let response = registration_usecase.login(request).await?;
    Ok(Json(response))
}

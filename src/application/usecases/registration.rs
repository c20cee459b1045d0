use std::sync::Arc;

use argon2::{
    Argon2, PasswordHasher, PasswordVerifier,
    password_hash::{PasswordHash, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::{organizations::InsertOrganizationEntity, users::NewAdminUser},
    repositories::{
        organizations::OrganizationRepository,
        registration::{RegistrationConflict, RegistrationRepository},
        users::UserRepository,
    },
    value_objects::{
        enums::user_roles::UserRole,
        iam::{AuthResponse, Claims, DEFAULT_CATEGORIES, LoginRequest, RegisterRequest, slugify},
        plans::{TRIAL_DAYS, TRIAL_PLAN_SLUG},
    },
};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("email is already registered")]
    EmailTaken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RegistrationError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            RegistrationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RegistrationError::EmailTaken => StatusCode::CONFLICT,
            RegistrationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("organization is inactive")]
    OrganizationInactive,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::OrganizationInactive => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct RegistrationUseCase<R, U, O>
where
    R: RegistrationRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    O: OrganizationRepository + Send + Sync + 'static,
{
    registration_repo: Arc<R>,
    user_repo: Arc<U>,
    organization_repo: Arc<O>,
    jwt_secret: String,
}

impl<R, U, O> RegistrationUseCase<R, U, O>
where
    R: RegistrationRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    O: OrganizationRepository + Send + Sync + 'static,
{
    pub fn new(
        registration_repo: Arc<R>,
        user_repo: Arc<U>,
        organization_repo: Arc<O>,
        jwt_secret: String,
    ) -> Self {
        Self {
            registration_repo,
            user_repo,
            organization_repo,
            jwt_secret,
        }
    }

    /// Creates the organization on a trial of the pro plan together with its
    /// first admin and default categories, then signs the admin in.
    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<AuthResponse, RegistrationError> {
        let organization_name = request.organization_name.trim().to_string();
        let email = request.email.trim().to_lowercase();

        if organization_name.is_empty() || request.name.trim().is_empty() {
            return Err(RegistrationError::InvalidInput(
                "organization name and name are required",
            ));
        }
        if !email.contains('@') {
            return Err(RegistrationError::InvalidInput("email is invalid"));
        }
        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(RegistrationError::InvalidInput(
                "password must be at least 8 characters",
            ));
        }

        let mut slug = slugify(&organization_name);
        if slug.is_empty() {
            slug = "org".to_string();
        }

        let password_hash = hash_password(&request.password)?;

        let organization = InsertOrganizationEntity {
            name: organization_name,
            slug,
            is_active: true,
            plan: TRIAL_PLAN_SLUG.to_string(),
            trial_ends_at: Some(Utc::now() + Duration::days(TRIAL_DAYS)),
        };
        let admin = NewAdminUser {
            name: request.name.trim().to_string(),
            email: email.clone(),
            password_hash,
        };
        let categories = DEFAULT_CATEGORIES
            .iter()
            .map(|(name, color)| (name.to_string(), color.to_string()))
            .collect();

        let account = self
            .registration_repo
            .register_organization(organization, admin, categories)
            .await
            .map_err(|err| match err.downcast_ref::<RegistrationConflict>() {
                Some(RegistrationConflict::EmailTaken) => {
                    warn!(email = %email, "registration: email already registered");
                    RegistrationError::EmailTaken
                }
                None => {
                    error!(db_error = ?err, "registration: transaction failed");
                    RegistrationError::Internal(err)
                }
            })?;

        let token = self.issue_token(
            account.user_id,
            account.organization_id,
            &email,
            UserRole::Admin,
        )?;

        info!(
            organization_id = %account.organization_id,
            slug = %account.organization_slug,
            "registration: organization registered"
        );

        Ok(AuthResponse {
            token,
            user_id: account.user_id,
            organization_id: account.organization_id,
            organization_slug: account.organization_slug,
            role: UserRole::Admin.to_string(),
        })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = request.email.trim().to_lowercase();

        let user = self
            .user_repo
            .find_by_email(&email)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "auth: failed to load user");
                AuthError::Internal(err)
            })?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            warn!(user_id = %user.id, "auth: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let organization = self
            .organization_repo
            .find_by_id(user.organization_id)
            .await
            .map_err(|err| {
                error!(organization_id = %user.organization_id, db_error = ?err, "auth: failed to load organization");
                AuthError::Internal(err)
            })?
            .ok_or(AuthError::InvalidCredentials)?;

        if !organization.is_active {
            warn!(organization_id = %organization.id, "auth: login to inactive organization");
            return Err(AuthError::OrganizationInactive);
        }

        let role = UserRole::from_str(&user.role);
        let token = self.issue_token(user.id, organization.id, &user.email, role)?;

        info!(user_id = %user.id, organization_id = %organization.id, "auth: login succeeded");
        Ok(AuthResponse {
            token,
            user_id: user.id,
            organization_id: organization.id,
            organization_slug: organization.slug,
            role: role.to_string(),
        })
    }

    fn issue_token(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        email: &str,
        role: UserRole,
    ) -> anyhow::Result<String> {
        let exp = (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            organization_id: organization_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            exp,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|err| anyhow::anyhow!("failed to sign token: {}", err))
    }
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow::anyhow!("password hashing failed: {}", err))
}

fn verify_password(password: &str, password_hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|err| anyhow::anyhow!("stored password hash is malformed: {}", err))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

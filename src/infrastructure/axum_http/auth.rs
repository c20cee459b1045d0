use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use uuid::Uuid;

use super::error_responses::AppError;
use crate::{
    config::config_loader,
    domain::value_objects::{enums::user_roles::UserRole, iam::Claims},
};

/// Caller identity taken from a bearer token issued at login or registration.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("admin role required".to_string()))
        }
    }

    pub fn require_super_admin(&self) -> Result<(), AppError> {
        if self.role == UserRole::SuperAdmin {
            Ok(())
        } else {
            Err(AppError::Forbidden("super admin role required".to_string()))
        }
    }
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AppError::Unauthorized(format!("JWT validation failed: {e}")))?;

    Ok(token_data.claims)
}

impl TryFrom<Claims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user ID in token".to_string()))?;
        let organization_id = Uuid::parse_str(&claims.organization_id)
            .map_err(|_| AppError::Unauthorized("Invalid organization ID in token".to_string()))?;

        Ok(AuthUser {
            user_id,
            organization_id,
            email: claims.email,
            role: UserRole::from_str(&claims.role),
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_str = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

        let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        let secret = config_loader::get_jwt_secret()?;
        let claims = validate_jwt(token, &secret.secret)?;

        AuthUser::try_from(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "supersecretjwtsecretforunittesting123";

    fn set_env_vars() {
        unsafe {
            std::env::set_var("JWT_SECRET", SECRET);
        }
    }

    fn token_for(role: &str, expires_in: Duration) -> (String, Claims) {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            organization_id: Uuid::new_v4().to_string(),
            email: "owner@acme.test".to_string(),
            role: role.to_string(),
            exp: (Utc::now() + expires_in).timestamp() as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        (token, claims)
    }

    async fn extract(header: Option<String>) -> Result<AuthUser, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn valid_bearer_token_is_accepted() {
        set_env_vars();
        let (token, claims) = token_for("admin", Duration::hours(1));

        let user = extract(Some(format!("Bearer {token}"))).await.unwrap();

        assert_eq!(user.user_id.to_string(), claims.sub);
        assert_eq!(user.organization_id.to_string(), claims.organization_id);
        assert_eq!(user.role, UserRole::Admin);
        assert!(user.require_admin().is_ok());
        assert!(user.require_super_admin().is_err());
    }

    #[tokio::test]
    async fn missing_or_malformed_header_is_unauthorized() {
        set_env_vars();
        let (token, _) = token_for("admin", Duration::hours(1));

        let missing = extract(None).await.unwrap_err();
        let no_bearer = extract(Some(token)).await.unwrap_err();

        assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(no_bearer.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn expired_or_foreign_tokens_are_rejected() {
        let (expired, _) = token_for("admin", Duration::hours(-2));
        assert!(validate_jwt(&expired, SECRET).is_err());

        let (fresh, _) = token_for("admin", Duration::hours(1));
        assert!(validate_jwt(&fresh, "some-other-secret").is_err());
    }

    #[test]
    fn plain_users_are_not_admins() {
        let (_, claims) = token_for("user", Duration::hours(1));
        let user = AuthUser::try_from(claims).unwrap();

        assert!(matches!(user.require_admin(), Err(AppError::Forbidden(_))));
    }
}

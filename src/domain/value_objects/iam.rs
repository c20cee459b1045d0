use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_CATEGORIES: [(&str, &str); 3] = [
    ("Feature", "#3b82f6"),
    ("Improvement", "#10b981"),
    ("Bug", "#ef4444"),
];

/// JWT payload issued at login and registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub organization_id: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub organization_name: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub organization_slug: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredAccount {
    pub organization_id: Uuid,
    pub organization_slug: String,
    pub user_id: Uuid,
}

/// Lowercase ASCII alphanumerics separated by single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::domain::{
    entities::{organizations::InsertOrganizationEntity, users::NewAdminUser},
    value_objects::iam::RegisteredAccount,
};

/// Conflicts detected inside the registration transaction. Returned through
/// `anyhow` so the transaction rolls back before the caller sees them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationConflict {
    #[error("email is already registered")]
    EmailTaken,
}

#[automock]
#[async_trait]
pub trait RegistrationRepository {
    /// Creates the organization, its admin user and the given categories
    /// atomically. A taken slug gets a numeric suffix.
    async fn register_organization(
        &self,
        organization: InsertOrganizationEntity,
        admin: NewAdminUser,
        categories: Vec<(String, String)>,
    ) -> Result<RegisteredAccount>;
}

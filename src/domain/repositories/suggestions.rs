use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::suggestions::{InsertSuggestionEntity, SuggestionEntity},
    value_objects::votes::PublicSuggestion,
};

#[automock]
#[async_trait]
pub trait SuggestionRepository {
    /// Tenant-scoped lookup of a public suggestion: hidden ones and those of
    /// another organization are `None`.
    async fn find_public_in_organization(
        &self,
        suggestion_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<SuggestionEntity>>;

    async fn create_suggestion(&self, suggestion: InsertSuggestionEntity)
    -> Result<SuggestionEntity>;

    async fn list_public_with_votes(&self, organization_id: Uuid) -> Result<Vec<PublicSuggestion>>;
}

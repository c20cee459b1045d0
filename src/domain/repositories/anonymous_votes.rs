use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::anonymous_votes::InsertAnonymousVoteEntity;

#[automock]
#[async_trait]
pub trait AnonymousVoteRepository {
    async fn find_vote_id(&self, suggestion_id: Uuid, fingerprint: &str) -> Result<Option<Uuid>>;

    async fn insert_vote(&self, vote: InsertAnonymousVoteEntity) -> Result<Uuid>;

    async fn delete_vote(&self, vote_id: Uuid) -> Result<()>;

    async fn count_for_suggestion(&self, suggestion_id: Uuid) -> Result<i64>;
}

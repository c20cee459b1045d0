use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::anonymous_votes::InsertAnonymousVoteEntity,
        repositories::anonymous_votes::AnonymousVoteRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::anonymous_votes},
};

pub struct AnonymousVotePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AnonymousVotePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AnonymousVoteRepository for AnonymousVotePostgres {
    async fn find_vote_id(&self, suggestion_id: Uuid, fingerprint: &str) -> Result<Option<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let vote_id = anonymous_votes::table
            .filter(anonymous_votes::suggestion_id.eq(suggestion_id))
            .filter(anonymous_votes::fingerprint.eq(fingerprint))
            .select(anonymous_votes::id)
            .first::<Uuid>(&mut conn)
            .optional()?;

        Ok(vote_id)
    }

    async fn insert_vote(&self, vote: InsertAnonymousVoteEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let id = insert_into(anonymous_votes::table)
            .values(&vote)
            .returning(anonymous_votes::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(id)
    }

    async fn delete_vote(&self, vote_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(anonymous_votes::table.filter(anonymous_votes::id.eq(vote_id)))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn count_for_suggestion(&self, suggestion_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = anonymous_votes::table
            .filter(anonymous_votes::suggestion_id.eq(suggestion_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }
}

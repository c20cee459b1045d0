use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, dsl::count_star, insert_into, prelude::*};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

use crate::{
    domain::{
        entities::suggestions::{InsertSuggestionEntity, SuggestionEntity},
        repositories::suggestions::SuggestionRepository,
        value_objects::votes::PublicSuggestion,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{anonymous_votes, suggestions, votes},
    },
};

pub struct SuggestionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SuggestionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SuggestionRepository for SuggestionPostgres {
    async fn find_public_in_organization(
        &self,
        suggestion_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<SuggestionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let suggestion = suggestions::table
            .filter(suggestions::id.eq(suggestion_id))
            .filter(suggestions::organization_id.eq(organization_id))
            .filter(suggestions::is_public.eq(true))
            .select(SuggestionEntity::as_select())
            .first::<SuggestionEntity>(&mut conn)
            .optional()?;

        Ok(suggestion)
    }

    async fn create_suggestion(
        &self,
        suggestion: InsertSuggestionEntity,
    ) -> Result<SuggestionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let created = insert_into(suggestions::table)
            .values(&suggestion)
            .returning(SuggestionEntity::as_returning())
            .get_result::<SuggestionEntity>(&mut conn)?;

        Ok(created)
    }

    async fn list_public_with_votes(&self, organization_id: Uuid) -> Result<Vec<PublicSuggestion>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = suggestions::table
            .filter(suggestions::organization_id.eq(organization_id))
            .filter(suggestions::is_public.eq(true))
            .order(suggestions::created_at.desc())
            .select(SuggestionEntity::as_select())
            .load::<SuggestionEntity>(&mut conn)?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

        let member_votes = votes::table
            .filter(votes::suggestion_id.eq_any(ids.clone()))
            .group_by(votes::suggestion_id)
            .select((votes::suggestion_id, count_star()))
            .load::<(Uuid, i64)>(&mut conn)?;

        let anonymous = anonymous_votes::table
            .filter(anonymous_votes::suggestion_id.eq_any(ids))
            .group_by(anonymous_votes::suggestion_id)
            .select((anonymous_votes::suggestion_id, count_star()))
            .load::<(Uuid, i64)>(&mut conn)?;

        let mut totals: HashMap<Uuid, i64> = HashMap::new();
        for (suggestion_id, count) in member_votes.into_iter().chain(anonymous) {
            *totals.entry(suggestion_id).or_default() += count;
        }

        let mut board: Vec<PublicSuggestion> = rows
            .into_iter()
            .map(|row| PublicSuggestion {
                vote_count: totals.get(&row.id).copied().unwrap_or_default(),
                id: row.id,
                category_id: row.category_id,
                title: row.title,
                description: row.description,
                status: row.status,
                created_at: row.created_at,
            })
            .collect();
        // Stable sort keeps newest first among equal counts.
        board.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));

        Ok(board)
    }
}

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::organizations::OrganizationEntity,
        repositories::organizations::OrganizationRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::organizations},
};

pub struct OrganizationPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl OrganizationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl OrganizationRepository for OrganizationPostgres {
    async fn find_by_id(&self, organization_id: Uuid) -> Result<Option<OrganizationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let organization = organizations::table
            .filter(organizations::id.eq(organization_id))
            .select(OrganizationEntity::as_select())
            .first::<OrganizationEntity>(&mut conn)
            .optional()?;

        Ok(organization)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<OrganizationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let organization = organizations::table
            .filter(organizations::slug.eq(slug))
            .select(OrganizationEntity::as_select())
            .first::<OrganizationEntity>(&mut conn)
            .optional()?;

        Ok(organization)
    }

    async fn find_by_stripe_customer_id(
        &self,
        stripe_customer_id: &str,
    ) -> Result<Option<OrganizationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let organization = organizations::table
            .filter(organizations::stripe_customer_id.eq(stripe_customer_id))
            .select(OrganizationEntity::as_select())
            .first::<OrganizationEntity>(&mut conn)
            .optional()?;

        Ok(organization)
    }

    async fn set_stripe_customer_id(
        &self,
        organization_id: Uuid,
        stripe_customer_id: &str,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(organizations::table)
            .filter(organizations::id.eq(organization_id))
            .set((
                organizations::stripe_customer_id.eq(Some(stripe_customer_id)),
                organizations::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn set_plan(&self, organization_id: Uuid, plan_slug: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(organizations::table)
            .filter(organizations::id.eq(organization_id))
            .set((
                organizations::plan.eq(plan_slug),
                organizations::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}

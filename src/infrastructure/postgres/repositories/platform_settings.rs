use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;

use crate::{
    domain::repositories::platform_settings::PlatformSettingsRepository,
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::platform_settings},
};

pub struct PlatformSettingsPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PlatformSettingsPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PlatformSettingsRepository for PlatformSettingsPostgres {
    async fn find_value(&self, key: &str) -> Result<Option<String>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let value = platform_settings::table
            .filter(platform_settings::key.eq(key))
            .select(platform_settings::value)
            .first::<String>(&mut conn)
            .optional()?;

        Ok(value)
    }

    async fn upsert_value(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        insert_into(platform_settings::table)
            .values((
                platform_settings::key.eq(key),
                platform_settings::value.eq(value),
                platform_settings::updated_at.eq(now),
            ))
            .on_conflict(platform_settings::key)
            .do_update()
            .set((
                platform_settings::value.eq(value),
                platform_settings::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            plans::{PlanEntity, PlanRow},
            subscriptions::{
                SubscriptionEntity, SubscriptionStateChangeset, UpsertSubscriptionEntity,
            },
        },
        repositories::subscriptions::SubscriptionRepository,
        value_objects::{
            enums::subscription_statuses::SubscriptionStatus, subscriptions::ActiveSubscription,
        },
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{plans, subscriptions},
    },
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_by_stripe_subscription_id(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let subscription = subscriptions::table
            .filter(subscriptions::stripe_subscription_id.eq(stripe_subscription_id))
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(subscription)
    }

    async fn find_active_for_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<ActiveSubscription>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = subscriptions::table
            .inner_join(plans::table)
            .filter(subscriptions::organization_id.eq(organization_id))
            .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
            .order(subscriptions::updated_at.desc())
            .select((SubscriptionEntity::as_select(), PlanRow::as_select()))
            .first::<(SubscriptionEntity, PlanRow)>(&mut conn)
            .optional()?;

        Ok(row.map(|(subscription, plan)| ActiveSubscription {
            subscription,
            plan: PlanEntity::from(plan),
        }))
    }

    async fn upsert_by_stripe_subscription_id(
        &self,
        subscription: UpsertSubscriptionEntity,
    ) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let id = insert_into(subscriptions::table)
            .values(&subscription)
            .on_conflict(subscriptions::stripe_subscription_id)
            .do_update()
            .set((&subscription, subscriptions::updated_at.eq(Utc::now())))
            .returning(subscriptions::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(id)
    }

    async fn update_status_by_stripe_subscription_id(
        &self,
        stripe_subscription_id: &str,
        status: SubscriptionStatus,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(subscriptions::table)
            .filter(subscriptions::stripe_subscription_id.eq(stripe_subscription_id))
            .set((
                subscriptions::status.eq(status.to_string()),
                subscriptions::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(updated > 0)
    }

    async fn apply_provider_state(
        &self,
        stripe_subscription_id: &str,
        changes: SubscriptionStateChangeset,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(subscriptions::table)
            .filter(subscriptions::stripe_subscription_id.eq(stripe_subscription_id))
            .set((&changes, subscriptions::updated_at.eq(Utc::now())))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn set_plan(&self, subscription_id: Uuid, plan_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(subscriptions::table)
            .filter(subscriptions::id.eq(subscription_id))
            .set((
                subscriptions::plan_id.eq(plan_id),
                subscriptions::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}

use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::{
        SubscriptionEntity, SubscriptionStateChangeset, UpsertSubscriptionEntity,
    },
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus, subscriptions::ActiveSubscription,
    },
};

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    async fn find_by_stripe_subscription_id(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<SubscriptionEntity>>;

    /// Most recently updated `active` subscription of the organization, with its plan.
    async fn find_active_for_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<ActiveSubscription>>;

    /// Inserts, or overwrites the row with the same `stripe_subscription_id`.
    async fn upsert_by_stripe_subscription_id(
        &self,
        subscription: UpsertSubscriptionEntity,
    ) -> Result<Uuid>;

    /// Returns whether a row was updated.
    async fn update_status_by_stripe_subscription_id(
        &self,
        stripe_subscription_id: &str,
        status: SubscriptionStatus,
    ) -> Result<bool>;

    async fn apply_provider_state(
        &self,
        stripe_subscription_id: &str,
        changes: SubscriptionStateChangeset,
    ) -> Result<()>;

    async fn set_plan(&self, subscription_id: Uuid, plan_id: Uuid) -> Result<()>;
}

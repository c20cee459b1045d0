use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::organizations::OrganizationEntity;

#[automock]
#[async_trait]
pub trait OrganizationRepository {
    async fn find_by_id(&self, organization_id: Uuid) -> Result<Option<OrganizationEntity>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<OrganizationEntity>>;

    async fn find_by_stripe_customer_id(
        &self,
        stripe_customer_id: &str,
    ) -> Result<Option<OrganizationEntity>>;

    async fn set_stripe_customer_id(
        &self,
        organization_id: Uuid,
        stripe_customer_id: &str,
    ) -> Result<()>;

    async fn set_plan(&self, organization_id: Uuid, plan_slug: &str) -> Result<()>;
}

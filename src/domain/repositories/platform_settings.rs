use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

pub const BILLING_MODE_KEY: &str = "billing_mode";

#[automock]
#[async_trait]
pub trait PlatformSettingsRepository {
    async fn find_value(&self, key: &str) -> Result<Option<String>>;

    async fn upsert_value(&self, key: &str, value: &str) -> Result<()>;
}

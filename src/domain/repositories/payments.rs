use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::payments::InsertPaymentEntity;

#[automock]
#[async_trait]
pub trait PaymentRepository {
    /// Appends a ledger row. Rows are never updated or merged.
    async fn record_payment(&self, payment: InsertPaymentEntity) -> Result<Uuid>;
}

use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::payments;

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub organization_id: Uuid,
    pub stripe_invoice_id: String,
    pub stripe_charge_id: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub plan_name: Option<String>,
    pub hosted_invoice_url: Option<String>,
    pub mode: String,
}

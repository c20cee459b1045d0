use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::categories;

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = categories)]
pub struct InsertCategoryEntity {
    pub organization_id: Uuid,
    pub name: String,
    pub color: String,
    pub sort_order: i32,
}

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::anonymous_votes;

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = anonymous_votes)]
pub struct InsertAnonymousVoteEntity {
    pub suggestion_id: Uuid,
    pub organization_id: Uuid,
    pub fingerprint: String,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

use anyhow::Result;
use async_trait::async_trait;
use diesel::{
    RunQueryDsl,
    dsl::exists,
    insert_into,
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
    select,
};
use std::{collections::HashSet, sync::Arc};
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            categories::InsertCategoryEntity,
            organizations::InsertOrganizationEntity,
            users::{InsertUserEntity, NewAdminUser},
        },
        repositories::registration::{RegistrationConflict, RegistrationRepository},
        value_objects::{enums::user_roles::UserRole, iam::RegisteredAccount},
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{categories, organizations, users},
    },
};

pub struct RegistrationPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl RegistrationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

/// `base` if free, otherwise the first `base-N` (N >= 2) not in `taken`.
fn next_free_slug(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }

    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| format!("{base}-{}", Uuid::new_v4().simple()))
}

#[async_trait]
impl RegistrationRepository for RegistrationPostgres {
    async fn register_organization(
        &self,
        organization: InsertOrganizationEntity,
        admin: NewAdminUser,
        default_categories: Vec<(String, String)>,
    ) -> Result<RegisteredAccount> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<_, anyhow::Error, _>(|conn| {
            let taken: HashSet<String> = organizations::table
                .filter(
                    organizations::slug
                        .eq(&organization.slug)
                        .or(organizations::slug.like(format!("{}-%", organization.slug))),
                )
                .select(organizations::slug)
                .load::<String>(conn)?
                .into_iter()
                .collect();
            let slug = next_free_slug(&organization.slug, &taken);

            let organization_id = insert_into(organizations::table)
                .values(&InsertOrganizationEntity {
                    slug: slug.clone(),
                    ..organization
                })
                .returning(organizations::id)
                .get_result::<Uuid>(conn)?;

            let email_taken = select(exists(users::table.filter(users::email.eq(&admin.email))))
                .get_result::<bool>(conn)?;
            if email_taken {
                return Err(RegistrationConflict::EmailTaken.into());
            }

            let user_id = match insert_into(users::table)
                .values(&InsertUserEntity {
                    organization_id,
                    name: admin.name,
                    email: admin.email,
                    password_hash: admin.password_hash,
                    role: UserRole::Admin.to_string(),
                })
                .returning(users::id)
                .get_result::<Uuid>(conn)
            {
                Ok(user_id) => user_id,
                Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    return Err(RegistrationConflict::EmailTaken.into());
                }
                Err(err) => return Err(err.into()),
            };

            let rows: Vec<InsertCategoryEntity> = default_categories
                .into_iter()
                .enumerate()
                .map(|(index, (name, color))| InsertCategoryEntity {
                    organization_id,
                    name,
                    color,
                    sort_order: index as i32,
                })
                .collect();
            insert_into(categories::table).values(&rows).execute(conn)?;

            Ok(RegisteredAccount {
                organization_id,
                organization_slug: slug,
                user_id,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taken(slugs: &[&str]) -> HashSet<String> {
        slugs.iter().map(|slug| slug.to_string()).collect()
    }

    #[test]
    fn free_slug_is_used_as_is() {
        assert_eq!(next_free_slug("acme", &taken(&["acme-rockets"])), "acme");
    }

    #[test]
    fn taken_slug_gets_the_first_free_suffix() {
        assert_eq!(next_free_slug("acme", &taken(&["acme"])), "acme-2");
        assert_eq!(
            next_free_slug("acme", &taken(&["acme", "acme-2", "acme-3"])),
            "acme-4"
        );
    }
}

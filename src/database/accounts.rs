use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::account::{Account, Role};

/// Persistence seam for the three role-keyed account collections.
///
/// `save` is an upsert by id: the row is inserted if absent, otherwise its
/// mutable fields are replaced.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, role: Role, id: i64) -> Result<Option<Account>, DatabaseError>;
    async fn save(&self, role: Role, account: &Account) -> Result<Account, DatabaseError>;
}

/// Postgres-backed account store. The role picks the table; the three
/// tables share the same lifecycle columns.
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_id(&self, role: Role, id: i64) -> Result<Option<Account>, DatabaseError> {
        // Table name comes from the Role enum, never from request input
        let query = format!(
            "SELECT id, name, email, status FROM {} WHERE id = $1",
            role.table()
        );

        let account = sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    async fn save(&self, role: Role, account: &Account) -> Result<Account, DatabaseError> {
        let query = format!(
            "INSERT INTO {} (id, name, email, status)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE
             SET name = EXCLUDED.name, email = EXCLUDED.email, status = EXCLUDED.status
             RETURNING id, name, email, status",
            role.table()
        );

        let saved = sqlx::query_as::<_, Account>(&query)
            .bind(account.id)
            .bind(&account.name)
            .bind(&account.email)
            .bind(account.status)
            .fetch_one(&self.pool)
            .await?;

        Ok(saved)
    }
}

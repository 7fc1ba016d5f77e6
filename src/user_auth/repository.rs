//! Credential persistence.
//!
//! `users_tb.email` is UNIQUE; a lost insert race surfaces as
//! [`InsertOutcome::Duplicate`] rather than a raw constraint error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use super::models::{AccountState, StoredAccount};
use crate::error::ServiceError;

/// Outcome of a unique-constrained insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<T> {
    Inserted(T),
    Duplicate,
}

#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Load the row for `email`, tombstoned or not
    async fn find_any(&self, email: &str) -> Result<Option<StoredAccount>, ServiceError>;

    /// Insert a new active account, returning its user_id
    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<InsertOutcome<i64>, ServiceError>;

    /// Clear the tombstone and replace the hash. False if the row was not tombstoned.
    async fn reactivate(&self, user_id: i64, password_hash: &str) -> Result<bool, ServiceError>;

    /// Replace the hash of an active account. False if not active.
    async fn update_password(
        &self,
        user_id: i64,
        password_hash: &str,
    ) -> Result<bool, ServiceError>;

    /// Tombstone an active account. False if not active.
    async fn tombstone(&self, user_id: i64) -> Result<bool, ServiceError>;
}

/// PostgreSQL-backed credential store
pub struct PgCredentialRepository {
    pool: PgPool,
}

impl PgCredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialRepository for PgCredentialRepository {
    async fn find_any(&self, email: &str) -> Result<Option<StoredAccount>, ServiceError> {
        let row = sqlx::query(
            r#"SELECT user_id, email, password_hash, deleted_at
               FROM users_tb WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| {
            let hash: String = r.get("password_hash");
            let deleted_at: Option<DateTime<Utc>> = r.get("deleted_at");
            StoredAccount {
                user_id: r.get("user_id"),
                email: r.get("email"),
                state: match deleted_at {
                    None => AccountState::Active(hash),
                    Some(_) => AccountState::Tombstoned(hash),
                },
            }
        }))
    }

    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<InsertOutcome<i64>, ServiceError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users_tb (email, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            RETURNING user_id
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match id {
            Some(id) => InsertOutcome::Inserted(id),
            None => InsertOutcome::Duplicate,
        })
    }

    async fn reactivate(&self, user_id: i64, password_hash: &str) -> Result<bool, ServiceError> {
        let result = sqlx::query(
            r#"
            UPDATE users_tb
            SET password_hash = $2, deleted_at = NULL, updated_at = NOW()
            WHERE user_id = $1 AND deleted_at IS NOT NULL
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_password(
        &self,
        user_id: i64,
        password_hash: &str,
    ) -> Result<bool, ServiceError> {
        let result = sqlx::query(
            r#"
            UPDATE users_tb
            SET password_hash = $2, updated_at = NOW()
            WHERE user_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn tombstone(&self, user_id: i64) -> Result<bool, ServiceError> {
        let result = sqlx::query(
            r#"
            UPDATE users_tb
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE user_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

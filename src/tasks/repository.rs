use async_trait::async_trait;
use sqlx::PgPool;

use super::models::Task;
use crate::error::ServiceError;

/// Task storage. Every method is scoped by owner; rows owned by someone
/// else behave as absent.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list(&self, owner: &str) -> Result<Vec<Task>, ServiceError>;

    async fn insert(&self, owner: &str, title: &str) -> Result<Task, ServiceError>;

    async fn update(
        &self,
        owner: &str,
        id: i64,
        title: Option<&str>,
        completed: Option<bool>,
    ) -> Result<Option<Task>, ServiceError>;

    /// `false` when nothing owned by `owner` matched
    async fn delete(&self, owner: &str, id: i64) -> Result<bool, ServiceError>;
}

const TASK_COLUMNS: &str = "id, owner_email, title, completed, created_at, updated_at";

pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn list(&self, owner: &str) -> Result<Vec<Task>, ServiceError> {
        let sql = format!(
            "SELECT {} FROM tasks_tb WHERE owner_email = $1 ORDER BY id ASC",
            TASK_COLUMNS
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert(&self, owner: &str, title: &str) -> Result<Task, ServiceError> {
        let sql = format!(
            "INSERT INTO tasks_tb (owner_email, title) VALUES ($1, $2) RETURNING {}",
            TASK_COLUMNS
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(owner)
            .bind(title)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update(
        &self,
        owner: &str,
        id: i64,
        title: Option<&str>,
        completed: Option<bool>,
    ) -> Result<Option<Task>, ServiceError> {
        let sql = format!(
            r#"UPDATE tasks_tb SET
                   title = COALESCE($3, title),
                   completed = COALESCE($4, completed),
                   updated_at = NOW()
               WHERE id = $1 AND owner_email = $2
               RETURNING {}"#,
            TASK_COLUMNS
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner)
            .bind(title)
            .bind(completed)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, owner: &str, id: i64) -> Result<bool, ServiceError> {
        let result = sqlx::query("DELETE FROM tasks_tb WHERE id = $1 AND owner_email = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{Reservation, ReservationRequest};
use crate::error::ServiceError;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Every reservation, ordered by start
    async fn list_all(&self) -> Result<Vec<Reservation>, ServiceError>;

    async fn insert(&self, owner: &str, req: &ReservationRequest)
    -> Result<Reservation, ServiceError>;

    /// Replace title and window of a row owned by `owner`
    async fn replace(
        &self,
        owner: &str,
        id: i64,
        req: &ReservationRequest,
    ) -> Result<Option<Reservation>, ServiceError>;

    async fn delete(&self, owner: &str, id: i64) -> Result<bool, ServiceError>;
}

const RESERVATION_COLUMNS: &str =
    "id, user_email, title, start_time, end_time, created_at, updated_at";

pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    async fn list_all(&self) -> Result<Vec<Reservation>, ServiceError> {
        let sql = format!(
            "SELECT {} FROM reservations_tb ORDER BY start_time ASC, id ASC",
            RESERVATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Reservation>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert(
        &self,
        owner: &str,
        req: &ReservationRequest,
    ) -> Result<Reservation, ServiceError> {
        let sql = format!(
            r#"INSERT INTO reservations_tb (user_email, title, start_time, end_time)
               VALUES ($1, $2, $3, $4)
               RETURNING {}"#,
            RESERVATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Reservation>(&sql)
            .bind(owner)
            .bind(&req.title)
            .bind(req.start_time)
            .bind(req.end_time)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn replace(
        &self,
        owner: &str,
        id: i64,
        req: &ReservationRequest,
    ) -> Result<Option<Reservation>, ServiceError> {
        let sql = format!(
            r#"UPDATE reservations_tb
               SET title = $3, start_time = $4, end_time = $5, updated_at = NOW()
               WHERE id = $1 AND user_email = $2
               RETURNING {}"#,
            RESERVATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Reservation>(&sql)
            .bind(id)
            .bind(owner)
            .bind(&req.title)
            .bind(req.start_time)
            .bind(req.end_time)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, owner: &str, id: i64) -> Result<bool, ServiceError> {
        let result = sqlx::query("DELETE FROM reservations_tb WHERE id = $1 AND user_email = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

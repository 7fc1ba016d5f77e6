//! Attendance persistence.
//!
//! Writes on an existing row are compare-and-set: each UPDATE carries the
//! precondition in its WHERE clause and reports whether it applied.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use super::models::{AttendanceRecord, Correction};
use crate::error::ServiceError;

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn find(
        &self,
        email: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, ServiceError>;

    /// Records with `from <= work_date < until`, ascending by date
    async fn find_range(
        &self,
        email: &str,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, ServiceError>;

    /// Insert a started record. `None` if a record for the day already exists.
    async fn insert_started(
        &self,
        email: &str,
        date: NaiveDate,
        start: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>, ServiceError>;

    /// Set start on a record whose start is unset. `None` if the CAS lost.
    async fn set_start_if_unset(
        &self,
        id: i64,
        start: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>, ServiceError>;

    /// Set end on a started, not yet ended record. `None` if the CAS lost.
    async fn set_end_if_open(
        &self,
        id: i64,
        end: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>, ServiceError>;

    /// Create or patch the record for `date` in one statement
    async fn upsert_correction(
        &self,
        email: &str,
        date: NaiveDate,
        correction: &Correction,
    ) -> Result<AttendanceRecord, ServiceError>;
}

const RECORD_COLUMNS: &str =
    "id, user_email, work_date, start_time, end_time, comment, created_at, updated_at";

/// PostgreSQL-backed ledger storage
pub struct PgAttendanceRepository {
    pool: PgPool,
}

impl PgAttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceRepository for PgAttendanceRepository {
    async fn find(
        &self,
        email: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, ServiceError> {
        let sql = format!(
            "SELECT {} FROM attendance_tb WHERE user_email = $1 AND work_date = $2",
            RECORD_COLUMNS
        );
        let row = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(email)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_range(
        &self,
        email: &str,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, ServiceError> {
        let sql = format!(
            r#"SELECT {} FROM attendance_tb
               WHERE user_email = $1 AND work_date >= $2 AND work_date < $3
               ORDER BY work_date ASC"#,
            RECORD_COLUMNS
        );
        let rows = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(email)
            .bind(from)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert_started(
        &self,
        email: &str,
        date: NaiveDate,
        start: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>, ServiceError> {
        let sql = format!(
            r#"INSERT INTO attendance_tb (user_email, work_date, start_time)
               VALUES ($1, $2, $3)
               ON CONFLICT (user_email, work_date) DO NOTHING
               RETURNING {}"#,
            RECORD_COLUMNS
        );
        let row = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(email)
            .bind(date)
            .bind(start)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn set_start_if_unset(
        &self,
        id: i64,
        start: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>, ServiceError> {
        let sql = format!(
            r#"UPDATE attendance_tb SET start_time = $2, updated_at = NOW()
               WHERE id = $1 AND start_time IS NULL
               RETURNING {}"#,
            RECORD_COLUMNS
        );
        let row = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(id)
            .bind(start)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn set_end_if_open(
        &self,
        id: i64,
        end: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>, ServiceError> {
        let sql = format!(
            r#"UPDATE attendance_tb SET end_time = $2, updated_at = NOW()
               WHERE id = $1 AND start_time IS NOT NULL AND end_time IS NULL
               RETURNING {}"#,
            RECORD_COLUMNS
        );
        let row = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(id)
            .bind(end)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn upsert_correction(
        &self,
        email: &str,
        date: NaiveDate,
        correction: &Correction,
    ) -> Result<AttendanceRecord, ServiceError> {
        let sql = format!(
            r#"INSERT INTO attendance_tb (user_email, work_date, start_time, end_time, comment)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (user_email, work_date) DO UPDATE SET
                   start_time = COALESCE(EXCLUDED.start_time, attendance_tb.start_time),
                   end_time   = COALESCE(EXCLUDED.end_time, attendance_tb.end_time),
                   comment    = EXCLUDED.comment,
                   updated_at = NOW()
               RETURNING {}"#,
            RECORD_COLUMNS
        );
        let row = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(email)
            .bind(date)
            .bind(correction.start_time)
            .bind(correction.end_time)
            .bind(&correction.comment)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }
}

/// In-memory ledger storage for tests, with the same per-day uniqueness
#[cfg(test)]
pub mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryAttendanceRepository {
        rows: Mutex<BTreeMap<(String, NaiveDate), AttendanceRecord>>,
        next_id: Mutex<i64>,
    }

    impl MemoryAttendanceRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        fn new_record(
            &self,
            email: &str,
            date: NaiveDate,
            start: Option<DateTime<Utc>>,
            end: Option<DateTime<Utc>>,
            comment: String,
        ) -> AttendanceRecord {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let now = Utc::now();
            AttendanceRecord {
                id: *next_id,
                user_email: email.to_string(),
                work_date: date,
                start_time: start,
                end_time: end,
                comment,
                created_at: now,
                updated_at: now,
            }
        }

        fn update_by_id<F>(&self, id: i64, f: F) -> Option<AttendanceRecord>
        where
            F: FnOnce(&mut AttendanceRecord) -> bool,
        {
            let mut rows = self.rows.lock().unwrap();
            let record = rows.values_mut().find(|r| r.id == id)?;
            if f(record) {
                record.updated_at = Utc::now();
                Some(record.clone())
            } else {
                None
            }
        }
    }

    #[async_trait]
    impl AttendanceRepository for MemoryAttendanceRepository {
        async fn find(
            &self,
            email: &str,
            date: NaiveDate,
        ) -> Result<Option<AttendanceRecord>, ServiceError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.get(&(email.to_string(), date)).cloned())
        }

        async fn find_range(
            &self,
            email: &str,
            from: NaiveDate,
            until: NaiveDate,
        ) -> Result<Vec<AttendanceRecord>, ServiceError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .range((email.to_string(), from)..(email.to_string(), until))
                .map(|(_, r)| r.clone())
                .collect())
        }

        async fn insert_started(
            &self,
            email: &str,
            date: NaiveDate,
            start: DateTime<Utc>,
        ) -> Result<Option<AttendanceRecord>, ServiceError> {
            let key = (email.to_string(), date);
            if self.rows.lock().unwrap().contains_key(&key) {
                return Ok(None);
            }
            let record = self.new_record(email, date, Some(start), None, String::new());
            let mut rows = self.rows.lock().unwrap();
            // Re-check under the same lock that inserts
            if rows.contains_key(&key) {
                return Ok(None);
            }
            rows.insert(key, record.clone());
            Ok(Some(record))
        }

        async fn set_start_if_unset(
            &self,
            id: i64,
            start: DateTime<Utc>,
        ) -> Result<Option<AttendanceRecord>, ServiceError> {
            Ok(self.update_by_id(id, |r| {
                if r.start_time.is_some() {
                    return false;
                }
                r.start_time = Some(start);
                true
            }))
        }

        async fn set_end_if_open(
            &self,
            id: i64,
            end: DateTime<Utc>,
        ) -> Result<Option<AttendanceRecord>, ServiceError> {
            Ok(self.update_by_id(id, |r| {
                if r.start_time.is_none() || r.end_time.is_some() {
                    return false;
                }
                r.end_time = Some(end);
                true
            }))
        }

        async fn upsert_correction(
            &self,
            email: &str,
            date: NaiveDate,
            correction: &Correction,
        ) -> Result<AttendanceRecord, ServiceError> {
            let key = (email.to_string(), date);
            if let Some(record) = self.rows.lock().unwrap().get_mut(&key) {
                if correction.start_time.is_some() {
                    record.start_time = correction.start_time;
                }
                if correction.end_time.is_some() {
                    record.end_time = correction.end_time;
                }
                record.comment = correction.comment.clone();
                record.updated_at = Utc::now();
                return Ok(record.clone());
            }
            let record = self.new_record(
                email,
                date,
                correction.start_time,
                correction.end_time,
                correction.comment.clone(),
            );
            self.rows.lock().unwrap().insert(key, record.clone());
            Ok(record)
        }
    }
}

//! Relational schema
//!
//! Uniqueness lives in storage: one row per email in `users_tb`, one row per
//! (user_email, work_date) in `attendance_tb`. Services rely on these
//! constraints to resolve concurrent inserts.

use sqlx::PgPool;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users_tb (
    user_id       BIGSERIAL PRIMARY KEY,
    email         TEXT        NOT NULL,
    password_hash TEXT        NOT NULL,
    deleted_at    TIMESTAMPTZ NULL,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT users_tb_email_key UNIQUE (email)
)
"#;

const CREATE_ATTENDANCE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS attendance_tb (
    id          BIGSERIAL PRIMARY KEY,
    user_email  TEXT        NOT NULL,
    work_date   DATE        NOT NULL,
    start_time  TIMESTAMPTZ NULL,
    end_time    TIMESTAMPTZ NULL,
    comment     TEXT        NOT NULL DEFAULT '',
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT attendance_tb_user_day_key UNIQUE (user_email, work_date)
)
"#;

const CREATE_TASKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tasks_tb (
    id          BIGSERIAL PRIMARY KEY,
    owner_email TEXT        NOT NULL,
    title       TEXT        NOT NULL,
    completed   BOOLEAN     NOT NULL DEFAULT FALSE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_TASKS_OWNER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS tasks_tb_owner_idx ON tasks_tb (owner_email)";

const CREATE_RESERVATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS reservations_tb (
    id          BIGSERIAL PRIMARY KEY,
    user_email  TEXT        NOT NULL,
    title       TEXT        NOT NULL,
    start_time  TIMESTAMPTZ NOT NULL,
    end_time    TIMESTAMPTZ NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT reservations_tb_window_check CHECK (start_time < end_time)
)
"#;

/// Initialize the PostgreSQL schema. Safe to run on every startup.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Initializing PostgreSQL schema...");

    for (name, stmt) in [
        ("users_tb", CREATE_USERS_TABLE),
        ("attendance_tb", CREATE_ATTENDANCE_TABLE),
        ("tasks_tb", CREATE_TASKS_TABLE),
        ("tasks_tb_owner_idx", CREATE_TASKS_OWNER_INDEX),
        ("reservations_tb", CREATE_RESERVATIONS_TABLE),
    ] {
        sqlx::query(stmt).execute(pool).await.inspect_err(|e| {
            tracing::error!("Failed to create {}: {}", name, e);
        })?;
    }

    tracing::info!("PostgreSQL schema initialized successfully");
    Ok(())
}

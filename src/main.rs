//! Attendance Ledger server
//!
//! ```text
//! ┌──────────┐    ┌───────────┐    ┌──────────────────┐    ┌────────────┐
//! │  Client  │───▶│ Auth Gate │───▶│ Ledger / Tasks / │───▶│ PostgreSQL │
//! │  (HTTP)  │    │  (JWT)    │    │  Reservations    │    │            │
//! └──────────┘    └───────────┘    └──────────────────┘    └────────────┘
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{FixedOffset, Local, Offset};
use clap::Parser;

use attendance_ledger::attendance::{AttendanceLedger, PgAttendanceRepository};
use attendance_ledger::clock::{Clock, SystemClock};
use attendance_ledger::config::AppConfig;
use attendance_ledger::db::Database;
use attendance_ledger::gateway::{self, state::AppState};
use attendance_ledger::logging::init_logging;
use attendance_ledger::reservations::{PgReservationRepository, ReservationBook};
use attendance_ledger::tasks::{PgTaskRepository, TaskBook};
use attendance_ledger::user_auth::{
    CredentialHasher, CredentialService, PgCredentialRepository, TokenService,
};

#[derive(Parser, Debug)]
#[command(version, about = "Authenticated attendance ledger server")]
struct Args {
    /// Config environment; loads config/{env}.yaml
    #[arg(short, long, default_value = "dev")]
    env: String,

    /// Override gateway.port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(&args.env)?;
    if let Some(port) = args.port {
        config.gateway.port = port;
    }

    let _log_guard = init_logging(&config);
    tracing::info!(
        env = %args.env,
        version = env!("GIT_HASH"),
        "Starting attendance ledger"
    );

    // Refuse to start without a usable signing key
    let jwt_secret = config.load_jwt_secret()?;

    let db = Arc::new(
        Database::connect(&config.postgres_url)
            .await
            .context("Failed to connect to PostgreSQL")?,
    );
    db.init_schema()
        .await
        .context("Failed to initialize schema")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let offset = ledger_offset(&config)?;
    tracing::info!(utc_offset_secs = offset.local_minus_utc(), "Ledger day boundary");

    let hasher = CredentialHasher::new(config.auth.password_hash)?;
    let credentials = Arc::new(CredentialService::new(
        Arc::new(PgCredentialRepository::new(db.pool().clone())),
        hasher,
    ));
    let tokens = Arc::new(TokenService::new(
        &jwt_secret,
        chrono::Duration::hours(config.auth.token_ttl_hours as i64),
        clock.clone(),
    ));
    let ledger = Arc::new(AttendanceLedger::new(
        Arc::new(PgAttendanceRepository::new(db.pool().clone())),
        clock,
        offset,
    ));
    let tasks = Arc::new(TaskBook::new(Arc::new(PgTaskRepository::new(
        db.pool().clone(),
    ))));
    let reservations = Arc::new(ReservationBook::new(Arc::new(
        PgReservationRepository::new(db.pool().clone()),
    )));

    let state = Arc::new(AppState::new(
        credentials,
        tokens,
        ledger,
        tasks,
        reservations,
        Some(db),
    ));

    gateway::run_server(state, &config.gateway).await
}

/// Configured offset, or the host's offset at startup
fn ledger_offset(config: &AppConfig) -> Result<FixedOffset> {
    Ok(config
        .attendance
        .fixed_offset()?
        .unwrap_or_else(|| Local::now().offset().fix()))
}

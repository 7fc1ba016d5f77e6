//! Attendance Ledger
//!
//! Authenticated per-user daily attendance records, with personal tasks and a
//! shared reservation calendar behind the same bearer-token gate.
//!
//! # Modules
//!
//! - [`user_auth`] - Credential store, session tokens, auth gate
//! - [`attendance`] - Per-day start/end state machine and corrections
//! - [`tasks`] - Owner-scoped to-do items
//! - [`reservations`] - Shared booking calendar
//! - [`gateway`] - HTTP router, envelope, OpenAPI
//! - [`db`] - PostgreSQL pool and schema bootstrap
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup
//! - [`clock`] - Injectable time source
//! - [`error`] - Shared service error taxonomy

pub mod attendance;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod reservations;
pub mod tasks;
pub mod user_auth;

// Convenient re-exports at crate root
pub use attendance::AttendanceLedger;
pub use config::AppConfig;
pub use error::ServiceError;
pub use user_auth::{CredentialService, TokenService};

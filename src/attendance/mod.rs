//! Attendance ledger
//!
//! One record per (user, calendar day). `start` and `end` are guarded
//! transitions; `update` is the manual override that bypasses them.

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use models::{AttendanceRecord, DayState};
pub use repository::{AttendanceRepository, PgAttendanceRepository};
pub use service::AttendanceLedger;

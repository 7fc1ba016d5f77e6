//! Gateway-level handlers. Domain endpoints live next to their services.

pub mod health;

pub use health::{HealthResponse, health_check};

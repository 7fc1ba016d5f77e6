//! Reservation book: a calendar shared by all users

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use models::Reservation;
pub use repository::{PgReservationRepository, ReservationRepository};
pub use service::ReservationBook;

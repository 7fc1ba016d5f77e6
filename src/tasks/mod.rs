//! Task book: owner-scoped to-do items

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use models::Task;
pub use repository::{PgTaskRepository, TaskRepository};
pub use service::TaskBook;

//! User authentication
//!
//! - `service`: credential store (register / verify / change password / tombstone)
//! - `token`: HS256 session tokens
//! - `middleware`: auth gate injecting [`AuthenticatedUser`]
//! - `handlers`: HTTP endpoints

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

pub use models::{AccountState, AuthenticatedUser, RegistrationOutcome, StoredAccount};
pub use password::CredentialHasher;
pub use repository::{CredentialRepository, InsertOutcome, PgCredentialRepository};
pub use service::CredentialService;
pub use token::{Claims, TokenError, TokenService};

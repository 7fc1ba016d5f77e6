//! Identity models and request/response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored password state of an account row.
///
/// A row is never erased: deletion flips it to `Tombstoned`, and a later
/// registration with the same email brings it back to `Active`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountState {
    Active(String),
    Tombstoned(String),
}

impl AccountState {
    pub fn is_active(&self) -> bool {
        matches!(self, AccountState::Active(_))
    }

    /// PHC-encoded password hash
    pub fn password_hash(&self) -> &str {
        match self {
            AccountState::Active(hash) | AccountState::Tombstoned(hash) => hash,
        }
    }
}

/// Account row as loaded from the credential store (tombstoned rows included)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAccount {
    pub user_id: i64,
    pub email: String,
    pub state: AccountState,
}

/// Verified caller, injected into request extensions by the auth gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub email: String,
}

/// Result of a successful registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationOutcome {
    Created,
    Reactivated,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub outcome: RegistrationOutcome,
}

/// User Registration Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "user1@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

/// User Login Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "user1@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

/// Login response carrying the bearer token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
    /// Expiry as UTC timestamp (seconds)
    pub expires_at: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_state() {
        let active = AccountState::Active("h1".into());
        let gone = AccountState::Tombstoned("h2".into());
        assert!(active.is_active());
        assert!(!gone.is_active());
        assert_eq!(gone.password_hash(), "h2");
    }

    #[test]
    fn test_change_password_request_is_camel_case() {
        let req: ChangePasswordRequest =
            serde_json::from_str(r#"{"oldPassword":"a","newPassword":"b"}"#).unwrap();
        assert_eq!(req.old_password, "a");
        assert_eq!(req.new_password, "b");
    }
}

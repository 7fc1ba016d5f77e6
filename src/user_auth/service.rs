use std::sync::Arc;

use super::models::{AccountState, RegistrationOutcome, StoredAccount};
use super::password::CredentialHasher;
use super::repository::{CredentialRepository, InsertOutcome};
use crate::error::ServiceError;

/// Credential store: registration, verification, password change and deletion.
pub struct CredentialService {
    repo: Arc<dyn CredentialRepository>,
    hasher: CredentialHasher,
}

impl CredentialService {
    pub fn new(repo: Arc<dyn CredentialRepository>, hasher: CredentialHasher) -> Self {
        Self { repo, hasher }
    }

    /// Register a new user, or bring a tombstoned one back with a new password.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(i64, RegistrationOutcome), ServiceError> {
        let email = email.trim();
        let password = password.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ServiceError::validation(
                "Email and password cannot be empty",
            ));
        }

        match self.repo.find_any(email).await? {
            Some(StoredAccount {
                state: AccountState::Active(_),
                ..
            }) => Err(conflict()),
            Some(StoredAccount {
                user_id,
                state: AccountState::Tombstoned(_),
                ..
            }) => {
                let password_hash = self.hasher.hash(password).await?;
                if !self.repo.reactivate(user_id, &password_hash).await? {
                    // Another registration reactivated it first
                    return Err(conflict());
                }
                tracing::info!(user_id, email, "Account reactivated");
                Ok((user_id, RegistrationOutcome::Reactivated))
            }
            None => {
                let password_hash = self.hasher.hash(password).await?;
                match self.repo.insert(email, &password_hash).await? {
                    InsertOutcome::Inserted(user_id) => {
                        tracing::info!(user_id, email, "Account created");
                        Ok((user_id, RegistrationOutcome::Created))
                    }
                    InsertOutcome::Duplicate => {
                        tracing::warn!(email, "Concurrent registration lost the insert race");
                        Err(conflict())
                    }
                }
            }
        }
    }

    /// Check credentials and return the active account they belong to.
    pub async fn verify(&self, email: &str, password: &str) -> Result<StoredAccount, ServiceError> {
        let account = self
            .active_account(email.trim())
            .await?
            .ok_or(ServiceError::Unauthorized)?;

        if !self
            .hasher
            .verify(password.trim(), account.state.password_hash())
            .await?
        {
            return Err(ServiceError::Unauthorized);
        }
        Ok(account)
    }

    pub async fn change_password(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let old_password = old_password.trim();
        let new_password = new_password.trim();
        if new_password.is_empty() {
            return Err(ServiceError::validation("New password cannot be empty"));
        }
        let account = self
            .active_account(email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        if !self
            .hasher
            .verify(old_password, account.state.password_hash())
            .await?
        {
            return Err(ServiceError::Unauthorized);
        }

        let new_hash = self.hasher.hash(new_password).await?;
        if !self
            .repo
            .update_password(account.user_id, &new_hash)
            .await?
        {
            return Err(ServiceError::not_found("User not found"));
        }
        tracing::info!(user_id = account.user_id, "Password changed");
        Ok(())
    }

    /// Soft-delete. Tokens already issued stay valid until they expire.
    pub async fn tombstone(&self, email: &str) -> Result<(), ServiceError> {
        let account = self
            .active_account(email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        if !self.repo.tombstone(account.user_id).await? {
            return Err(ServiceError::not_found("User not found"));
        }
        tracing::info!(user_id = account.user_id, "Account tombstoned");
        Ok(())
    }

    async fn active_account(&self, email: &str) -> Result<Option<StoredAccount>, ServiceError> {
        Ok(self
            .repo
            .find_any(email)
            .await?
            .filter(|a| a.state.is_active()))
    }
}

fn conflict() -> ServiceError {
    ServiceError::Conflict("User already exists".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_auth::password::test_hasher;
    use crate::user_auth::repository::memory::MemoryCredentialRepository;

    fn service() -> CredentialService {
        CredentialService::new(Arc::new(MemoryCredentialRepository::new()), test_hasher())
    }

    #[tokio::test]
    async fn test_register_and_verify() {
        let svc = service();
        let (id, outcome) = svc.register("  u@x.com ", " pw1 ").await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::Created);

        let account = svc.verify("u@x.com", "pw1").await.unwrap();
        assert_eq!(account.user_id, id);
        assert_eq!(account.email, "u@x.com");
    }

    #[tokio::test]
    async fn test_register_rejects_empty_fields() {
        let svc = service();
        assert!(matches!(
            svc.register("   ", "pw").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.register("a@x.com", "  ").await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_register_active_duplicate_conflicts() {
        let svc = service();
        svc.register("a@x.com", "pw").await.unwrap();
        assert!(matches!(
            svc.register("a@x.com", "other").await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_email_is_case_sensitive() {
        let svc = service();
        svc.register("a@x.com", "pw").await.unwrap();
        let (_, outcome) = svc.register("A@x.com", "pw").await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::Created);
    }

    #[tokio::test]
    async fn test_verify_wrong_password_or_unknown_user() {
        let svc = service();
        svc.register("a@x.com", "pw").await.unwrap();
        assert_eq!(
            svc.verify("a@x.com", "nope").await.unwrap_err(),
            ServiceError::Unauthorized
        );
        assert_eq!(
            svc.verify("ghost@x.com", "pw").await.unwrap_err(),
            ServiceError::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_tombstone_then_reactivate_keeps_user_id() {
        let svc = service();
        let (id, _) = svc.register("a@x.com", "old").await.unwrap();
        svc.tombstone("a@x.com").await.unwrap();

        // Tombstoned accounts cannot log in
        assert_eq!(
            svc.verify("a@x.com", "old").await.unwrap_err(),
            ServiceError::Unauthorized
        );

        let (id2, outcome) = svc.register("a@x.com", "new").await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::Reactivated);
        assert_eq!(id, id2);

        assert!(svc.verify("a@x.com", "new").await.is_ok());
        assert_eq!(
            svc.verify("a@x.com", "old").await.unwrap_err(),
            ServiceError::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_tombstone_twice_is_not_found() {
        let svc = service();
        svc.register("a@x.com", "pw").await.unwrap();
        svc.tombstone("a@x.com").await.unwrap();
        assert!(matches!(
            svc.tombstone("a@x.com").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_change_password() {
        let svc = service();
        svc.register("a@x.com", "old").await.unwrap();

        assert_eq!(
            svc.change_password("a@x.com", "wrong", "new")
                .await
                .unwrap_err(),
            ServiceError::Unauthorized
        );

        svc.change_password("a@x.com", "old", "new").await.unwrap();
        assert!(svc.verify("a@x.com", "new").await.is_ok());
        assert!(svc.verify("a@x.com", "old").await.is_err());
    }

    #[tokio::test]
    async fn test_change_password_trims_like_login() {
        let svc = service();
        svc.register("a@x.com", "old").await.unwrap();

        svc.change_password("a@x.com", " old ", " new ")
            .await
            .unwrap();
        assert!(svc.verify("a@x.com", " new ").await.is_ok());
        assert!(svc.verify("a@x.com", "new").await.is_ok());

        assert!(matches!(
            svc.change_password("a@x.com", "new", "   ").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(svc.verify("a@x.com", "new").await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_for_vanished_identity() {
        let svc = service();
        svc.register("a@x.com", "pw").await.unwrap();
        svc.tombstone("a@x.com").await.unwrap();
        assert!(matches!(
            svc.change_password("a@x.com", "pw", "new").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            svc.change_password("never@x.com", "pw", "new").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_registration_single_winner() {
        let svc = Arc::new(service());
        let mut handles = Vec::new();
        for i in 0..8 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.register("race@x.com", &format!("pw{}", i)).await
            }));
        }
        let mut created = 0;
        let mut conflicts = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => created += 1,
                Err(ServiceError::Conflict(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(conflicts, 7);
    }
}

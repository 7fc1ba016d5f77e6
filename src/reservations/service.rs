use std::sync::Arc;
use validator::Validate;

use super::models::{Reservation, ReservationRequest};
use super::repository::ReservationRepository;
use crate::error::ServiceError;

/// Shared booking calendar. Everyone sees every slot; only the booker may
/// change or cancel one.
pub struct ReservationBook {
    repo: Arc<dyn ReservationRepository>,
}

impl ReservationBook {
    pub fn new(repo: Arc<dyn ReservationRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Reservation>, ServiceError> {
        self.repo.list_all().await
    }

    pub async fn create(
        &self,
        owner: &str,
        req: ReservationRequest,
    ) -> Result<Reservation, ServiceError> {
        let req = req.trimmed();
        req.validate()?;
        let reservation = self.repo.insert(owner, &req).await?;
        tracing::info!(owner, reservation_id = reservation.id, "Reservation created");
        Ok(reservation)
    }

    pub async fn update(
        &self,
        owner: &str,
        id: i64,
        req: ReservationRequest,
    ) -> Result<Reservation, ServiceError> {
        let req = req.trimmed();
        req.validate()?;
        self.repo
            .replace(owner, id, &req)
            .await?
            .ok_or_else(|| reservation_not_found(id))
    }

    pub async fn delete(&self, owner: &str, id: i64) -> Result<(), ServiceError> {
        if !self.repo.delete(owner, id).await? {
            return Err(reservation_not_found(id));
        }
        tracing::info!(owner, reservation_id = id, "Reservation cancelled");
        Ok(())
    }
}

fn reservation_not_found(id: i64) -> ServiceError {
    ServiceError::not_found(format!("Reservation {} not found", id))
}

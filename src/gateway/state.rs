use std::sync::Arc;

use crate::attendance::AttendanceLedger;
use crate::db::Database;
use crate::reservations::ReservationBook;
use crate::tasks::TaskBook;
use crate::user_auth::{CredentialService, TokenService};

/// Gateway shared state
///
/// Every component is constructed once at startup and injected here;
/// handlers reach them through `State<Arc<AppState>>`.
#[derive(Clone)]
pub struct AppState {
    /// Credential store (register / verify / password / tombstone)
    pub credentials: Arc<CredentialService>,
    /// Session token issue/verify
    pub tokens: Arc<TokenService>,
    /// Attendance ledger
    pub ledger: Arc<AttendanceLedger>,
    pub tasks: Arc<TaskBook>,
    pub reservations: Arc<ReservationBook>,
    /// PostgreSQL handle for health checks. `None` when running on in-memory stores.
    pub db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(
        credentials: Arc<CredentialService>,
        tokens: Arc<TokenService>,
        ledger: Arc<AttendanceLedger>,
        tasks: Arc<TaskBook>,
        reservations: Arc<ReservationBook>,
        db: Option<Arc<Database>>,
    ) -> Self {
        Self {
            credentials,
            tokens,
            ledger,
            tasks,
            reservations,
            db,
        }
    }
}

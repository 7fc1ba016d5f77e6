use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use std::sync::Arc;

use super::models::{AttendanceRecord, Correction, DayState};
use super::repository::AttendanceRepository;
use crate::clock::Clock;
use crate::error::ServiceError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const CLOCK_FORMAT: &str = "%H:%M";

/// Per-user daily attendance ledger.
///
/// Days are cut at local midnight in `offset`. Every operation is scoped to
/// the caller's email, which the auth gate has already resolved.
pub struct AttendanceLedger {
    repo: Arc<dyn AttendanceRepository>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl AttendanceLedger {
    pub fn new(
        repo: Arc<dyn AttendanceRepository>,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            repo,
            clock,
            offset,
        }
    }

    /// Current calendar day in the ledger's offset
    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.offset).date_naive()
    }

    /// `None` is the normal "nothing recorded yet" answer
    pub async fn get_today(&self, email: &str) -> Result<Option<AttendanceRecord>, ServiceError> {
        self.repo.find(email, self.today()).await
    }

    pub async fn get_monthly(
        &self,
        email: &str,
        month: u32,
        year: i32,
    ) -> Result<Vec<AttendanceRecord>, ServiceError> {
        let (from, until) = month_range(month, year)?;
        self.repo.find_range(email, from, until).await
    }

    pub async fn start(&self, email: &str) -> Result<AttendanceRecord, ServiceError> {
        let today = self.today();
        let now = self.clock.now();

        let record = match self.repo.find(email, today).await? {
            Some(existing) => existing,
            None => {
                if let Some(created) = self.repo.insert_started(email, today, now).await? {
                    tracing::info!(email, date = %today, "Attendance started");
                    return Ok(created);
                }
                // Lost the insert race; the winner's row decides the outcome
                self.repo
                    .find(email, today)
                    .await?
                    .ok_or_else(|| ServiceError::internal("attendance row vanished after conflict"))?
            }
        };

        match record.state() {
            DayState::Started | DayState::Completed => Err(ServiceError::AlreadyStarted),
            DayState::Unstarted | DayState::EndOnly => {
                let started = self
                    .repo
                    .set_start_if_unset(record.id, now)
                    .await?
                    .ok_or(ServiceError::AlreadyStarted)?;
                tracing::info!(email, date = %today, "Attendance started on corrected row");
                Ok(started)
            }
        }
    }

    pub async fn end(&self, email: &str) -> Result<AttendanceRecord, ServiceError> {
        let today = self.today();
        let record = self
            .repo
            .find(email, today)
            .await?
            .ok_or_else(|| ServiceError::not_found("No attendance record for today"))?;

        match record.state() {
            DayState::Unstarted => Err(ServiceError::NotStarted),
            DayState::Completed | DayState::EndOnly => Err(ServiceError::AlreadyEnded),
            DayState::Started => {
                let ended = self
                    .repo
                    .set_end_if_open(record.id, self.clock.now())
                    .await?
                    .ok_or(ServiceError::AlreadyEnded)?;
                tracing::info!(email, date = %today, "Attendance ended");
                Ok(ended)
            }
        }
    }

    /// Manual correction. Bypasses the start/end guards.
    pub async fn update(
        &self,
        email: &str,
        date: &str,
        start_clock: Option<&str>,
        end_clock: Option<&str>,
        comment: &str,
    ) -> Result<AttendanceRecord, ServiceError> {
        let date = parse_date(date)?;
        let correction = Correction {
            start_time: self.parse_clock(date, start_clock)?,
            end_time: self.parse_clock(date, end_clock)?,
            comment: comment.to_string(),
        };
        let record = self.repo.upsert_correction(email, date, &correction).await?;
        tracing::info!(email, date = %date, "Attendance corrected");
        Ok(record)
    }

    /// `HH:MM` on `date` in the ledger's offset, as UTC. Empty means unchanged.
    fn parse_clock(
        &self,
        date: NaiveDate,
        clock: Option<&str>,
    ) -> Result<Option<DateTime<Utc>>, ServiceError> {
        let Some(raw) = clock.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let time = NaiveTime::parse_from_str(raw, CLOCK_FORMAT)
            .map_err(|_| ServiceError::validation(format!("Invalid time '{}', expected HH:MM", raw)))?;
        let local = self
            .offset
            .from_local_datetime(&date.and_time(time))
            .single()
            .ok_or_else(|| ServiceError::validation(format!("Invalid time '{}'", raw)))?;
        Ok(Some(local.with_timezone(&Utc)))
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ServiceError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}

/// `[first of month, first of next month)`
pub fn month_range(month: u32, year: i32) -> Result<(NaiveDate, NaiveDate), ServiceError> {
    if !(1..=12).contains(&month) {
        return Err(ServiceError::validation(format!(
            "month must be within 1..=12, got {}",
            month
        )));
    }
    if !(1..=9999).contains(&year) {
        return Err(ServiceError::validation(format!(
            "year must be within 1..=9999, got {}",
            year
        )));
    }
    let from = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ServiceError::validation("Invalid month"))?;
    let until = if from.month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| ServiceError::validation("Invalid month"))?;
    Ok((from, until))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::repository::memory::MemoryAttendanceRepository;
    use crate::clock::manual::ManualClock;

    const EMAIL: &str = "u@x.com";

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger_at(
        now: DateTime<Utc>,
        offset_hours: i32,
    ) -> (AttendanceLedger, Arc<ManualClock>, Arc<MemoryAttendanceRepository>) {
        let clock = Arc::new(ManualClock::new(now));
        let repo = Arc::new(MemoryAttendanceRepository::new());
        let ledger = AttendanceLedger::new(
            repo.clone(),
            clock.clone(),
            FixedOffset::east_opt(offset_hours * 3600).unwrap(),
        );
        (ledger, clock, repo)
    }

    #[test]
    fn test_month_range() {
        assert_eq!(
            month_range(2, 2024).unwrap(),
            (date(2024, 2, 1), date(2024, 3, 1))
        );
        assert_eq!(
            month_range(12, 2023).unwrap(),
            (date(2023, 12, 1), date(2024, 1, 1))
        );
        assert!(matches!(month_range(0, 2024), Err(ServiceError::Validation(_))));
        assert!(matches!(month_range(13, 2024), Err(ServiceError::Validation(_))));
        assert!(matches!(month_range(1, 0), Err(ServiceError::Validation(_))));
        assert!(matches!(month_range(1, 10000), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_today_uses_offset() {
        // 2024-02-01 23:30 UTC is already 2024-02-02 in UTC+9
        let (ledger, _, _) = ledger_at(utc(2024, 2, 1, 23, 30), 9);
        assert_eq!(ledger.today(), date(2024, 2, 2));

        let (ledger, _, _) = ledger_at(utc(2024, 2, 1, 23, 30), 0);
        assert_eq!(ledger.today(), date(2024, 2, 1));
    }

    #[tokio::test]
    async fn test_get_today_absent_is_none() {
        let (ledger, _, _) = ledger_at(utc(2024, 2, 1, 9, 0), 0);
        assert!(ledger.get_today(EMAIL).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_start_then_end() {
        let (ledger, clock, _) = ledger_at(utc(2024, 2, 1, 9, 0), 0);

        let started = ledger.start(EMAIL).await.unwrap();
        assert_eq!(started.start_time, Some(utc(2024, 2, 1, 9, 0)));
        assert!(started.end_time.is_none());

        clock.advance(chrono::Duration::hours(9));
        let ended = ledger.end(EMAIL).await.unwrap();
        assert_eq!(ended.id, started.id);
        assert_eq!(ended.end_time, Some(utc(2024, 2, 1, 18, 0)));

        let today = ledger.get_today(EMAIL).await.unwrap().unwrap();
        assert_eq!(today.state(), DayState::Completed);
    }

    #[tokio::test]
    async fn test_second_start_is_rejected() {
        let (ledger, clock, _) = ledger_at(utc(2024, 2, 1, 9, 0), 0);
        let first = ledger.start(EMAIL).await.unwrap();

        clock.advance(chrono::Duration::minutes(5));
        assert_eq!(
            ledger.start(EMAIL).await.unwrap_err(),
            ServiceError::AlreadyStarted
        );

        // Original start is not overwritten
        let today = ledger.get_today(EMAIL).await.unwrap().unwrap();
        assert_eq!(today.start_time, first.start_time);
    }

    #[tokio::test]
    async fn test_end_error_ordering() {
        let (ledger, _, _) = ledger_at(utc(2024, 2, 1, 9, 0), 0);

        assert!(matches!(
            ledger.end(EMAIL).await,
            Err(ServiceError::NotFound(_))
        ));

        // Row without a start, created by a correction
        ledger
            .update(EMAIL, "2024-02-01", None, None, "note")
            .await
            .unwrap();
        assert_eq!(ledger.end(EMAIL).await.unwrap_err(), ServiceError::NotStarted);

        ledger.start(EMAIL).await.unwrap();
        ledger.end(EMAIL).await.unwrap();
        assert_eq!(
            ledger.end(EMAIL).await.unwrap_err(),
            ServiceError::AlreadyEnded
        );
    }

    #[tokio::test]
    async fn test_start_fills_corrected_row() {
        let (ledger, _, repo) = ledger_at(utc(2024, 2, 1, 9, 0), 0);
        let corrected = ledger
            .update(EMAIL, "2024-02-01", None, None, "pre-filled")
            .await
            .unwrap();

        let started = ledger.start(EMAIL).await.unwrap();
        assert_eq!(started.id, corrected.id);
        assert_eq!(started.comment, "pre-filled");
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_new_day_gets_new_record() {
        let (ledger, clock, repo) = ledger_at(utc(2024, 2, 1, 9, 0), 0);
        ledger.start(EMAIL).await.unwrap();
        ledger.end(EMAIL).await.unwrap();

        clock.set(utc(2024, 2, 2, 9, 0));
        assert!(ledger.get_today(EMAIL).await.unwrap().is_none());
        ledger.start(EMAIL).await.unwrap();
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn test_records_are_scoped_to_owner() {
        let (ledger, _, _) = ledger_at(utc(2024, 2, 1, 9, 0), 0);
        ledger.start("a@x.com").await.unwrap();
        assert!(ledger.get_today("b@x.com").await.unwrap().is_none());
        ledger.start("b@x.com").await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_start_single_record() {
        let (ledger, _, repo) = ledger_at(utc(2024, 2, 1, 9, 0), 0);
        let ledger = Arc::new(ledger);

        let mut handles = Vec::new();
        for _ in 0..16 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move { ledger.start(EMAIL).await }));
        }

        let mut ok = 0;
        let mut already = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(ServiceError::AlreadyStarted) => already += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(already, 15);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_monthly_february_leap_year() {
        let (ledger, _, _) = ledger_at(utc(2024, 3, 5, 9, 0), 0);
        for d in ["2024-03-01", "2024-02-29", "2024-01-31", "2024-02-01", "2024-02-14"] {
            ledger.update(EMAIL, d, Some("09:00"), None, "").await.unwrap();
        }
        ledger
            .update("other@x.com", "2024-02-10", Some("09:00"), None, "")
            .await
            .unwrap();

        let records = ledger.get_monthly(EMAIL, 2, 2024).await.unwrap();
        let dates: Vec<NaiveDate> = records.iter().map(|r| r.work_date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 2, 1), date(2024, 2, 14), date(2024, 2, 29)]
        );
    }

    #[tokio::test]
    async fn test_monthly_rejects_bad_month() {
        let (ledger, _, _) = ledger_at(utc(2024, 3, 5, 9, 0), 0);
        assert!(matches!(
            ledger.get_monthly(EMAIL, 13, 2024).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_creates_and_patches() {
        let (ledger, _, _) = ledger_at(utc(2024, 2, 5, 9, 0), 9);

        let created = ledger
            .update(EMAIL, "2024-02-01", Some("09:00"), Some("18:30"), "first")
            .await
            .unwrap();
        // 09:00 in UTC+9 is 00:00 UTC
        assert_eq!(created.start_time, Some(utc(2024, 2, 1, 0, 0)));
        assert_eq!(created.end_time, Some(utc(2024, 2, 1, 9, 30)));
        assert_eq!(created.comment, "first");

        // Empty and absent times leave stored values; comment is replaced
        let patched = ledger
            .update(EMAIL, "2024-02-01", Some(""), None, "")
            .await
            .unwrap();
        assert_eq!(patched.id, created.id);
        assert_eq!(patched.start_time, created.start_time);
        assert_eq!(patched.end_time, created.end_time);
        assert_eq!(patched.comment, "");

        let moved = ledger
            .update(EMAIL, "2024-02-01", None, Some("20:00"), "late")
            .await
            .unwrap();
        assert_eq!(moved.start_time, created.start_time);
        assert_eq!(moved.end_time, Some(utc(2024, 2, 1, 11, 0)));
    }

    #[tokio::test]
    async fn test_update_may_set_end_without_start() {
        let (ledger, _, _) = ledger_at(utc(2024, 2, 5, 9, 0), 0);
        let record = ledger
            .update(EMAIL, "2024-02-03", None, Some("17:00"), "")
            .await
            .unwrap();
        assert_eq!(record.state(), DayState::EndOnly);
    }

    #[tokio::test]
    async fn test_update_rejects_unparseable_input() {
        let (ledger, _, repo) = ledger_at(utc(2024, 2, 5, 9, 0), 0);
        for (d, s, e) in [
            ("2024/02/01", None, None),
            ("2024-02-30", None, None),
            ("2024-02-01", Some("9am"), None),
            ("2024-02-01", None, Some("25:00")),
            ("2024-02-01", Some("09:00:00"), None),
        ] {
            assert!(
                matches!(
                    ledger.update(EMAIL, d, s, e, "").await,
                    Err(ServiceError::Validation(_))
                ),
                "expected validation error for {d} {s:?} {e:?}"
            );
        }
        assert_eq!(repo.len(), 0);
    }
}

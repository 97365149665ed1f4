use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::LeaveError;
use crate::leave::overlap;
use crate::model::leave_request::{Decision, LeaveRequest, LeaveStatus, LeaveType};
use crate::model::role::Role;
use crate::store::{InsertOutcome, LeaveQuery, LeaveStore};

/// Inclusive duration cap applied at creation.
pub const MAX_LEAVE_DAYS: i64 = 30;

/// Pending requests older than this are swept to cancelled.
pub const PENDING_EXPIRY_DAYS: i64 = 10;

/// Validated submission payload, already past HTTP deserialization.
#[derive(Debug, Clone)]
pub struct NewLeave {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

/// Age breakdown of the pending backlog, relative to the injected clock.
#[derive(Debug, Serialize, ToSchema)]
pub struct PendingStats {
    #[schema(example = 12)]
    pub total_pending: i64,
    /// Older than the 10-day expiry threshold; next sweep cancels these.
    #[schema(example = 2)]
    pub overdue_for_cancellation: i64,
    /// Between 7 and 10 days old.
    #[schema(example = 3)]
    pub week_old: i64,
    /// Created within the last 3 days.
    #[schema(example = 5)]
    pub recent: i64,
}

/// The lifecycle state machine. Owns every status transition; all writes go
/// through conditional updates in the store so concurrent callers cannot
/// both apply the same transition.
#[derive(Clone)]
pub struct LeaveService<S, C> {
    store: S,
    clock: C,
}

impl<S: LeaveStore, C: Clock> LeaveService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        LeaveService { store, clock }
    }

    /// Submit a new request. Lands in `Pending` unless validation fails or
    /// the range overlaps an already-approved request of the same employee.
    pub async fn create(
        &self,
        employee_id: &str,
        input: NewLeave,
    ) -> Result<LeaveRequest, LeaveError> {
        if input.start_date > input.end_date {
            return Err(LeaveError::Validation(
                "start_date cannot be after end_date".into(),
            ));
        }

        let duration = (input.end_date - input.start_date).num_days() + 1;
        if duration > MAX_LEAVE_DAYS {
            return Err(LeaveError::Validation(format!(
                "leave duration cannot exceed {MAX_LEAVE_DAYS} days"
            )));
        }

        // Pending and resolved requests never block a new submission; only
        // the approved set counts.
        let approved = self
            .store
            .find_by_employee_and_status(employee_id, LeaveStatus::Approved)
            .await?;
        if overlap::conflicts_with_approved(&approved, input.start_date, input.end_date, None) {
            return Err(LeaveError::Conflict(
                "overlapping with existing approved leave".into(),
            ));
        }

        let now = self.clock.now();
        let request = LeaveRequest {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.to_string(),
            leave_type: input.leave_type,
            start_date: input.start_date,
            end_date: input.end_date,
            reason: input.reason,
            status: LeaveStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        // The store re-runs the overlap check inside the insert itself, so a
        // concurrent approval between our check and the write still loses.
        match self.store.insert_pending(&request).await? {
            InsertOutcome::Inserted => Ok(request),
            InsertOutcome::Overlap => Err(LeaveError::Conflict(
                "overlapping with existing approved leave".into(),
            )),
        }
    }

    /// Owner-initiated cancellation of a still-pending request.
    pub async fn cancel(
        &self,
        caller_employee_id: &str,
        id: &str,
    ) -> Result<LeaveRequest, LeaveError> {
        let request = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| LeaveError::NotFound("leave request not found".into()))?;

        if request.employee_id != caller_employee_id {
            return Err(LeaveError::Forbidden(
                "you can only cancel your own requests".into(),
            ));
        }

        let now = self.clock.now();
        let applied = self
            .store
            .update_status(id, LeaveStatus::Pending, LeaveStatus::Cancelled, now)
            .await?;
        if !applied {
            return Err(LeaveError::InvalidState(
                "only pending requests can be cancelled".into(),
            ));
        }

        Ok(LeaveRequest {
            status: LeaveStatus::Cancelled,
            updated_at: now,
            ..request
        })
    }

    /// Admin approval or denial of a pending request. Approval re-runs the
    /// overlap check so two overlapping pending requests can never both
    /// reach `Approved`.
    pub async fn decide(
        &self,
        caller_role: Role,
        id: &str,
        decision: &str,
    ) -> Result<LeaveRequest, LeaveError> {
        caller_role.require(Role::Admin)?;

        let decision = Decision::from_str(decision).map_err(|_| {
            LeaveError::Validation("decision must be 'APPROVE' or 'DENY'".into())
        })?;

        let request = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| LeaveError::NotFound("leave request not found".into()))?;

        let now = self.clock.now();
        match decision {
            Decision::Deny => {
                let applied = self
                    .store
                    .update_status(id, LeaveStatus::Pending, LeaveStatus::Denied, now)
                    .await?;
                if !applied {
                    return Err(LeaveError::InvalidState(
                        "only pending requests can be decided".into(),
                    ));
                }
                Ok(LeaveRequest {
                    status: LeaveStatus::Denied,
                    updated_at: now,
                    ..request
                })
            }
            Decision::Approve => {
                let approved = self
                    .store
                    .find_by_employee_and_status(&request.employee_id, LeaveStatus::Approved)
                    .await?;
                if overlap::conflicts_with_approved(
                    &approved,
                    request.start_date,
                    request.end_date,
                    Some(id),
                ) {
                    return Err(LeaveError::Conflict(
                        "overlapping with existing approved leave".into(),
                    ));
                }

                let applied = self
                    .store
                    .approve_if_clear(
                        id,
                        &request.employee_id,
                        request.start_date,
                        request.end_date,
                        now,
                    )
                    .await?;
                if applied {
                    return Ok(LeaveRequest {
                        status: LeaveStatus::Approved,
                        updated_at: now,
                        ..request
                    });
                }

                // Guarded update lost: either the row left Pending, or an
                // overlapping approval landed first.
                let current = self
                    .store
                    .get(id)
                    .await?
                    .ok_or_else(|| LeaveError::NotFound("leave request not found".into()))?;
                if current.status != LeaveStatus::Pending {
                    Err(LeaveError::InvalidState(
                        "only pending requests can be decided".into(),
                    ))
                } else {
                    Err(LeaveError::Conflict(
                        "overlapping with existing approved leave".into(),
                    ))
                }
            }
        }
    }

    /// Cancel every pending request older than the expiry threshold.
    /// Scheduled and manual triggers both land here; re-running right after
    /// a successful sweep finds nothing.
    pub async fn run_expiry_sweep(&self) -> Result<u64, LeaveError> {
        let now = self.clock.now();
        let cutoff = now - Duration::days(PENDING_EXPIRY_DAYS);

        let stale = self.store.find_pending_older_than(cutoff).await?;
        let mut cancelled = 0u64;
        for request in &stale {
            // conditional write: a request decided or cancelled since the
            // fetch is simply skipped
            if self
                .store
                .update_status(&request.id, LeaveStatus::Pending, LeaveStatus::Cancelled, now)
                .await?
            {
                cancelled += 1;
            }
        }

        if cancelled > 0 {
            info!(cancelled, "auto-cancelled stale pending leave requests");
        }
        Ok(cancelled)
    }

    /// Manual sweep trigger, admin only. Same routine as the scheduler.
    pub async fn trigger_sweep(&self, caller_role: Role) -> Result<u64, LeaveError> {
        caller_role.require(Role::Admin)?;
        self.run_expiry_sweep().await
    }

    /// Pending backlog broken down by age, admin only.
    pub async fn pending_stats(&self, caller_role: Role) -> Result<PendingStats, LeaveError> {
        caller_role.require(Role::Admin)?;

        let now = self.clock.now();
        let total_pending = self.store.count_pending(None).await?;
        let overdue = self
            .store
            .count_pending(Some(now - Duration::days(PENDING_EXPIRY_DAYS)))
            .await?;
        let older_than_week = self
            .store
            .count_pending(Some(now - Duration::days(7)))
            .await?;
        let older_than_3d = self
            .store
            .count_pending(Some(now - Duration::days(3)))
            .await?;

        Ok(PendingStats {
            total_pending,
            overdue_for_cancellation: overdue,
            week_old: older_than_week - overdue,
            recent: total_pending - older_than_3d,
        })
    }

    /// Fetch a single request: owners see their own, admins see all.
    pub async fn get_visible(
        &self,
        caller_employee_id: &str,
        caller_role: Role,
        id: &str,
    ) -> Result<LeaveRequest, LeaveError> {
        let request = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| LeaveError::NotFound("leave request not found".into()))?;
        if caller_role != Role::Admin && request.employee_id != caller_employee_id {
            return Err(LeaveError::Forbidden(
                "you can only view your own requests".into(),
            ));
        }
        Ok(request)
    }

    /// Paginated listing. Non-admin callers are pinned to their own
    /// requests regardless of the filter they send.
    pub async fn list_visible(
        &self,
        caller_employee_id: &str,
        caller_role: Role,
        mut query: LeaveQuery,
    ) -> Result<(Vec<LeaveRequest>, i64), LeaveError> {
        if caller_role != Role::Admin {
            query.employee_id = Some(caller_employee_id.to_string());
        }
        Ok(self.store.list(&query).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::clock::FixedClock;
    use crate::store::memory::MemoryLeaveStore;

    type TestService = LeaveService<MemoryLeaveStore, Arc<FixedClock>>;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn service() -> (TestService, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::at(t0()));
        (
            LeaveService::new(MemoryLeaveStore::new(), clock.clone()),
            clock,
        )
    }

    fn annual(start: NaiveDate, end: NaiveDate) -> NewLeave {
        NewLeave {
            leave_type: LeaveType::Annual,
            start_date: start,
            end_date: end,
            reason: None,
        }
    }

    #[actix_web::test]
    async fn create_lands_pending_with_clock_timestamps() {
        let (svc, _) = service();
        let req = svc
            .create("EMP001", annual(d(2025, 8, 15), d(2025, 8, 20)))
            .await
            .unwrap();
        assert_eq!(req.status, LeaveStatus::Pending);
        assert_eq!(req.created_at, t0());
        assert_eq!(req.updated_at, t0());
        assert_eq!(req.employee_id, "EMP001");
    }

    #[actix_web::test]
    async fn create_rejects_inverted_dates() {
        let (svc, _) = service();
        let err = svc
            .create("EMP001", annual(d(2025, 8, 20), d(2025, 8, 15)))
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::Validation(_)));
    }

    #[actix_web::test]
    async fn create_enforces_inclusive_duration_cap() {
        let (svc, _) = service();
        // 31 inclusive days: rejected
        let err = svc
            .create("EMP001", annual(d(2025, 9, 1), d(2025, 10, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::Validation(_)));
        // exactly 30: allowed
        svc.create("EMP001", annual(d(2025, 9, 1), d(2025, 9, 30)))
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn only_approved_requests_block_a_new_submission() {
        let (svc, _) = service();
        let pending = svc
            .create("EMP001", annual(d(2025, 8, 15), d(2025, 8, 20)))
            .await
            .unwrap();
        // a pending overlap does not block
        svc.create("EMP001", annual(d(2025, 8, 18), d(2025, 8, 22)))
            .await
            .unwrap();

        svc.decide(Role::Admin, &pending.id, "APPROVE").await.unwrap();
        // now the same range conflicts
        let err = svc
            .create("EMP001", annual(d(2025, 8, 19), d(2025, 8, 21)))
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::Conflict(_)));
        // another employee is unaffected
        svc.create("EMP002", annual(d(2025, 8, 19), d(2025, 8, 21)))
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn resolved_requests_never_block_resubmission() {
        let (svc, _) = service();
        let first = svc
            .create("EMP001", annual(d(2025, 8, 15), d(2025, 8, 20)))
            .await
            .unwrap();
        svc.decide(Role::Admin, &first.id, "DENY").await.unwrap();
        let second = svc
            .create("EMP001", annual(d(2025, 8, 15), d(2025, 8, 20)))
            .await
            .unwrap();
        svc.cancel("EMP001", &second.id).await.unwrap();
        svc.create("EMP001", annual(d(2025, 8, 15), d(2025, 8, 20)))
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn cancel_requires_ownership() {
        let (svc, _) = service();
        let req = svc
            .create("EMP001", annual(d(2025, 8, 15), d(2025, 8, 20)))
            .await
            .unwrap();
        let err = svc.cancel("EMP002", &req.id).await.unwrap_err();
        assert!(matches!(err, LeaveError::Forbidden(_)));
    }

    #[actix_web::test]
    async fn cancel_twice_fails_with_invalid_state() {
        let (svc, clock) = service();
        let req = svc
            .create("EMP001", annual(d(2025, 8, 15), d(2025, 8, 20)))
            .await
            .unwrap();
        clock.advance(Duration::hours(1));
        let cancelled = svc.cancel("EMP001", &req.id).await.unwrap();
        assert_eq!(cancelled.status, LeaveStatus::Cancelled);
        assert!(cancelled.updated_at > cancelled.created_at);

        let err = svc.cancel("EMP001", &req.id).await.unwrap_err();
        assert!(matches!(err, LeaveError::InvalidState(_)));
    }

    #[actix_web::test]
    async fn cancel_unknown_id_is_not_found() {
        let (svc, _) = service();
        let err = svc.cancel("EMP001", "no-such-id").await.unwrap_err();
        assert!(matches!(err, LeaveError::NotFound(_)));
    }

    #[actix_web::test]
    async fn decide_requires_admin_role() {
        let (svc, _) = service();
        let req = svc
            .create("EMP001", annual(d(2025, 8, 15), d(2025, 8, 20)))
            .await
            .unwrap();
        let err = svc
            .decide(Role::Employee, &req.id, "APPROVE")
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::Forbidden(_)));
    }

    #[actix_web::test]
    async fn decide_rejects_unknown_verdicts() {
        let (svc, _) = service();
        let req = svc
            .create("EMP001", annual(d(2025, 8, 15), d(2025, 8, 20)))
            .await
            .unwrap();
        let err = svc.decide(Role::Admin, &req.id, "MAYBE").await.unwrap_err();
        assert!(matches!(err, LeaveError::Validation(_)));
    }

    #[actix_web::test]
    async fn decide_twice_succeeds_exactly_once() {
        let (svc, _) = service();
        let req = svc
            .create("EMP001", annual(d(2025, 8, 15), d(2025, 8, 20)))
            .await
            .unwrap();
        let approved = svc.decide(Role::Admin, &req.id, "APPROVE").await.unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);

        let err = svc.decide(Role::Admin, &req.id, "DENY").await.unwrap_err();
        assert!(matches!(err, LeaveError::InvalidState(_)));
    }

    #[actix_web::test]
    async fn deny_transitions_to_denied() {
        let (svc, _) = service();
        let req = svc
            .create("EMP001", annual(d(2025, 8, 15), d(2025, 8, 20)))
            .await
            .unwrap();
        let denied = svc.decide(Role::Admin, &req.id, "DENY").await.unwrap();
        assert_eq!(denied.status, LeaveStatus::Denied);
    }

    #[actix_web::test]
    async fn overlapping_pending_pair_yields_one_approval() {
        // 15..20 approved, 18..25 conflicts at decision time, adjacent
        // 21..25 goes through
        let (svc, _) = service();
        let first = svc
            .create("EMP001", annual(d(2025, 8, 15), d(2025, 8, 20)))
            .await
            .unwrap();
        let second = svc
            .create("EMP001", annual(d(2025, 8, 18), d(2025, 8, 25)))
            .await
            .unwrap();

        svc.decide(Role::Admin, &first.id, "APPROVE").await.unwrap();
        let err = svc
            .decide(Role::Admin, &second.id, "APPROVE")
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::Conflict(_)));

        let third = svc
            .create("EMP001", annual(d(2025, 8, 21), d(2025, 8, 25)))
            .await
            .unwrap();
        let approved = svc.decide(Role::Admin, &third.id, "APPROVE").await.unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
    }

    #[actix_web::test]
    async fn sweep_cancels_exactly_the_stale_pending_set() {
        let (svc, clock) = service();
        let old = svc
            .create("EMP001", annual(d(2025, 9, 1), d(2025, 9, 5)))
            .await
            .unwrap();
        clock.advance(Duration::days(7));
        let newer = svc
            .create("EMP002", annual(d(2025, 9, 10), d(2025, 9, 12)))
            .await
            .unwrap();
        let decided = svc
            .create("EMP003", annual(d(2025, 9, 1), d(2025, 9, 3)))
            .await
            .unwrap();
        svc.decide(Role::Admin, &decided.id, "APPROVE").await.unwrap();

        // old is now 12 days old, newer 5 days old
        clock.advance(Duration::days(5));
        let cancelled = svc.run_expiry_sweep().await.unwrap();
        assert_eq!(cancelled, 1);

        let swept = svc.get_visible("EMP001", Role::Admin, &old.id).await.unwrap();
        assert_eq!(swept.status, LeaveStatus::Cancelled);
        assert_eq!(swept.updated_at, clock.now());
        let untouched = svc
            .get_visible("EMP002", Role::Admin, &newer.id)
            .await
            .unwrap();
        assert_eq!(untouched.status, LeaveStatus::Pending);
        let approved = svc
            .get_visible("EMP003", Role::Admin, &decided.id)
            .await
            .unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);

        // immediate re-run finds nothing
        assert_eq!(svc.run_expiry_sweep().await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn manual_sweep_is_admin_only() {
        let (svc, _) = service();
        let err = svc.trigger_sweep(Role::Employee).await.unwrap_err();
        assert!(matches!(err, LeaveError::Forbidden(_)));
        assert_eq!(svc.trigger_sweep(Role::Admin).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn pending_stats_buckets_by_age() {
        let (svc, clock) = service();
        svc.create("EMP001", annual(d(2025, 9, 1), d(2025, 9, 2)))
            .await
            .unwrap(); // will be 12 days old
        clock.advance(Duration::days(4));
        svc.create("EMP002", annual(d(2025, 9, 3), d(2025, 9, 4)))
            .await
            .unwrap(); // will be 8 days old
        clock.advance(Duration::days(7));
        svc.create("EMP003", annual(d(2025, 9, 5), d(2025, 9, 6)))
            .await
            .unwrap(); // 1 day old
        clock.advance(Duration::days(1));

        let stats = svc.pending_stats(Role::Admin).await.unwrap();
        assert_eq!(stats.total_pending, 3);
        assert_eq!(stats.overdue_for_cancellation, 1);
        assert_eq!(stats.week_old, 1);
        assert_eq!(stats.recent, 1);

        let err = svc.pending_stats(Role::Employee).await.unwrap_err();
        assert!(matches!(err, LeaveError::Forbidden(_)));
    }

    #[actix_web::test]
    async fn listing_is_owner_scoped_for_employees() {
        let (svc, _) = service();
        svc.create("EMP001", annual(d(2025, 8, 15), d(2025, 8, 20)))
            .await
            .unwrap();
        svc.create("EMP002", annual(d(2025, 8, 15), d(2025, 8, 20)))
            .await
            .unwrap();

        let query = LeaveQuery {
            page: 1,
            per_page: 10,
            ..Default::default()
        };
        let (mine, total) = svc
            .list_visible("EMP001", Role::Employee, query.clone())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(mine[0].employee_id, "EMP001");

        let (all, total) = svc
            .list_visible("ADMIN001", Role::Admin, query)
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(all.len(), 2);
    }

    #[actix_web::test]
    async fn fetch_of_foreign_request_is_forbidden() {
        let (svc, _) = service();
        let req = svc
            .create("EMP001", annual(d(2025, 8, 15), d(2025, 8, 20)))
            .await
            .unwrap();
        let err = svc
            .get_visible("EMP002", Role::Employee, &req.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::Forbidden(_)));
        svc.get_visible("EMP001", Role::Employee, &req.id)
            .await
            .unwrap();
    }
}

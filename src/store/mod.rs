pub mod mysql;

#[cfg(test)]
pub mod memory;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::StoreError;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};

/// Outcome of the guarded insert: the overlap check and the write are one
/// atomic unit per employee.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InsertOutcome {
    Inserted,
    Overlap,
}

/// Query-level filter for the admin listing endpoint.
#[derive(Debug, Default, Clone)]
pub struct LeaveQuery {
    pub employee_id: Option<String>,
    pub status: Option<LeaveStatus>,
    /// 1-based page index.
    pub page: u64,
    pub per_page: u64,
}

/// Narrow persistence contract the lifecycle engine runs against.
///
/// Every mutating call is a conditional write keyed on id + expected status,
/// so racing callers lose cleanly instead of double-applying a transition.
pub trait LeaveStore {
    /// Insert a pending request unless the employee already has an approved
    /// request overlapping the candidate range.
    async fn insert_pending(&self, request: &LeaveRequest) -> Result<InsertOutcome, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<LeaveRequest>, StoreError>;

    async fn find_by_employee_and_status(
        &self,
        employee_id: &str,
        status: LeaveStatus,
    ) -> Result<Vec<LeaveRequest>, StoreError>;

    async fn find_pending_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<LeaveRequest>, StoreError>;

    /// Conditional status transition. Returns false when the row is missing
    /// or no longer in `expected` status.
    async fn update_status(
        &self,
        id: &str,
        expected: LeaveStatus,
        new: LeaveStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Approve `id` only while it is still pending and no other approved
    /// request of the same employee overlaps `[start, end]`. Single atomic
    /// statement in SQL backends.
    async fn approve_if_clear(
        &self,
        id: &str,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Count pending requests, optionally only those created before `older_than`.
    async fn count_pending(&self, older_than: Option<DateTime<Utc>>) -> Result<i64, StoreError>;

    /// Filtered page of requests, newest first, plus the unpaged total.
    async fn list(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequest>, i64), StoreError>;
}

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::StoreError;
use crate::leave::overlap::ranges_overlap;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::store::{InsertOutcome, LeaveQuery, LeaveStore};

/// Test double with the same conditional-write semantics as the MySQL store.
/// Every operation holds the table lock for its whole read-check-write, so
/// the atomicity contract matches the single-statement SQL paths.
#[derive(Default)]
pub struct MemoryLeaveStore {
    rows: Mutex<HashMap<String, LeaveRequest>>,
}

impl MemoryLeaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn overlaps_approved(
        rows: &HashMap<String, LeaveRequest>,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<&str>,
    ) -> bool {
        rows.values().any(|r| {
            r.employee_id == employee_id
                && r.status == LeaveStatus::Approved
                && exclude_id != Some(r.id.as_str())
                && ranges_overlap(r.start_date, r.end_date, start, end)
        })
    }
}

impl LeaveStore for MemoryLeaveStore {
    async fn insert_pending(&self, request: &LeaveRequest) -> Result<InsertOutcome, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if Self::overlaps_approved(
            &rows,
            &request.employee_id,
            request.start_date,
            request.end_date,
            None,
        ) {
            return Ok(InsertOutcome::Overlap);
        }
        rows.insert(request.id.clone(), request.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn get(&self, id: &str) -> Result<Option<LeaveRequest>, StoreError> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    async fn find_by_employee_and_status(
        &self,
        employee_id: &str,
        status: LeaveStatus,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        let rows = self.rows.lock().unwrap();
        let mut out: Vec<LeaveRequest> = rows
            .values()
            .filter(|r| r.employee_id == employee_id && r.status == status)
            .cloned()
            .collect();
        out.sort_by_key(|r| r.start_date);
        Ok(out)
    }

    async fn find_pending_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        let rows = self.rows.lock().unwrap();
        let mut out: Vec<LeaveRequest> = rows
            .values()
            .filter(|r| r.status == LeaveStatus::Pending && r.created_at < cutoff)
            .cloned()
            .collect();
        out.sort_by_key(|r| r.created_at);
        Ok(out)
    }

    async fn update_status(
        &self,
        id: &str,
        expected: LeaveStatus,
        new: LeaveStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(id) {
            Some(row) if row.status == expected => {
                row.status = new;
                row.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn approve_if_clear(
        &self,
        id: &str,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if Self::overlaps_approved(&rows, employee_id, start, end, Some(id)) {
            return Ok(false);
        }
        match rows.get_mut(id) {
            Some(row) if row.status == LeaveStatus::Pending && row.employee_id == employee_id => {
                row.status = LeaveStatus::Approved;
                row.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count_pending(&self, older_than: Option<DateTime<Utc>>) -> Result<i64, StoreError> {
        let rows = self.rows.lock().unwrap();
        let count = rows
            .values()
            .filter(|r| r.status == LeaveStatus::Pending)
            .filter(|r| older_than.map_or(true, |cutoff| r.created_at < cutoff))
            .count();
        Ok(count as i64)
    }

    async fn list(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequest>, i64), StoreError> {
        let rows = self.rows.lock().unwrap();
        let mut matched: Vec<LeaveRequest> = rows
            .values()
            .filter(|r| {
                query
                    .employee_id
                    .as_deref()
                    .map_or(true, |e| r.employee_id == e)
            })
            .filter(|r| query.status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as i64;
        let per_page = query.per_page.clamp(1, 100) as usize;
        let page = query.page.max(1) as usize;
        let paged: Vec<LeaveRequest> = matched
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();
        Ok((paged, total))
    }
}

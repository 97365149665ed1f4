use chrono::{DateTime, NaiveDate, Utc};
use sqlx::MySqlPool;

use crate::error::StoreError;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::store::{InsertOutcome, LeaveQuery, LeaveStore};

const COLUMNS: &str =
    "id, employee_id, leave_type, start_date, end_date, reason, status, created_at, updated_at";

// Helper enum for typed SQLx binding of dynamic filters
enum FilterValue<'a> {
    Str(&'a str),
}

#[derive(Clone)]
pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlLeaveStore { pool }
    }
}

impl LeaveStore for MySqlLeaveStore {
    async fn insert_pending(&self, request: &LeaveRequest) -> Result<InsertOutcome, StoreError> {
        // Check-then-insert as one statement: the row lands only if no
        // approved request of the same employee intersects the range.
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (id, employee_id, leave_type, start_date, end_date, reason, status, created_at, updated_at)
            SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?
            FROM DUAL
            WHERE NOT EXISTS (
                SELECT 1 FROM leave_requests
                WHERE employee_id = ?
                  AND status = 'APPROVED'
                  AND start_date <= ?
                  AND end_date >= ?
            )
            "#,
        )
        .bind(&request.id)
        .bind(&request.employee_id)
        .bind(request.leave_type)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.reason)
        .bind(request.status)
        .bind(request.created_at)
        .bind(request.updated_at)
        .bind(&request.employee_id)
        .bind(request.end_date)
        .bind(request.start_date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Overlap)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn get(&self, id: &str) -> Result<Option<LeaveRequest>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM leave_requests WHERE id = ?");
        let row = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_employee_and_status(
        &self,
        employee_id: &str,
        status: LeaveStatus,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM leave_requests \
             WHERE employee_id = ? AND status = ? ORDER BY start_date"
        );
        let rows = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(employee_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_pending_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM leave_requests \
             WHERE status = 'PENDING' AND created_at < ? ORDER BY created_at"
        );
        let rows = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn update_status(
        &self,
        id: &str,
        expected: LeaveStatus,
        new: LeaveStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, updated_at = ?
            WHERE id = ?
            AND status = ?
            "#,
        )
        .bind(new)
        .bind(now)
        .bind(id)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn approve_if_clear(
        &self,
        id: &str,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        // Self-join instead of a subquery: MySQL refuses to read the table
        // being updated, but a multi-table UPDATE may. The row flips to
        // APPROVED only while still pending and with no overlapping winner.
        let result = sqlx::query(
            r#"
            UPDATE leave_requests lr
            LEFT JOIN leave_requests other
                   ON other.employee_id = lr.employee_id
                  AND other.id <> lr.id
                  AND other.status = 'APPROVED'
                  AND other.start_date <= ?
                  AND other.end_date >= ?
            SET lr.status = 'APPROVED', lr.updated_at = ?
            WHERE lr.id = ?
              AND lr.employee_id = ?
              AND lr.status = 'PENDING'
              AND other.id IS NULL
            "#,
        )
        .bind(end)
        .bind(start)
        .bind(now)
        .bind(id)
        .bind(employee_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_pending(&self, older_than: Option<DateTime<Utc>>) -> Result<i64, StoreError> {
        let count = match older_than {
            Some(cutoff) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM leave_requests \
                     WHERE status = 'PENDING' AND created_at < ?",
                )
                .bind(cutoff)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM leave_requests WHERE status = 'PENDING'",
                )
                .fetch_one(&self.pool)
                .await?
            }
        };
        Ok(count)
    }

    async fn list(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequest>, i64), StoreError> {
        let per_page = query.per_page.clamp(1, 100);
        let page = query.page.max(1);
        let offset = (page - 1) * per_page;

        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(emp_id) = query.employee_id.as_deref() {
            where_sql.push_str(" AND employee_id = ?");
            args.push(FilterValue::Str(emp_id));
        }

        let status_str;
        if let Some(status) = query.status {
            where_sql.push_str(" AND status = ?");
            status_str = status.to_string();
            args.push(FilterValue::Str(&status_str));
        }

        let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::Str(s) => count_q.bind(*s),
            };
        }
        let total = count_q.fetch_one(&self.pool).await?;

        let data_sql = format!(
            "SELECT {COLUMNS} FROM leave_requests{} \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            where_sql
        );
        let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::Str(s) => data_q.bind(s),
            };
        }
        let rows = data_q
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }
}

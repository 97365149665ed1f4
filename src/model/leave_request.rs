use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[derive(sqlx::Type, strum_macros::Display, strum_macros::EnumString)]
pub enum LeaveType {
    Annual,
    Sick,
    Unpaid,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[derive(sqlx::Type, strum_macros::Display, strum_macros::EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Denied,
    Cancelled,
}

impl LeaveStatus {
    /// Terminal statuses have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

/// Admin verdict on a pending request. Wire form is `APPROVE` / `DENY`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Decision {
    Approve,
    Deny,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "7b0c6f0e-9a1d-4a57-9c6e-2f59c1f1a001",
        "employee_id": "EMP001",
        "leave_type": "Annual",
        "start_date": "2026-01-05",
        "end_date": "2026-01-09",
        "reason": "family trip",
        "status": "PENDING",
        "created_at": "2025-12-20T09:30:00Z",
        "updated_at": "2025-12-20T09:30:00Z"
    })
)]
pub struct LeaveRequest {
    #[schema(example = "7b0c6f0e-9a1d-4a57-9c6e-2f59c1f1a001")]
    pub id: String,

    #[schema(example = "EMP001")]
    pub employee_id: String,

    #[schema(example = "Annual")]
    pub leave_type: LeaveType,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-01-09", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    #[schema(example = "family trip", nullable = true)]
    pub reason: Option<String>,

    #[schema(example = "PENDING")]
    pub status: LeaveStatus,

    #[schema(example = "2025-12-20T09:30:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(example = "2025-12-20T09:30:00Z", value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Inclusive length of the requested range in days.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn decision_parses_wire_literals_only() {
        assert_eq!(Decision::from_str("APPROVE"), Ok(Decision::Approve));
        assert_eq!(Decision::from_str("DENY"), Ok(Decision::Deny));
        assert!(Decision::from_str("approve").is_err());
        assert!(Decision::from_str("MAYBE").is_err());
    }

    #[test]
    fn status_wire_forms() {
        assert_eq!(LeaveStatus::Pending.to_string(), "PENDING");
        assert_eq!(LeaveStatus::from_str("CANCELLED"), Ok(LeaveStatus::Cancelled));
        assert!(!LeaveStatus::Pending.is_terminal());
        assert!(LeaveStatus::Denied.is_terminal());
    }

    #[test]
    fn duration_is_inclusive() {
        let req = LeaveRequest {
            id: "x".into(),
            employee_id: "EMP001".into(),
            leave_type: LeaveType::Annual,
            start_date: NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 8, 20).unwrap(),
            reason: None,
            status: LeaveStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(req.duration_days(), 6);
    }
}

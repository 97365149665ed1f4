//! Closed-interval date-range intersection.
//!
//! Two inclusive ranges overlap when they share at least one calendar day;
//! a range ending the day before another starts does not.

use chrono::NaiveDate;

use crate::model::leave_request::LeaveRequest;

pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// True when any request in `approved` intersects `[start, end]`, skipping
/// the candidate's own id so a request never conflicts with itself during an
/// approval re-check. O(k) over the employee's approved set.
pub fn conflicts_with_approved(
    approved: &[LeaveRequest],
    start: NaiveDate,
    end: NaiveDate,
    exclude_id: Option<&str>,
) -> bool {
    approved
        .iter()
        .filter(|r| exclude_id != Some(r.id.as_str()))
        .any(|r| ranges_overlap(r.start_date, r.end_date, start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::{LeaveStatus, LeaveType};
    use chrono::Utc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn approved(id: &str, start: NaiveDate, end: NaiveDate) -> LeaveRequest {
        LeaveRequest {
            id: id.into(),
            employee_id: "EMP001".into(),
            leave_type: LeaveType::Annual,
            start_date: start,
            end_date: end,
            reason: None,
            status: LeaveStatus::Approved,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn partial_and_contained_ranges_overlap() {
        assert!(ranges_overlap(
            d(2025, 8, 15),
            d(2025, 8, 20),
            d(2025, 8, 18),
            d(2025, 8, 25)
        ));
        assert!(ranges_overlap(
            d(2025, 8, 10),
            d(2025, 8, 30),
            d(2025, 8, 15),
            d(2025, 8, 16)
        ));
    }

    #[test]
    fn single_shared_day_overlaps() {
        assert!(ranges_overlap(
            d(2025, 8, 15),
            d(2025, 8, 20),
            d(2025, 8, 20),
            d(2025, 8, 25)
        ));
    }

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        // one ends the day before the other starts
        assert!(!ranges_overlap(
            d(2025, 8, 15),
            d(2025, 8, 20),
            d(2025, 8, 21),
            d(2025, 8, 25)
        ));
        assert!(!ranges_overlap(
            d(2025, 8, 21),
            d(2025, 8, 25),
            d(2025, 8, 15),
            d(2025, 8, 20)
        ));
    }

    #[test]
    fn candidate_never_conflicts_with_itself() {
        let existing = vec![approved("self", d(2025, 8, 15), d(2025, 8, 20))];
        assert!(conflicts_with_approved(
            &existing,
            d(2025, 8, 15),
            d(2025, 8, 20),
            None
        ));
        assert!(!conflicts_with_approved(
            &existing,
            d(2025, 8, 15),
            d(2025, 8, 20),
            Some("self")
        ));
    }
}

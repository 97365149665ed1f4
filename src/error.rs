use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use tracing::error;

/// Failure raised by a storage backend. Infrastructure trouble, never a
/// business-rule outcome.
#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

/// Business-rule and infrastructure outcomes of a lifecycle operation.
#[derive(Debug, Display)]
pub enum LeaveError {
    /// Malformed input: inverted dates, excessive duration, unknown enum value.
    #[display(fmt = "{}", _0)]
    Validation(String),

    /// Candidate range overlaps an approved request of the same employee.
    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    /// Ownership or role mismatch.
    #[display(fmt = "{}", _0)]
    Forbidden(String),

    /// Transition attempted from a terminal state, or a concurrent caller won.
    #[display(fmt = "{}", _0)]
    InvalidState(String),

    #[display(fmt = "storage failure: {}", _0)]
    Store(StoreError),
}

impl std::error::Error for LeaveError {}

impl From<StoreError> for LeaveError {
    fn from(e: StoreError) -> Self {
        LeaveError::Store(e)
    }
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::Validation(_) => StatusCode::BAD_REQUEST,
            LeaveError::Conflict(_) => StatusCode::CONFLICT,
            LeaveError::NotFound(_) => StatusCode::NOT_FOUND,
            LeaveError::Forbidden(_) => StatusCode::FORBIDDEN,
            LeaveError::InvalidState(_) => StatusCode::CONFLICT,
            LeaveError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let LeaveError::Store(e) = self {
            // storage detail stays in the logs, not in the response body
            error!(error = %e, "storage failure");
            return HttpResponse::InternalServerError().json(json!({
                "error": "internal server error"
            }));
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            LeaveError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LeaveError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            LeaveError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            LeaveError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            LeaveError::InvalidState("x".into()).status_code(),
            StatusCode::CONFLICT
        );
    }
}

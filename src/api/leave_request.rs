use std::str::FromStr;

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::LeaveError;
use crate::leave::AppService;
use crate::leave::engine::NewLeave;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::store::LeaveQuery;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "Annual")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-09", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "family trip", nullable = true)]
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct DecisionDto {
    /// `APPROVE` or `DENY`
    #[schema(example = "APPROVE")]
    pub decision: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by employee ID (admins only; employees always see their own)
    #[schema(example = "EMP001")]
    pub employee_id: Option<String>,
    /// Filter by leave status
    #[schema(example = "PENDING")]
    pub status: Option<String>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[schema(example = 10)]
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: i64,
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Invalid dates, duration or leave type"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Overlapping with existing approved leave")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    service: web::Data<AppService>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, LeaveError> {
    let payload = payload.into_inner();
    let created = service
        .create(
            &auth.employee_id,
            NewLeave {
                leave_type: payload.leave_type,
                start_date: payload.start_date,
                end_date: payload.end_date,
                reason: payload.reason,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(created))
}

/* =========================
Cancel leave (owner)
========================= */
#[utoipa::path(
    patch,
    path = "/api/v1/leave/{leave_id}/cancel",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to cancel")
    ),
    responses(
        (status = 200, description = "Leave request cancelled", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner of this request"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request is no longer pending")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    service: web::Data<AppService>,
    path: web::Path<String>,
) -> Result<HttpResponse, LeaveError> {
    let leave_id = path.into_inner();
    let cancelled = service.cancel(&auth.employee_id, &leave_id).await?;
    Ok(HttpResponse::Ok().json(cancelled))
}

/* =========================
Approve / deny leave (Admin)
========================= */
#[utoipa::path(
    patch,
    path = "/api/v1/leave/{leave_id}/decision",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to decide")
    ),
    request_body(
        content = DecisionDto,
        description = "Admin verdict",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Decision applied", body = LeaveRequest),
        (status = 400, description = "Unknown decision value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Already decided, or overlapping approved leave")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn decide_leave(
    auth: AuthUser,
    service: web::Data<AppService>,
    path: web::Path<String>,
    payload: web::Json<DecisionDto>,
) -> Result<HttpResponse, LeaveError> {
    let leave_id = path.into_inner();
    let decided = service
        .decide(auth.role, &leave_id, &payload.decision)
        .await?;
    Ok(HttpResponse::Ok().json(decided))
}

/* =========================
Fetch one leave request
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner of this request"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    service: web::Data<AppService>,
    path: web::Path<String>,
) -> Result<HttpResponse, LeaveError> {
    let leave_id = path.into_inner();
    let found = service
        .get_visible(&auth.employee_id, auth.role, &leave_id)
        .await?;
    Ok(HttpResponse::Ok().json(found))
}

/* =========================
List leave requests
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    service: web::Data<AppService>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, LeaveError> {
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);

    let status = match query.status.as_deref() {
        Some(raw) => Some(LeaveStatus::from_str(raw).map_err(|_| {
            LeaveError::Validation(format!("unknown status filter '{raw}'"))
        })?),
        None => None,
    };

    let (data, total) = service
        .list_visible(
            &auth.employee_id,
            auth.role,
            LeaveQuery {
                employee_id: query.employee_id.clone(),
                status,
                page,
                per_page,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::error::LeaveError;
use crate::leave::AppService;
use crate::leave::engine::PendingStats;

/* =========================
Manual expiry sweep (Admin)
========================= */
/// Runs the identical routine the hourly scheduler uses.
#[utoipa::path(
    post,
    path = "/api/v1/admin/sweep",
    responses(
        (status = 200, description = "Sweep completed", body = Object, example = json!({
            "message": "Auto-cancellation completed",
            "cancelled_requests": 2,
            "triggered_by": "admin@example.com",
            "timestamp": "2026-01-05T10:00:00Z"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn run_sweep(
    auth: AuthUser,
    service: web::Data<AppService>,
) -> Result<HttpResponse, LeaveError> {
    let cancelled = service.trigger_sweep(auth.role).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Auto-cancellation completed",
        "cancelled_requests": cancelled,
        "triggered_by": auth.email,
        "timestamp": Utc::now(),
    })))
}

/* =========================
Pending backlog stats (Admin)
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/admin/pending-stats",
    responses(
        (status = 200, description = "Pending requests broken down by age", body = PendingStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn pending_stats(
    auth: AuthUser,
    service: web::Data<AppService>,
) -> Result<HttpResponse, LeaveError> {
    let stats = service.pending_stats(auth.role).await?;
    Ok(HttpResponse::Ok().json(stats))
}

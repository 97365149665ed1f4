use actix_web::{HttpResponse, web};
use sqlx::MySqlPool;

use crate::auth::auth::AuthUser;
use crate::error::{LeaveError, StoreError};
use crate::model::role::Role;
use crate::models::UserResponse;

/* =========================
Current user profile
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User record missing")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "User"
)]
pub async fn me(auth: AuthUser, pool: web::Data<MySqlPool>) -> Result<HttpResponse, LeaveError> {
    let profile = sqlx::query_as::<_, UserResponse>(
        r#"
        SELECT id, employee_id, name, email, role, department, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(auth.user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| LeaveError::Store(StoreError::Database(e)))?;

    match profile {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => Err(LeaveError::NotFound("user not found".into())),
    }
}

/* =========================
List users (Admin)
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "All registered users", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "User"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, LeaveError> {
    auth.role.require(Role::Admin)?;

    let users = sqlx::query_as::<_, UserResponse>(
        r#"
        SELECT id, employee_id, name, email, role, department, created_at
        FROM users
        ORDER BY id
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| LeaveError::Store(StoreError::Database(e)))?;

    Ok(HttpResponse::Ok().json(users))
}

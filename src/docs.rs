use crate::api::leave_request::{CreateLeave, DecisionDto, LeaveFilter, LeaveListResponse};
use crate::leave::engine::PendingStats;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::models::{LoginDto, RegisterDto, UserResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Request API",
        version = "1.0.0",
        description = r#"
## Leave Request Service

This API manages **employee leave requests** end to end.

### Key Features
- **Submission** — employees request Annual, Sick or Unpaid leave over an inclusive date range (max 30 days)
- **Decision** — admins approve or deny pending requests; overlapping approved leave is rejected at both submission and approval time
- **Cancellation** — owners cancel their own pending requests
- **Auto-expiry** — requests left pending for more than 10 days are cancelled by an hourly sweep, which admins can also trigger on demand

### Security
Endpoints under the API prefix require **JWT Bearer authentication**.
Decision, sweep, stats and user-listing operations additionally require the **Admin** role.

### Response Format
- JSON-based RESTful responses
- Calendar dates as `YYYY-MM-DD`, statuses as `PENDING`, `APPROVED`, `DENIED`, `CANCELLED`
- Pagination supported for the list endpoint
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::decide_leave,

        crate::api::admin::run_sweep,
        crate::api::admin::pending_stats,

        crate::api::user::me,
        crate::api::user::list_users
    ),
    components(
        schemas(
            LeaveRequest,
            LeaveStatus,
            LeaveType,
            CreateLeave,
            DecisionDto,
            LeaveFilter,
            LeaveListResponse,
            PendingStats,
            RegisterDto,
            LoginDto,
            UserResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave request lifecycle APIs"),
        (name = "Admin", description = "Expiry sweep and backlog statistics"),
        (name = "User", description = "User profile and administration APIs"),
    )
)]
pub struct ApiDoc;

use crate::{
    auth::auth::AuthUser,
    error::ApiError,
    model::login_log::{LoginLogEntry, LoginLogRow},
};
use actix_web::{HttpResponse, web};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

const RECENT_LOGINS: i64 = 50;

#[derive(Serialize, ToSchema)]
pub struct LoginLogsResponse {
    pub message: String,
    pub total_logs: usize,
    pub logs: Vec<LoginLogEntry>,
}

/// Recent logins
#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Most recent logins, newest first", body = LoginLogsResponse),
        (status = 403, description = "Only Admin or Acting Admin can view login logs")
    ),
    tag = "Logs",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn recent_logins(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    if !auth.role.can_mark_attendance() {
        return Err(ApiError::forbidden(
            "Only Admin or Acting Admin can view login logs",
        ));
    }

    let rows = sqlx::query_as::<_, LoginLogRow>(
        r#"
        SELECT emp_no, name, role, tel, company_name, security_firm, `rank`,
               login_time, ip_address, device_info, status, created_at
        FROM login_logs
        ORDER BY login_time DESC
        LIMIT ?
        "#,
    )
    .bind(RECENT_LOGINS)
    .fetch_all(pool.get_ref())
    .await?;

    let logs: Vec<LoginLogEntry> = rows.into_iter().map(LoginLogEntry::from).collect();

    Ok(HttpResponse::Ok().json(LoginLogsResponse {
        message: "Login logs retrieved successfully".to_string(),
        total_logs: logs.len(),
        logs,
    }))
}

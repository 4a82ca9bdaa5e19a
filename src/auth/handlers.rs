use crate::{
    auth::{jwt::generate_access_token, password::verify_password},
    config::Config,
    error::ApiError,
    model::{
        employee::{EmployeeProfile, EmployeeRow},
        login_log::LoginOutcome,
        role::Role,
    },
    models::LoginReqDto,
    utils::employee_cache,
};
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    #[schema(example = "acting_admin")]
    pub role: String,
    #[schema(example = "OIC")]
    pub rank: String,
    pub name: String,
    pub emp_no: String,
    pub company_name: String,
}

/// Login
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Employee number and password are required"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Role is not allowed to log in"),
        (status = 404, description = "Employee not found or not authorized to log in"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(req, pool, config, user),
    fields(emp_no = %user.emp_no)
)]
pub async fn login(
    req: HttpRequest,
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    // 1️⃣ Basic validation
    let emp_no = user.emp_no.trim();
    if emp_no.is_empty() || user.password.is_empty() {
        info!("Validation failed: empty employee number or password");
        return Err(ApiError::bad_request(
            "Employee number and password are required",
        ));
    }

    // 2️⃣ Fetch employee
    debug!("Fetching employee from database");

    let employee = sqlx::query_as::<_, EmployeeRow>(
        r#"
        SELECT emp_no, service_id, name, `rank`, role, tel, company_name,
               security_firm, address, nic, password
        FROM employees
        WHERE emp_no = ?
        "#,
    )
    .bind(emp_no)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Database error while fetching employee");
        ApiError::Internal
    })?
    .ok_or_else(|| {
        info!("Employee not found");
        ApiError::not_found("Employee not found or not authorized to log in")
    })?;

    let (ip_address, device_info) = client_details(&req);

    // 3️⃣ Verify password
    match verify_password(&user.password, &employee.password) {
        Ok(()) => debug!("Password verified"),
        Err(argon2::password_hash::Error::Password) => {
            info!("Invalid credentials: password mismatch");
            record_login(pool.get_ref(), &employee, &ip_address, &device_info, LoginOutcome::Failed).await;
            return Err(ApiError::unauthorized("Invalid credentials"));
        }
        Err(e) => {
            error!(error = %e, "Stored password hash is unreadable");
            return Err(ApiError::Internal);
        }
    }

    // 4️⃣ Role gate
    let role = Role::parse(&employee.role).ok_or_else(|| {
        info!(role = %employee.role, "Role not permitted to log in");
        ApiError::forbidden("Role must be either admin, Acting Admin, or user")
    })?;

    // 5️⃣ Issue token
    let token = generate_access_token(
        &employee.emp_no,
        &employee.name,
        role,
        &employee.rank,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign access token");
        ApiError::Internal
    })?;

    // 6️⃣ Login log (non-fatal)
    record_login(pool.get_ref(), &employee, &ip_address, &device_info, LoginOutcome::Success).await;

    // The marking screen looks this officer up next.
    employee_cache::put(EmployeeProfile::from(&employee)).await;

    info!("Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        role: role.as_str().to_string(),
        rank: employee.rank,
        name: employee.name,
        emp_no: employee.emp_no,
        company_name: employee.company_name,
    }))
}

fn client_details(req: &HttpRequest) -> (String, String) {
    let ip_address = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("Unknown")
        .to_string();
    let device_info = req
        .headers()
        .get("User-Agent")
        .and_then(|h| h.to_str().ok())
        .map(|ua| ua.chars().take(255).collect())
        .unwrap_or_else(|| "Unknown".to_string());
    (ip_address, device_info)
}

/// Upserts the employee's login log row; failures are logged, never raised.
async fn record_login(
    pool: &MySqlPool,
    employee: &EmployeeRow,
    ip_address: &str,
    device_info: &str,
    outcome: LoginOutcome,
) {
    let result = sqlx::query(
        r#"
        INSERT INTO login_logs
            (emp_no, name, role, tel, company_name, security_firm, `rank`,
             login_time, ip_address, device_info, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, NOW(), ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            login_time = NOW(),
            ip_address = VALUES(ip_address),
            device_info = VALUES(device_info),
            status = VALUES(status)
        "#,
    )
    .bind(&employee.emp_no)
    .bind(&employee.name)
    .bind(&employee.role)
    .bind(&employee.tel)
    .bind(&employee.company_name)
    .bind(&employee.security_firm)
    .bind(&employee.rank)
    .bind(ip_address)
    .bind(device_info)
    .bind(outcome.as_ref())
    .execute(pool)
    .await;

    if let Err(e) = result {
        // intentionally not failing login
        error!(error = %e, emp_no = %employee.emp_no, "Failed to record login log");
    }
}

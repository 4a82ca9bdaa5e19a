use crate::{
    auth::{auth::AuthUser, password::hash_password},
    error::{ApiError, is_integrity_violation},
    model::{
        employee::{EmployeeProfile, EmployeeSummary},
        rank::Rank,
        role::Role,
    },
    utils::{emp_no_filter, employee_cache},
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info};
use utoipa::{IntoParams, ToSchema};

/// Registration payload from the user registration screen.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddEmployee {
    #[schema(example = "11139")]
    pub emp_no: Option<String>,
    /// Service identity number printed on the officer's card
    #[schema(example = "S-2231")]
    pub id: Option<String>,
    #[schema(example = "Employee One")]
    pub name: Option<String>,
    #[schema(example = "user")]
    pub role: Option<String>,
    #[schema(example = "0771234567")]
    pub tel: Option<String>,
    #[schema(example = "ASPDL")]
    pub company_name: Option<String>,
    #[schema(example = "oracle")]
    pub security_firm: Option<String>,
    #[schema(example = "JSO")]
    pub rank: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: Option<String>,
    #[schema(example = "199012345678")]
    pub nic: Option<String>,
    pub address: Option<String>,
}

/// Validated registration, ready to insert.
#[derive(Debug, PartialEq)]
pub struct NewEmployee {
    pub emp_no: String,
    pub service_id: String,
    pub name: String,
    pub role: Role,
    pub tel: String,
    pub company_name: String,
    pub security_firm: String,
    pub rank: Rank,
    pub password: String,
    pub nic: String,
    pub address: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl AddEmployee {
    pub fn validate(self) -> Result<NewEmployee, ApiError> {
        let fields: [(&str, &Option<String>); 10] = [
            ("emp_no", &self.emp_no),
            ("id", &self.id),
            ("name", &self.name),
            ("role", &self.role),
            ("tel", &self.tel),
            ("company_name", &self.company_name),
            ("security_firm", &self.security_firm),
            ("rank", &self.rank),
            ("password", &self.password),
            ("nic", &self.nic),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, v)| present(v).is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::bad_request(format!(
                "All fields are required, missing: {}",
                missing.join(", ")
            )));
        }

        let tel = present(&self.tel).unwrap_or_default();
        if !tel.chars().all(|c| c.is_ascii_digit()) {
            return Err(ApiError::bad_request("Phone number must contain only numbers"));
        }

        let role = present(&self.role)
            .and_then(Role::parse)
            .ok_or_else(|| ApiError::bad_request("Role must be one of admin, acting_admin, user"))?;
        let rank = present(&self.rank)
            .and_then(Rank::parse)
            .ok_or_else(|| ApiError::bad_request("Rank must be one of OIC, JSO, LSO"))?;

        // Passwords are compared untrimmed.
        let password = self.password.clone().unwrap_or_default();
        if let Some(confirm) = &self.confirm_password {
            if *confirm != password {
                return Err(ApiError::bad_request("Passwords must match"));
            }
        }

        let owned = |v: &Option<String>| present(v).unwrap_or_default().to_string();
        Ok(NewEmployee {
            emp_no: owned(&self.emp_no),
            service_id: owned(&self.id),
            name: owned(&self.name),
            role,
            tel: tel.to_string(),
            company_name: owned(&self.company_name),
            security_firm: owned(&self.security_firm),
            rank,
            password,
            nic: owned(&self.nic),
            address: present(&self.address).map(str::to_string),
        })
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RankQuery {
    /// OIC, JSO or LSO
    #[schema(example = "JSO")]
    pub rank: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeesByRankResponse {
    pub message: String,
    pub employees: Vec<EmployeeSummary>,
}

/// Register employee
#[utoipa::path(
    post,
    path = "/api/employee/add",
    request_body = AddEmployee,
    responses(
        (status = 201, description = "Employee added successfully"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Employee already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn add_employee(
    pool: web::Data<MySqlPool>,
    payload: web::Json<AddEmployee>,
) -> Result<HttpResponse, ApiError> {
    let employee = payload.into_inner().validate()?;

    if emp_no_filter::might_exist(&employee.emp_no) && emp_no_taken(pool.get_ref(), &employee.emp_no).await? {
        info!(emp_no = %employee.emp_no, "Registration rejected: employee exists");
        return Err(ApiError::conflict("Employee already exists"));
    }

    let hashed = hash_password(&employee.password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        ApiError::Internal
    })?;

    let mut tx = pool.begin().await?;

    // Companies are created on first registration.
    let created_company = sqlx::query(
        r#"
        INSERT IGNORE INTO companies (company_name, address, subsidiary, contact_number)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&employee.company_name)
    .bind(&employee.address)
    .bind(&employee.security_firm)
    .bind(&employee.tel)
    .execute(&mut *tx)
    .await?
    .rows_affected()
        > 0;

    let inserted = sqlx::query(
        r#"
        INSERT INTO employees
            (emp_no, service_id, name, `rank`, role, tel, company_name,
             security_firm, address, nic, password)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&employee.emp_no)
    .bind(&employee.service_id)
    .bind(&employee.name)
    .bind(employee.rank.as_ref())
    .bind(employee.role.as_str())
    .bind(&employee.tel)
    .bind(&employee.company_name)
    .bind(&employee.security_firm)
    .bind(&employee.address)
    .bind(&employee.nic)
    .bind(&hashed)
    .execute(&mut *tx)
    .await;

    if let Err(e) = inserted {
        if is_integrity_violation(&e) {
            // Lost a race with a concurrent registration.
            return Err(ApiError::conflict("Employee already exists"));
        }
        error!(error = %e, emp_no = %employee.emp_no, "Failed to add employee");
        return Err(ApiError::Internal);
    }

    tx.commit().await?;

    emp_no_filter::insert(&employee.emp_no);
    employee_cache::invalidate(&employee.emp_no).await;

    info!(emp_no = %employee.emp_no, created_company, "Employee added");

    Ok(HttpResponse::Created().json(json!({
        "message": "Employee added successfully",
        "emp_no": employee.emp_no
    })))
}

async fn emp_no_taken(pool: &MySqlPool, emp_no: &str) -> Result<bool, ApiError> {
    let exists = sqlx::query_scalar::<_, i64>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE emp_no = ? LIMIT 1)",
    )
    .bind(emp_no)
    .fetch_one(pool)
    .await?;
    Ok(exists > 0)
}

/// Employees by rank
#[utoipa::path(
    get,
    path = "/api/employees_by_rank",
    params(RankQuery),
    responses(
        (status = 200, description = "Employees with the rank", body = EmployeesByRankResponse),
        (status = 400, description = "Rank is missing or unknown"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn employees_by_rank(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RankQuery>,
) -> Result<HttpResponse, ApiError> {
    let raw = query
        .rank
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ApiError::bad_request("Rank is required as a query parameter"))?;
    let rank = Rank::parse(raw)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown rank {raw}, expected OIC, JSO or LSO")))?;

    debug!(rank = %rank, "Listing employees by rank");

    let employees = sqlx::query_as::<_, EmployeeSummary>(
        r#"
        SELECT emp_no, name, `rank`
        FROM employees
        WHERE `rank` = ?
        ORDER BY name
        "#,
    )
    .bind(rank.as_ref())
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(EmployeesByRankResponse {
        message: format!("Employees with rank {rank} retrieved successfully"),
        employees,
    }))
}

/// Looks an employee up through the profile cache.
pub async fn find_profile(pool: &MySqlPool, emp_no: &str) -> Result<Option<EmployeeProfile>, ApiError> {
    if let Some(profile) = employee_cache::get(emp_no).await {
        return Ok(Some(profile));
    }

    let profile = sqlx::query_as::<_, EmployeeProfile>(
        r#"
        SELECT emp_no, name, role, tel, company_name, security_firm, `rank`
        FROM employees
        WHERE emp_no = ?
        "#,
    )
    .bind(emp_no)
    .fetch_optional(pool)
    .await?;

    if let Some(p) = &profile {
        employee_cache::put(p.clone()).await;
    }
    Ok(profile)
}

/// Get employee
#[utoipa::path(
    get,
    path = "/api/employee/{emp_no}",
    params(
        ("emp_no", Path, description = "Employee number")
    ),
    responses(
        (status = 200, description = "Employee found", body = EmployeeProfile),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let emp_no = path.into_inner();

    match find_profile(pool.get_ref(), &emp_no).await? {
        Some(profile) => Ok(HttpResponse::Ok().json(profile)),
        None => Err(ApiError::not_found("Employee not found")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> AddEmployee {
        AddEmployee {
            emp_no: Some("11139".into()),
            id: Some("S-2231".into()),
            name: Some(" Employee One ".into()),
            role: Some("acting_admin".into()),
            tel: Some("0771234567".into()),
            company_name: Some("ASPDL".into()),
            security_firm: Some("oracle".into()),
            rank: Some("jso".into()),
            password: Some("pw".into()),
            confirm_password: Some("pw".into()),
            nic: Some("199012345678".into()),
            address: Some("  ".into()),
        }
    }

    #[test]
    fn complete_payload_validates() {
        let employee = complete().validate().unwrap();
        assert_eq!(employee.name, "Employee One");
        assert_eq!(employee.role, Role::ActingAdmin);
        assert_eq!(employee.rank, Rank::Jso);
        assert_eq!(employee.address, None);
    }

    #[test]
    fn missing_fields_are_listed() {
        let payload = AddEmployee {
            nic: None,
            tel: Some(" ".into()),
            ..complete()
        };
        let err = payload.validate().unwrap_err();
        assert_eq!(err.to_string(), "All fields are required, missing: tel, nic");
    }

    #[test]
    fn phone_must_be_digits() {
        let payload = AddEmployee {
            tel: Some("+94 77".into()),
            ..complete()
        };
        assert_eq!(
            payload.validate().unwrap_err().to_string(),
            "Phone number must contain only numbers"
        );
    }

    #[test]
    fn confirmation_must_match_when_sent() {
        let mismatch = AddEmployee {
            confirm_password: Some("other".into()),
            ..complete()
        };
        assert!(mismatch.validate().is_err());

        let absent = AddEmployee {
            confirm_password: None,
            ..complete()
        };
        assert!(absent.validate().is_ok());
    }

    #[test]
    fn unknown_rank_or_role_rejected() {
        let rank = AddEmployee {
            rank: Some("Security".into()),
            ..complete()
        };
        assert!(matches!(rank.validate(), Err(ApiError::BadRequest(_))));

        let role = AddEmployee {
            role: Some("OIC".into()),
            ..complete()
        };
        assert!(matches!(role.validate(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn registration_json_uses_client_field_names() {
        let payload: AddEmployee = serde_json::from_value(json!({
            "emp_no": "1", "id": "2", "confirmPassword": "x"
        }))
        .unwrap();
        assert_eq!(payload.id.as_deref(), Some("2"));
        assert_eq!(payload.confirm_password.as_deref(), Some("x"));
    }
}

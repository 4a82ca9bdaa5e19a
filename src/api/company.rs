use crate::{
    auth::auth::AuthUser,
    error::{ApiError, is_integrity_violation},
    model::company::{Company, CompanyRef},
    utils::{
        db_utils::{SqlValue, build_update_sql, execute_update},
        employee_cache,
    },
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

/// Columns a company update may touch.
const UPDATABLE_COLUMNS: [&str; 3] = ["address", "subsidiary", "contact_number"];

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCompany {
    #[schema(example = "ASPDL")]
    pub company_name: Option<String>,
    #[schema(example = "No. 305, Vauxhall Street, Colombo 02")]
    pub address: Option<String>,
    #[schema(example = "oracle")]
    pub subsidiary: Option<String>,
    #[schema(example = "0112308308")]
    pub contact_number: Option<String>,
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Create company
#[utoipa::path(
    post,
    path = "/api/company/add",
    request_body = CreateCompany,
    responses(
        (status = 201, description = "Company added successfully"),
        (status = 400, description = "All fields are required"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Company already exists")
    ),
    tag = "Company",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_company(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateCompany>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let (Some(name), Some(address), Some(subsidiary), Some(contact)) = (
        required(&payload.company_name),
        required(&payload.address),
        required(&payload.subsidiary),
        required(&payload.contact_number),
    ) else {
        return Err(ApiError::bad_request("All fields are required"));
    };

    let result = sqlx::query(
        r#"
        INSERT INTO companies (company_name, address, subsidiary, contact_number)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(address)
    .bind(subsidiary)
    .bind(contact)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            info!(company = name, "Company added");
            Ok(HttpResponse::Created().json(json!({
                "message": "Company added successfully",
                "company_name": name
            })))
        }
        Err(e) if is_integrity_violation(&e) => Err(ApiError::conflict("Company already exists")),
        Err(e) => {
            error!(error = %e, "Failed to add company");
            Err(ApiError::Internal)
        }
    }
}

/// All companies (id and name)
#[utoipa::path(
    get,
    path = "/api/company/all",
    responses(
        (status = 200, description = "Company ids and names", body = [CompanyRef])
    ),
    tag = "Company",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn all_companies(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let companies = sqlx::query_as::<_, CompanyRef>("SELECT id, company_name FROM companies ORDER BY id")
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(companies))
}

/// Company list
#[utoipa::path(
    get,
    path = "/api/company/list",
    responses(
        (status = 200, description = "Companies with details, by name")
    ),
    tag = "Company",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_companies(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let companies = sqlx::query_as::<_, Company>(
        r#"
        SELECT company_name, address, subsidiary, contact_number
        FROM companies
        ORDER BY company_name
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Companies retrieved successfully",
        "companies": companies
    })))
}

/// Get company
#[utoipa::path(
    get,
    path = "/api/company/{company_name}",
    params(
        ("company_name", Path, description = "Company name")
    ),
    responses(
        (status = 200, description = "Company found"),
        (status = 404, description = "Company not found")
    ),
    tag = "Company",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_company(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let company_name = path.into_inner();

    let company = sqlx::query_as::<_, Company>(
        r#"
        SELECT company_name, address, subsidiary, contact_number
        FROM companies
        WHERE company_name = ?
        "#,
    )
    .bind(&company_name)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::not_found(format!("Company {company_name} not found")))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Company retrieved successfully",
        "company": company
    })))
}

/// Update company
#[utoipa::path(
    put,
    path = "/api/company/{company_name}",
    params(
        ("company_name", Path, description = "Company name")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Company updated successfully"),
        (status = 400, description = "No valid update fields provided"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Company not found")
    ),
    tag = "Company",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_company(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    let company_name = path.into_inner();

    let update = build_update_sql(
        "companies",
        &body,
        &UPDATABLE_COLUMNS,
        "company_name",
        SqlValue::String(company_name.clone()),
    )?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM companies WHERE company_name = ?")
        .bind(&company_name)
        .fetch_one(pool.get_ref())
        .await?;
    if exists == 0 {
        return Err(ApiError::not_found(format!("Company {company_name} not found")));
    }

    // rows_affected is 0 when values are unchanged, so existence is checked above.
    execute_update(pool.get_ref(), update).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Company updated successfully",
        "company_name": company_name
    })))
}

/// Delete company
#[utoipa::path(
    delete,
    path = "/api/company/{company_name}",
    params(
        ("company_name", Path, description = "Company name")
    ),
    responses(
        (status = 200, description = "Company deleted successfully"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Company not found"),
        (status = 409, description = "Company still has employees")
    ),
    tag = "Company",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_company(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    let company_name = path.into_inner();

    let result = sqlx::query("DELETE FROM companies WHERE company_name = ?")
        .bind(&company_name)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) if res.rows_affected() == 0 => {
            Err(ApiError::not_found(format!("Company {company_name} not found")))
        }
        Ok(_) => {
            employee_cache::invalidate_company(&company_name);
            info!(company = %company_name, "Company deleted");
            Ok(HttpResponse::Ok().json(json!({
                "message": "Company deleted successfully",
                "company_name": company_name
            })))
        }
        Err(e) if is_integrity_violation(&e) => Err(ApiError::conflict(format!(
            "Company {company_name} still has employees"
        ))),
        Err(e) => {
            error!(error = %e, company = %company_name, "Failed to delete company");
            Err(ApiError::Internal)
        }
    }
}

use crate::{
    auth::auth::AuthUser,
    config::Config,
    error::ApiError,
    model::attendance::{
        AttendanceRecord, AttendanceStatus, DayStatus, ShiftWindow, format_timestamp,
        reconcile_shift_edit, scheduled_checkout, worked_hours,
    },
    utils::db_utils::page_window,
};
use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{MySql, MySqlPool, Transaction};
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

const RECORD_COLUMNS: &str = "id, emp_no, name, company_name, date, checkin_time, \
     scheduled_checkout, checkout_time, total_hours, status, marked_by";

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MarkAttendance {
    /// Employee to mark; defaults to the signed-in officer
    #[schema(example = "11139")]
    pub emp_no: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CheckInData {
    pub id: u64,
    pub emp_no: String,
    pub name: String,
    pub company_name: String,
    #[schema(example = "2025-03-01 08:00:00")]
    pub checkin_time: String,
    /// Scheduled check-out
    #[schema(example = "2025-03-01 16:00:00")]
    pub checkout_time: String,
}

#[derive(Serialize, ToSchema)]
pub struct CheckOutData {
    pub id: u64,
    pub emp_no: String,
    pub name: String,
    #[schema(example = "2025-03-01 08:00:00")]
    pub checkin_time: String,
    #[schema(example = "2025-03-01 15:42:10")]
    pub checkout_time: String,
    #[schema(example = 7.7)]
    pub total_work_hours: f64,
}

#[derive(Serialize)]
pub struct MarkResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct StatusQuery {
    /// Defaults to the signed-in officer
    pub emp_no: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub message: String,
    pub can_checkin: bool,
    pub can_checkout: bool,
    #[schema(example = "Active")]
    pub status: Option<String>,
    pub checkin_time: Option<String>,
    pub checkout_time: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RecordsQuery {
    #[schema(example = "11139")]
    pub emp_no: Option<String>,
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 20)]
    pub per_page: Option<u32>,
}

impl RecordsQuery {
    /// The employee whose records are listed, if the caller may see them.
    fn owner(&self, auth: &AuthUser) -> Result<&str, ApiError> {
        let emp_no = self
            .emp_no
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ApiError::bad_request("emp_no is required as a query parameter"))?;
        if !auth.can_view(emp_no) {
            return Err(ApiError::forbidden("Not allowed to view this employee"));
        }
        Ok(emp_no)
    }

    fn window(&self) -> (u32, u32, u64) {
        page_window(self.page, self.per_page)
    }
}

/// A shift as the records list shows it.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordView {
    pub id: u64,
    pub emp_no: String,
    #[schema(example = "2025-03-01")]
    pub date: String,
    #[schema(example = "2025-03-01 08:00:00")]
    pub shift_start_time: String,
    #[schema(example = "2025-03-01 16:00:00")]
    pub shift_end_time: Option<String>,
    pub scheduled_checkout: String,
    #[schema(example = "Completed")]
    pub status: String,
    /// IN while the shift is open, OUT once closed
    #[schema(example = "OUT")]
    pub punch: String,
    pub total_hours: Option<f64>,
    pub marked_by: String,
}

impl From<&AttendanceRecord> for RecordView {
    fn from(r: &AttendanceRecord) -> Self {
        let punch = if r.is_open() {
            AttendanceStatus::Active.punch()
        } else {
            AttendanceStatus::Completed.punch()
        };
        RecordView {
            id: r.id,
            emp_no: r.emp_no.clone(),
            date: r.date.format("%Y-%m-%d").to_string(),
            shift_start_time: format_timestamp(r.checkin_time),
            shift_end_time: r.checkout_time.map(format_timestamp),
            scheduled_checkout: format_timestamp(r.scheduled_checkout),
            status: r.status.clone(),
            punch: punch.to_string(),
            total_hours: r.total_hours,
            marked_by: r.marked_by.clone(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RecordsResponse {
    pub success: bool,
    pub records: Vec<RecordView>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Body of the edit form.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRecord {
    #[schema(example = "08:00:00")]
    pub shift_start_time: String,
    #[schema(example = "16:00:00", nullable = true)]
    pub shift_end_time: Option<String>,
    /// Moves the shift to another day
    #[schema(example = "2025-03-01", nullable = true)]
    pub date: Option<String>,
}

#[derive(sqlx::FromRow)]
struct MarkTarget {
    emp_no: String,
    name: String,
    company_name: String,
}

#[derive(Debug, Default, sqlx::FromRow)]
struct DayCounts {
    total_records: i64,
    open_records: i64,
    completed_records: i64,
}

/// Locks the employee row so marks for one employee run one at a time.
async fn lock_employee(
    tx: &mut Transaction<'_, MySql>,
    emp_no: &str,
) -> Result<MarkTarget, ApiError> {
    sqlx::query_as::<_, MarkTarget>(
        "SELECT emp_no, name, company_name FROM employees WHERE emp_no = ? FOR UPDATE",
    )
    .bind(emp_no)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))
}

async fn open_shift(
    tx: &mut Transaction<'_, MySql>,
    emp_no: &str,
) -> Result<Option<AttendanceRecord>, ApiError> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM attendance \
         WHERE emp_no = ? AND checkout_time IS NULL \
         ORDER BY checkin_time DESC LIMIT 1 FOR UPDATE"
    );
    Ok(sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(emp_no)
        .fetch_optional(&mut **tx)
        .await?)
}

/// Whom a mark applies to. An empty body marks the caller; a body that is
/// not a valid `MarkAttendance` is rejected rather than ignored.
fn mark_target(auth: &AuthUser, body: &[u8]) -> Result<String, ApiError> {
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        MarkAttendance::default()
    } else {
        serde_json::from_slice::<MarkAttendance>(body)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))?
    };
    Ok(payload
        .emp_no
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| auth.emp_no.clone()))
}

fn reject_if_open(emp_no: &str, open: Option<&AttendanceRecord>) -> Result<(), ApiError> {
    match open {
        Some(shift) => {
            debug!(emp_no = %emp_no, shift_id = shift.id, "Check-in rejected: shift still open");
            Err(ApiError::bad_request(format!(
                "User {emp_no} has already checked in"
            )))
        }
        None => Ok(()),
    }
}

fn no_open_shift(emp_no: &str, counts: &DayCounts) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "success": false,
        "message": format!("No active check-in found for user {emp_no}"),
        "details": {
            "total_records": counts.total_records,
            "open_records": counts.open_records,
            "completed_records": counts.completed_records
        }
    }))
}

/// The close is conditional on the shift still being open; zero rows means a
/// concurrent checkout won.
fn ensure_closed(rows_affected: u64, emp_no: &str) -> Result<(), ApiError> {
    if rows_affected == 0 {
        return Err(ApiError::bad_request(format!(
            "No active check-in found for user {emp_no}"
        )));
    }
    Ok(())
}

fn require_record<T>(found: Option<T>, id: u64) -> Result<T, ApiError> {
    found.ok_or_else(|| ApiError::not_found(format!("Attendance record {id} not found")))
}

/// An edit that leaves a shift open must not make it the employee's second one.
fn ensure_single_open(
    emp_no: &str,
    shift: &ShiftWindow,
    other_open: Option<u64>,
) -> Result<(), ApiError> {
    match (shift.end, other_open) {
        (None, Some(other)) => {
            debug!(emp_no = %emp_no, other_shift = other, "Edit rejected: another shift open");
            Err(ApiError::bad_request(format!(
                "User {emp_no} already has an open shift"
            )))
        }
        _ => Ok(()),
    }
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkin",
    request_body = MarkAttendance,
    responses(
        (status = 200, description = "Check-in successful", body = Object, example = json!({
            "success": true,
            "message": "Check-in successful",
            "data": {
                "id": 42,
                "emp_no": "11139",
                "name": "Employee One",
                "company_name": "ASPDL",
                "checkin_time": "2025-03-01 08:00:00",
                "checkout_time": "2025-03-01 16:00:00"
            }
        })),
        (status = 400, description = "Already checked in"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    auth.require_marker()?;
    let emp_no = mark_target(&auth, &body)?;

    let mut tx = pool.begin().await?;
    let employee = lock_employee(&mut tx, &emp_no).await?;

    reject_if_open(&emp_no, open_shift(&mut tx, &emp_no).await?.as_ref())?;

    let checkin = now();
    let scheduled = scheduled_checkout(checkin, config.shift_hours);

    let id = sqlx::query(
        r#"
        INSERT INTO attendance
            (emp_no, name, company_name, date, checkin_time, scheduled_checkout, status, marked_by)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&employee.emp_no)
    .bind(&employee.name)
    .bind(&employee.company_name)
    .bind(checkin.date())
    .bind(checkin)
    .bind(scheduled)
    .bind(AttendanceStatus::Active.as_ref())
    .bind(&auth.emp_no)
    .execute(&mut *tx)
    .await?
    .last_insert_id();

    tx.commit().await?;

    info!(emp_no = %employee.emp_no, marked_by = %auth.emp_no, shift_id = id, "Checked in");

    Ok(HttpResponse::Ok().json(MarkResponse {
        success: true,
        message: "Check-in successful".to_string(),
        data: CheckInData {
            id,
            emp_no: employee.emp_no,
            name: employee.name,
            company_name: employee.company_name,
            checkin_time: format_timestamp(checkin),
            checkout_time: format_timestamp(scheduled),
        },
    }))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkout",
    request_body = MarkAttendance,
    responses(
        (status = 200, description = "Check-out successful", body = Object, example = json!({
            "success": true,
            "message": "Check-out successful",
            "data": {
                "id": 42,
                "emp_no": "11139",
                "name": "Employee One",
                "checkin_time": "2025-03-01 08:00:00",
                "checkout_time": "2025-03-01 15:42:10",
                "total_work_hours": 7.7
            }
        })),
        (status = 400, description = "No active check-in found", body = Object, example = json!({
            "success": false,
            "message": "No active check-in found for user 11139",
            "details": {"total_records": 1, "open_records": 0, "completed_records": 1}
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    auth.require_marker()?;
    let emp_no = mark_target(&auth, &body)?;

    let mut tx = pool.begin().await?;
    let employee = lock_employee(&mut tx, &emp_no).await?;

    let Some(open) = open_shift(&mut tx, &emp_no).await? else {
        tx.rollback().await?;
        let counts = day_counts(pool.get_ref(), &emp_no, now().date()).await?;
        debug!(
            emp_no = %emp_no,
            total = counts.total_records,
            open = counts.open_records,
            completed = counts.completed_records,
            "Check-out rejected: no open shift"
        );
        return Ok(no_open_shift(&emp_no, &counts));
    };

    let checkout = now();
    let total = worked_hours(open.checkin_time, checkout, config.shift_hours);

    let closed = sqlx::query(
        r#"
        UPDATE attendance
        SET checkout_time = ?, total_hours = ?, status = ?, marked_by = ?
        WHERE id = ? AND checkout_time IS NULL
        "#,
    )
    .bind(checkout)
    .bind(total)
    .bind(AttendanceStatus::Completed.as_ref())
    .bind(&auth.emp_no)
    .bind(open.id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    ensure_closed(closed, &emp_no)?;

    tx.commit().await?;

    info!(emp_no = %employee.emp_no, shift_id = open.id, total_hours = total, "Checked out");

    Ok(HttpResponse::Ok().json(MarkResponse {
        success: true,
        message: "Check-out successful".to_string(),
        data: CheckOutData {
            id: open.id,
            emp_no: employee.emp_no,
            name: employee.name,
            checkin_time: format_timestamp(open.checkin_time),
            checkout_time: format_timestamp(checkout),
            total_work_hours: total,
        },
    }))
}

async fn day_counts(pool: &MySqlPool, emp_no: &str, date: NaiveDate) -> Result<DayCounts, ApiError> {
    Ok(sqlx::query_as::<_, DayCounts>(
        r#"
        SELECT
            COUNT(*) AS total_records,
            CAST(COALESCE(SUM(checkout_time IS NULL), 0) AS SIGNED) AS open_records,
            CAST(COALESCE(SUM(checkout_time IS NOT NULL), 0) AS SIGNED) AS completed_records
        FROM attendance
        WHERE emp_no = ? AND date = ?
        "#,
    )
    .bind(emp_no)
    .bind(date)
    .fetch_one(pool)
    .await?)
}

/// Attendance status
#[utoipa::path(
    get,
    path = "/api/attendance/status",
    params(StatusQuery),
    responses(
        (status = 200, description = "What can be marked now", body = StatusResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<StatusQuery>,
) -> Result<HttpResponse, ApiError> {
    let emp_no = query
        .emp_no
        .clone()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| auth.emp_no.clone());
    if !auth.can_view(&emp_no) {
        return Err(ApiError::forbidden("Not allowed to view this employee"));
    }

    // Today's latest shift, or an open one carried over from an earlier day.
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM attendance \
         WHERE emp_no = ? AND (date = ? OR checkout_time IS NULL) \
         ORDER BY checkin_time DESC LIMIT 1"
    );
    let latest = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(&emp_no)
        .bind(now().date())
        .fetch_optional(pool.get_ref())
        .await?;

    let day = DayStatus::from_latest(latest.as_ref());
    let message = match &latest {
        None => "No attendance record for today",
        Some(r) if r.is_open() => "Checked in",
        Some(_) => "Checked out today",
    };

    Ok(HttpResponse::Ok().json(StatusResponse {
        message: message.to_string(),
        can_checkin: day.can_checkin,
        can_checkout: day.can_checkout,
        status: latest.as_ref().map(|r| r.status.clone()),
        checkin_time: latest.as_ref().map(|r| format_timestamp(r.checkin_time)),
        checkout_time: latest.as_ref().and_then(|r| r.checkout_time.map(format_timestamp)),
    }))
}

/// List attendance records
#[utoipa::path(
    get,
    path = "/api/attendance/records",
    params(RecordsQuery),
    responses(
        (status = 200, description = "Shifts, newest first", body = RecordsResponse),
        (status = 400, description = "emp_no is required"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_records(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RecordsQuery>,
) -> Result<HttpResponse, ApiError> {
    let emp_no = query.owner(&auth)?;

    let (page, per_page, offset) = query.window();

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance WHERE emp_no = ?")
        .bind(emp_no)
        .fetch_one(pool.get_ref())
        .await?;

    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM attendance \
         WHERE emp_no = ? \
         ORDER BY checkin_time DESC, id DESC \
         LIMIT ? OFFSET ?"
    );
    debug!(emp_no, page, per_page, offset, "Fetching attendance records");

    let records = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(emp_no)
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(RecordsResponse {
        success: true,
        records: records.iter().map(RecordView::from).collect(),
        page,
        per_page,
        total,
    }))
}

/// Update an attendance record
#[utoipa::path(
    put,
    path = "/api/attendance/records/{id}",
    params(
        ("id", Path, description = "Attendance record id")
    ),
    request_body = UpdateRecord,
    responses(
        (status = 200, description = "Record updated"),
        (status = 400, description = "Malformed times"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Record not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn update_record(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    body: web::Json<UpdateRecord>,
) -> Result<HttpResponse, ApiError> {
    auth.require_marker()?;
    let id = path.into_inner();

    let date_override = match body.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| ApiError::bad_request(format!("Invalid date '{raw}', expected YYYY-MM-DD")))?,
        ),
        None => None,
    };

    let mut tx = pool.begin().await?;

    // Same lock order as check-in/check-out: employee row, then shifts.
    let owner = sqlx::query_scalar::<_, String>("SELECT emp_no FROM attendance WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let owner = require_record(owner, id)?;
    lock_employee(&mut tx, &owner).await?;

    let sql = format!("SELECT {RECORD_COLUMNS} FROM attendance WHERE id = ? FOR UPDATE");
    let record = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let record = require_record(record, id)?;

    let shift = reconcile_shift_edit(
        date_override.unwrap_or(record.date),
        &body.shift_start_time,
        body.shift_end_time.as_deref(),
        config.shift_hours,
    )
    .map_err(|e| ApiError::bad_request(e.to_string()))?;

    if shift.end.is_none() {
        let other_open = sqlx::query_scalar::<_, u64>(
            "SELECT id FROM attendance \
             WHERE emp_no = ? AND checkout_time IS NULL AND id <> ? \
             LIMIT 1 FOR UPDATE",
        )
        .bind(&record.emp_no)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        ensure_single_open(&record.emp_no, &shift, other_open)?;
    }

    sqlx::query(
        r#"
        UPDATE attendance
        SET date = ?, checkin_time = ?, scheduled_checkout = ?, checkout_time = ?,
            total_hours = ?, status = ?, marked_by = ?
        WHERE id = ?
        "#,
    )
    .bind(shift.date)
    .bind(shift.start)
    .bind(scheduled_checkout(shift.start, config.shift_hours))
    .bind(shift.end)
    .bind(shift.total_hours)
    .bind(shift.status.as_ref())
    .bind(&auth.emp_no)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(shift_id = id, edited_by = %auth.emp_no, status = %shift.status, "Attendance record updated");

    let updated = AttendanceRecord {
        date: shift.date,
        checkin_time: shift.start,
        scheduled_checkout: scheduled_checkout(shift.start, config.shift_hours),
        checkout_time: shift.end,
        total_hours: shift.total_hours,
        status: shift.status.to_string(),
        marked_by: auth.emp_no.clone(),
        ..record
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Attendance record updated successfully",
        "record": RecordView::from(&updated)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use actix_web::{ResponseError, body::to_bytes, http::StatusCode};
    use serde_json::Value;

    fn officer(role: Role) -> AuthUser {
        AuthUser {
            emp_no: "11138".into(),
            name: "M.A.G.I Malwaththa".into(),
            role,
            rank: "OIC".into(),
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn open_shift_record() -> AttendanceRecord {
        AttendanceRecord {
            id: 7,
            emp_no: "11139".into(),
            name: "Employee One".into(),
            company_name: "ASPDL".into(),
            date: at(8, 0).date(),
            checkin_time: at(8, 0),
            scheduled_checkout: at(16, 0),
            checkout_time: None,
            total_hours: None,
            status: "Active".into(),
            marked_by: "11138".into(),
        }
    }

    fn message(err: ApiError) -> (StatusCode, String) {
        (err.status_code(), err.to_string())
    }

    #[test]
    fn empty_body_marks_the_caller() {
        let auth = officer(Role::ActingAdmin);
        assert_eq!(mark_target(&auth, b"").unwrap(), "11138");
        assert_eq!(mark_target(&auth, b"  \n").unwrap(), "11138");
        assert_eq!(mark_target(&auth, b"{}").unwrap(), "11138");
        assert_eq!(mark_target(&auth, br#"{"emp_no": " "}"#).unwrap(), "11138");
        assert_eq!(mark_target(&auth, br#"{"emp_no": "11139"}"#).unwrap(), "11139");
    }

    #[test]
    fn malformed_body_is_rejected_not_defaulted() {
        let auth = officer(Role::ActingAdmin);
        let bodies: [&[u8]; 4] = [br#"{"emp_no": 11139}"#, b"{", b"null", b"\"11139\""];
        for body in bodies {
            let err = mark_target(&auth, body).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn second_check_in_is_refused_while_a_shift_is_open() {
        assert!(reject_if_open("11139", None).is_ok());

        let open = open_shift_record();
        assert_eq!(
            message(reject_if_open("11139", Some(&open)).unwrap_err()),
            (StatusCode::BAD_REQUEST, "User 11139 has already checked in".into())
        );
    }

    #[actix_web::test]
    async fn checkout_without_open_shift_reports_todays_counts() {
        let counts = DayCounts {
            total_records: 2,
            open_records: 0,
            completed_records: 2,
        };
        let resp = no_open_shift("11139", &counts);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "No active check-in found for user 11139",
                "details": {"total_records": 2, "open_records": 0, "completed_records": 2}
            })
        );
    }

    #[test]
    fn losing_a_concurrent_checkout_is_a_bad_request() {
        assert!(ensure_closed(1, "11139").is_ok());
        assert_eq!(
            message(ensure_closed(0, "11139").unwrap_err()),
            (StatusCode::BAD_REQUEST, "No active check-in found for user 11139".into())
        );
    }

    #[test]
    fn unknown_record_is_404() {
        assert_eq!(require_record(Some(5u8), 5).unwrap(), 5);
        assert_eq!(
            message(require_record::<AttendanceRecord>(None, 99).unwrap_err()),
            (StatusCode::NOT_FOUND, "Attendance record 99 not found".into())
        );
    }

    #[test]
    fn reopening_edit_is_refused_when_another_shift_is_open() {
        let date = at(8, 0).date();
        let reopened = reconcile_shift_edit(date, "08:00", None, 8).unwrap();
        let closed = reconcile_shift_edit(date, "08:00", Some("16:00"), 8).unwrap();

        assert!(ensure_single_open("11139", &reopened, None).is_ok());
        assert!(ensure_single_open("11139", &closed, Some(3)).is_ok());
        assert_eq!(
            message(ensure_single_open("11139", &reopened, Some(3)).unwrap_err()),
            (StatusCode::BAD_REQUEST, "User 11139 already has an open shift".into())
        );
    }

    #[test]
    fn records_query_window_is_clamped() {
        let query = web::Query::<RecordsQuery>::from_query("emp_no=11139&page=0&per_page=500")
            .unwrap()
            .into_inner();
        assert_eq!(query.window(), (1, 100, 0));

        let query = web::Query::<RecordsQuery>::from_query("emp_no=11139&page=4294967295")
            .unwrap()
            .into_inner();
        assert_eq!(query.window(), (u32::MAX, 20, (u64::from(u32::MAX) - 1) * 20));
    }

    #[test]
    fn records_owner_rules() {
        let query = |q: &str| web::Query::<RecordsQuery>::from_query(q).unwrap().into_inner();

        let missing = query("page=1");
        assert_eq!(
            missing.owner(&officer(Role::Admin)).unwrap_err().status_code(),
            StatusCode::BAD_REQUEST
        );

        let someone_else = query("emp_no=11140");
        let mut user = officer(Role::User);
        user.emp_no = "11139".into();
        assert_eq!(
            someone_else.owner(&user).unwrap_err().status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(query("emp_no=11139").owner(&user).unwrap(), "11139");
        assert_eq!(someone_else.owner(&officer(Role::ActingAdmin)).unwrap(), "11140");
    }

    #[test]
    fn record_view_formats_open_and_closed_shifts() {
        let open = open_shift_record();
        let view = RecordView::from(&open);
        assert_eq!(view.date, "2025-03-01");
        assert_eq!(view.shift_start_time, "2025-03-01 08:00:00");
        assert_eq!(view.shift_end_time, None);
        assert_eq!(view.punch, "IN");

        let closed = AttendanceRecord {
            checkout_time: Some(at(15, 30)),
            total_hours: Some(7.5),
            status: "Completed".into(),
            ..open
        };
        let view = RecordView::from(&closed);
        assert_eq!(view.shift_end_time.as_deref(), Some("2025-03-01 15:30:00"));
        assert_eq!(view.punch, "OUT");
        assert_eq!(view.total_hours, Some(7.5));
    }

    #[test]
    fn edit_body_accepts_null_end() {
        let body: UpdateRecord = serde_json::from_value(json!({
            "shift_start_time": "08:00:00",
            "shift_end_time": null
        }))
        .unwrap();
        assert_eq!(body.shift_end_time, None);
        assert_eq!(body.date, None);
    }
}

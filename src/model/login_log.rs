use chrono::NaiveDateTime;
use serde::Serialize;
use strum_macros::AsRefStr;
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum LoginOutcome {
    Success,
    Failed,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LoginLogRow {
    pub emp_no: String,
    pub name: String,
    pub role: String,
    pub tel: String,
    pub company_name: String,
    pub security_firm: String,
    pub rank: String,
    pub login_time: NaiveDateTime,
    pub ip_address: String,
    pub device_info: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginLogEntry {
    pub emp_no: String,
    pub name: String,
    pub role: String,
    pub tel: String,
    pub company_name: String,
    pub security_firm: String,
    pub rank: String,
    #[schema(example = "2025-03-01 08:01:12")]
    pub login_time: String,
    #[schema(example = "10.0.0.12")]
    pub ip_address: String,
    #[schema(example = "okhttp/4.9.2")]
    pub device_info: String,
    #[schema(example = "SUCCESS")]
    pub status: String,
    pub created_at: String,
}

impl From<LoginLogRow> for LoginLogEntry {
    fn from(row: LoginLogRow) -> Self {
        Self {
            emp_no: row.emp_no,
            name: row.name,
            role: row.role,
            tel: row.tel,
            company_name: row.company_name,
            security_firm: row.security_firm,
            rank: row.rank,
            login_time: crate::model::attendance::format_timestamp(row.login_time),
            ip_address: row.ip_address,
            device_info: row.device_info,
            status: row.status,
            created_at: crate::model::attendance::format_timestamp(row.created_at),
        }
    }
}

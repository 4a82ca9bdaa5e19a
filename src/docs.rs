use crate::api::attendance::{
    CheckInData, CheckOutData, MarkAttendance, RecordView, RecordsResponse, StatusResponse,
    UpdateRecord,
};
use crate::api::company::CreateCompany;
use crate::api::employee::{AddEmployee, EmployeesByRankResponse};
use crate::api::login_log::LoginLogsResponse;
use crate::api::translation::{Translation, TranslationBundle};
use crate::auth::handlers::LoginResponse;
use crate::i18n::Language;
use crate::model::attendance::AttendanceStatus;
use crate::model::company::{Company, CompanyRef};
use crate::model::employee::{EmployeeProfile, EmployeeSummary};
use crate::model::login_log::LoginLogEntry;
use crate::models::LoginReqDto;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Security Attendance API",
        version = "1.0.0",
        description = r#"
## Security Officer Attendance

Backend for the mobile attendance app used by security firms to track
officers posted at client companies.

### Key Features
- **Login** with employee number and password
- **Registration** of officers, creating the client company on first use
- **Attendance** check-in, check-out, day status and shift edits
- **Companies** and recent **login logs** for supervisors
- **Translations** of the app's UI strings (English and Sinhala)

### Security
Everything except login, registration and translations needs a
**JWT Bearer** token. Marking attendance needs the Admin or Acting Admin
role; company changes need Admin.
"#,
    ),
    paths(
        crate::auth::handlers::login,

        crate::api::employee::add_employee,
        crate::api::employee::employees_by_rank,
        crate::api::employee::get_employee,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::attendance_status,
        crate::api::attendance::list_records,
        crate::api::attendance::update_record,

        crate::api::company::add_company,
        crate::api::company::all_companies,
        crate::api::company::list_companies,
        crate::api::company::get_company,
        crate::api::company::update_company,
        crate::api::company::delete_company,

        crate::api::login_log::recent_logins,

        crate::api::translation::strings,
        crate::api::translation::string
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            AddEmployee,
            EmployeeProfile,
            EmployeeSummary,
            EmployeesByRankResponse,
            MarkAttendance,
            CheckInData,
            CheckOutData,
            StatusResponse,
            RecordView,
            RecordsResponse,
            UpdateRecord,
            AttendanceStatus,
            CreateCompany,
            Company,
            CompanyRef,
            LoginLogEntry,
            LoginLogsResponse,
            Language,
            Translation,
            TranslationBundle
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login"),
        (name = "Employee", description = "Officer registration and lookup"),
        (name = "Attendance", description = "Shift check-in, check-out and edits"),
        (name = "Company", description = "Client companies"),
        (name = "Logs", description = "Recent logins"),
        (name = "I18n", description = "UI translations"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/login",
            "/api/employee/add",
            "/api/employees_by_rank",
            "/api/attendance/checkin",
            "/api/attendance/records/{id}",
            "/api/company/{company_name}",
            "/api/logs",
            "/api/i18n/{lang}/{key}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} is undocumented");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Full `employees` row, password hash included. Never serialised.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmployeeRow {
    pub emp_no: String,
    pub service_id: String,
    pub name: String,
    pub rank: String,
    pub role: String,
    pub tel: String,
    pub company_name: String,
    pub security_firm: String,
    pub address: Option<String>,
    pub nic: String,
    pub password: String,
}

/// Public view of an employee returned by `GET /employee/{emp_no}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "emp_no": "11139",
        "name": "Employee One",
        "role": "user",
        "tel": "94987654321",
        "company_name": "ASPDL",
        "security_firm": "oracle",
        "rank": "JSO"
    })
)]
pub struct EmployeeProfile {
    #[schema(example = "11139")]
    pub emp_no: String,
    #[schema(example = "Employee One")]
    pub name: String,
    #[schema(example = "user")]
    pub role: String,
    #[schema(example = "94987654321")]
    pub tel: String,
    #[schema(example = "ASPDL")]
    pub company_name: String,
    #[schema(example = "oracle")]
    pub security_firm: String,
    #[schema(example = "JSO")]
    pub rank: String,
}

impl From<&EmployeeRow> for EmployeeProfile {
    fn from(row: &EmployeeRow) -> Self {
        Self {
            emp_no: row.emp_no.clone(),
            name: row.name.clone(),
            role: row.role.clone(),
            tel: row.tel.clone(),
            company_name: row.company_name.clone(),
            security_firm: row.security_firm.clone(),
            rank: row.rank.clone(),
        }
    }
}

/// Entry in the employee picker.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeSummary {
    #[schema(example = "11139")]
    pub emp_no: String,
    #[schema(example = "Employee One")]
    pub name: String,
    #[schema(example = "JSO")]
    pub rank: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_from_row_carries_public_fields_only() {
        let row = EmployeeRow {
            emp_no: "11139".into(),
            service_id: "S-2231".into(),
            name: "Employee One".into(),
            rank: "JSO".into(),
            role: "user".into(),
            tel: "0771234567".into(),
            company_name: "ASPDL".into(),
            security_firm: "oracle".into(),
            address: None,
            nic: "199012345678".into(),
            password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
        };

        let profile = EmployeeProfile::from(&row);
        assert_eq!(
            profile,
            EmployeeProfile {
                emp_no: "11139".into(),
                name: "Employee One".into(),
                role: "user".into(),
                tel: "0771234567".into(),
                company_name: "ASPDL".into(),
                security_firm: "oracle".into(),
                rank: "JSO".into(),
            }
        );
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("199012345678"));
    }
}

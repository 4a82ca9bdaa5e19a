use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Company {
    #[schema(example = "ASPDL")]
    pub company_name: String,
    #[schema(example = "No. 305, Vauxhall Street, Colombo 02", nullable = true)]
    pub address: Option<String>,
    #[schema(example = "oracle", nullable = true)]
    pub subsidiary: Option<String>,
    #[schema(example = "0112308308", nullable = true)]
    pub contact_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CompanyRef {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "ASPDL")]
    pub company_name: String,
}

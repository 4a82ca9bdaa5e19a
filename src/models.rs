use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "11138")]
    #[serde(default)]
    pub emp_no: String,
    #[schema(example = "testpassword")]
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Employee number of the signed-in officer
    pub sub: String,
    pub name: String,
    pub role: Role,
    pub rank: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

use serde::{Deserialize, Serialize};
use strum_macros::EnumString;
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum Role {
    #[strum(serialize = "admin")]
    Admin,
    #[strum(serialize = "acting_admin", serialize = "acting admin", serialize = "acting-admin")]
    ActingAdmin,
    #[strum(serialize = "user")]
    User,
}

impl Role {
    /// Parses stored or submitted role text, tolerating surrounding spaces.
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ActingAdmin => "acting_admin",
            Role::User => "user",
        }
    }

    /// Roles allowed to mark and edit attendance for other employees.
    pub fn can_mark_attendance(&self) -> bool {
        matches!(self, Role::Admin | Role::ActingAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_spelling_the_clients_send() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("Acting Admin"), Some(Role::ActingAdmin));
        assert_eq!(Role::parse("acting_admin"), Some(Role::ActingAdmin));
        assert_eq!(Role::parse(" USER "), Some(Role::User));
        assert_eq!(Role::parse("OIC"), None);
    }

    #[test]
    fn serde_and_as_str_agree() {
        for role in [Role::Admin, Role::ActingAdmin, Role::User] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn only_admins_mark_attendance() {
        assert!(Role::Admin.can_mark_attendance());
        assert!(Role::ActingAdmin.can_mark_attendance());
        assert!(!Role::User.can_mark_attendance());
    }
}

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Security officer ranks used to filter the employee picker.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Rank {
    /// Officer in charge
    Oic,
    /// Junior security officer
    Jso,
    /// Lady security officer
    Lso,
}

impl Rank {
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Rank::parse("oic"), Some(Rank::Oic));
        assert_eq!(Rank::parse("JSO"), Some(Rank::Jso));
        assert_eq!(Rank::parse(" Lso"), Some(Rank::Lso));
        assert_eq!(Rank::parse("Security"), None);
    }

    #[test]
    fn text_form_is_uppercase_everywhere() {
        for rank in Rank::iter() {
            let shown = rank.to_string();
            assert_eq!(shown, shown.to_uppercase());
            assert_eq!(rank.as_ref(), shown);
            assert_eq!(serde_json::to_string(&rank).unwrap(), format!("\"{shown}\""));
        }
    }
}

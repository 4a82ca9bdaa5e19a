//! English/Sinhala UI strings served to the mobile client.

use serde::Serialize;
use std::collections::BTreeMap;
use strum_macros::{AsRefStr, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, EnumString, AsRefStr, EnumIter, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    En,
    Si,
}

const EN: &[(&str, &str)] = &[
    ("welcome", "Welcome"),
    ("welcomeTitle", "Welcome to"),
    ("securityManagementSystem", "Security Management System"),
    ("getStarted", "Get Started"),
    ("markAttendance", "Mark Attendance"),
    ("checkAttendance", "Check Attendance"),
    ("userRegistration", "User Registration"),
    ("markAttendanceTitle", "Select Employee"),
    ("submit", "Submit"),
    ("employeeId", "Employee ID"),
    ("rank", "Rank"),
    ("back", "Back"),
];

const SI: &[(&str, &str)] = &[
    ("welcome", "සාදරයෙන් සාදරයෙන්"),
    ("welcomeTitle", "ආයේ පිළිගැනීමට"),
    ("securityManagementSystem", "රක්ෂාව කාර්ය පද්ධතිය"),
    ("getStarted", "ආරම්භ කරන්න"),
    ("markAttendance", "සිටින් පිළිගැනීම"),
    ("checkAttendance", "සිටින් පරීක්ෂා කරන්න"),
    ("userRegistration", "යුසර් ලියාපදිංචි කිරීම"),
    ("markAttendanceTitle", "සිටින් තෝරා ගන්න"),
    ("submit", "සාර්ථක කරන්න"),
    ("employeeId", "සේවක අංකය"),
    ("rank", "තනතුර"),
    ("back", "ආපසු"),
];

impl Language {
    pub fn parse(code: &str) -> Option<Self> {
        code.trim().parse().ok()
    }

    fn table(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Language::En => EN,
            Language::Si => SI,
        }
    }
}

/// Looks up `key`, falling back to the key itself when it has no entry.
pub fn translate<'a>(lang: Language, key: &'a str) -> &'a str {
    lang.table()
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, text)| *text)
        .unwrap_or(key)
}

pub fn bundle(lang: Language) -> BTreeMap<&'static str, &'static str> {
    lang.table().iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use strum::IntoEnumIterator;

    #[test]
    fn translates_known_keys() {
        assert_eq!(translate(Language::En, "back"), "Back");
        assert_eq!(translate(Language::Si, "back"), "ආපසු");
        assert_eq!(translate(Language::Si, "rank"), "තනතුර");
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        assert_eq!(translate(Language::Si, "logout"), "logout");
    }

    #[test]
    fn every_language_covers_the_same_keys() {
        let keys = |lang: Language| bundle(lang).into_keys().collect::<BTreeSet<_>>();
        let english = keys(Language::En);
        for lang in Language::iter() {
            assert_eq!(keys(lang), english, "{} is missing keys", lang.as_ref());
        }
    }

    #[test]
    fn language_codes() {
        assert_eq!(Language::parse("SI"), Some(Language::Si));
        assert_eq!(Language::parse("en"), Some(Language::En));
        assert_eq!(Language::parse("ta"), None);
    }
}

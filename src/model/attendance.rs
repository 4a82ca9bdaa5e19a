use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Wire format for every timestamp the API returns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One shift as stored in the `attendance` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub id: u64,
    pub emp_no: String,
    pub name: String,
    pub company_name: String,
    pub date: NaiveDate,
    pub checkin_time: NaiveDateTime,
    pub scheduled_checkout: NaiveDateTime,
    pub checkout_time: Option<NaiveDateTime>,
    pub total_hours: Option<f64>,
    pub status: String,
    pub marked_by: String,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.checkout_time.is_none()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, Display, AsRefStr, ToSchema)]
pub enum AttendanceStatus {
    Active,
    Completed,
}

impl AttendanceStatus {
    /// The IN/OUT code the marking screen shows.
    pub fn punch(&self) -> &'static str {
        match self {
            AttendanceStatus::Active => "IN",
            AttendanceStatus::Completed => "OUT",
        }
    }
}

pub fn scheduled_checkout(checkin: NaiveDateTime, shift_hours: u32) -> NaiveDateTime {
    checkin + Duration::hours(shift_hours as i64)
}

/// Elapsed hours between check-in and check-out, clamped to `[0, cap_hours]`
/// and rounded to two decimals.
pub fn worked_hours(checkin: NaiveDateTime, checkout: NaiveDateTime, cap_hours: u32) -> f64 {
    let seconds = (checkout - checkin).num_seconds().max(0) as f64;
    let hours = (seconds / 3600.0).min(cap_hours as f64);
    (hours * 100.0).round() / 100.0
}

/// Parses `HH:MM:SS` or `HH:MM`.
pub fn parse_wall_clock(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShiftWindow {
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub total_hours: Option<f64>,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ShiftEditError {
    #[display(fmt = "Invalid shift_start_time '{}', expected HH:MM:SS", _0)]
    InvalidStart(String),
    #[display(fmt = "Invalid shift_end_time '{}', expected HH:MM:SS", _0)]
    InvalidEnd(String),
    #[display(fmt = "Shift end time must differ from shift start time")]
    ZeroLength,
}

/// Turns wall-clock times picked for a record's date into a concrete shift.
///
/// An end earlier than the start means the shift crossed midnight, so the
/// end moves to the following day. A missing end keeps the shift open.
pub fn reconcile_shift_edit(
    date: NaiveDate,
    start: &str,
    end: Option<&str>,
    cap_hours: u32,
) -> Result<ShiftWindow, ShiftEditError> {
    let start_time =
        parse_wall_clock(start).ok_or_else(|| ShiftEditError::InvalidStart(start.to_string()))?;
    let start = date.and_time(start_time);

    let end = match end.map(str::trim).filter(|e| !e.is_empty()) {
        None => None,
        Some(raw) => {
            let end_time =
                parse_wall_clock(raw).ok_or_else(|| ShiftEditError::InvalidEnd(raw.to_string()))?;
            if end_time == start_time {
                return Err(ShiftEditError::ZeroLength);
            }
            let mut end = date.and_time(end_time);
            if end < start {
                end += Duration::days(1);
            }
            Some(end)
        }
    };

    Ok(match end {
        Some(end) => ShiftWindow {
            date,
            start,
            end: Some(end),
            total_hours: Some(worked_hours(start, end, cap_hours)),
            status: AttendanceStatus::Completed,
        },
        None => ShiftWindow {
            date,
            start,
            end: None,
            total_hours: None,
            status: AttendanceStatus::Active,
        },
    })
}

/// What the marking screen may offer, derived from today's latest shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayStatus {
    pub can_checkin: bool,
    pub can_checkout: bool,
}

impl DayStatus {
    pub fn from_latest(latest: Option<&AttendanceRecord>) -> Self {
        match latest {
            Some(record) if record.is_open() => DayStatus {
                can_checkin: false,
                can_checkout: true,
            },
            _ => DayStatus {
                can_checkin: true,
                can_checkout: false,
            },
        }
    }
}

pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

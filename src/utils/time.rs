//! Time utilities: parsing civil timestamps, DB (de)serialization, minute truncation.

use crate::errors::{AppError, AppResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Storage format for every timestamp column.
pub const DB_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t, "%H:%M").ok()
}

/// Accepts `YYYY-MM-DD HH:MM`, `YYYY-MM-DD HH:MM:SS` and the `T` separated variants.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

pub fn require_datetime(s: &str) -> AppResult<NaiveDateTime> {
    parse_datetime(s).ok_or_else(|| AppError::InvalidTime(s.to_string()))
}

/// A clock time on a given day (`HH:MM` relative to `date`).
pub fn on_date(date: NaiveDate, hhmm: &str) -> AppResult<NaiveDateTime> {
    parse_time(hhmm)
        .map(|t| date.and_time(t))
        .ok_or_else(|| AppError::InvalidTime(hhmm.to_string()))
}

pub fn to_db(ts: &NaiveDateTime) -> String {
    ts.format(DB_TS_FORMAT).to_string()
}

pub fn from_db(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DB_TS_FORMAT).ok()
}

pub fn hhmm(ts: &NaiveDateTime) -> String {
    ts.format("%H:%M").to_string()
}

pub fn display(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// Drops seconds and sub-seconds.
pub fn truncate_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

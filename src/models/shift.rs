use super::geo::GeoCapture;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftState {
    NotStarted,
    InProgress,
    OnBreak,
    Finished,
}

impl ShiftState {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ShiftState::NotStarted => "not_started",
            ShiftState::InProgress => "in_progress",
            ShiftState::OnBreak => "on_break",
            ShiftState::Finished => "finished",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(ShiftState::NotStarted),
            "in_progress" => Some(ShiftState::InProgress),
            "on_break" => Some(ShiftState::OnBreak),
            "finished" => Some(ShiftState::Finished),
            _ => None,
        }
    }

    /// Edges of the attendance state machine.
    ///
    /// `NotStarted → OnBreak` only happens through a cross-shift transfer,
    /// which writes the state directly.
    pub fn can_advance_to(&self, next: ShiftState) -> bool {
        use ShiftState::*;
        matches!(
            (self, next),
            (NotStarted, InProgress)
                | (InProgress, OnBreak)
                | (OnBreak, InProgress)
                | (InProgress, Finished)
                | (OnBreak, Finished)
        )
    }
}

impl fmt::Display for ShiftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ShiftState::NotStarted => "NOT_STARTED",
            ShiftState::InProgress => "IN_PROGRESS",
            ShiftState::OnBreak => "ON_BREAK",
            ShiftState::Finished => "FINISHED",
        };
        f.write_str(label)
    }
}

/// One planned work interval for one employee's contract.
#[derive(Debug, Clone, Serialize)]
pub struct Shift {
    pub id: i64,
    pub employee_id: i64,
    pub contract_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub break_window_start: Option<NaiveDateTime>,
    pub break_window_end: Option<NaiveDateTime>,
    pub state: ShiftState,
    pub clock_in_at: Option<NaiveDateTime>,
    pub clock_in_geo: GeoCapture,
    pub clock_out_at: Option<NaiveDateTime>,
    pub clock_out_geo: GeoCapture,
}

impl Shift {
    /// A not-yet-persisted shift (`id = 0`) in NOT_STARTED.
    pub fn planned(
        employee_id: i64,
        contract_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: 0,
            employee_id,
            contract_id,
            start,
            end,
            break_window_start: None,
            break_window_end: None,
            state: ShiftState::NotStarted,
            clock_in_at: None,
            clock_in_geo: GeoCapture::default(),
            clock_out_at: None,
            clock_out_geo: GeoCapture::default(),
        }
    }

    pub fn with_break_window(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.break_window_start = Some(start);
        self.break_window_end = Some(end);
        self
    }

    pub fn has_break_window(&self) -> bool {
        self.break_window_start.is_some() && self.break_window_end.is_some()
    }

    /// Allowed duration of the mandatory break (zero when no window is configured).
    pub fn break_allowance(&self) -> Duration {
        match (self.break_window_start, self.break_window_end) {
            (Some(s), Some(e)) if e > s => e - s,
            _ => Duration::zero(),
        }
    }
}

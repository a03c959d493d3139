use super::break_record::BreakKind;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Notifications emitted after an attendance transaction commits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    ShiftStarted {
        shift_id: i64,
        employee_id: i64,
        at: NaiveDateTime,
    },
    ShiftFinished {
        shift_id: i64,
        employee_id: i64,
        at: NaiveDateTime,
        next_shift_id: Option<i64>,
    },
    BreakStarted {
        shift_id: i64,
        break_id: i64,
        kind: BreakKind,
        at: NaiveDateTime,
    },
    BreakEnded {
        shift_id: i64,
        break_id: i64,
        kind: BreakKind,
        at: NaiveDateTime,
        overflow_break_id: Option<i64>,
    },
    BreakTransferred {
        from_shift_id: i64,
        to_shift_id: i64,
        closed_break_id: i64,
        opened_break_id: i64,
        overflow_break_id: Option<i64>,
        at: NaiveDateTime,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::ShiftStarted { .. } => "shift_started",
            DomainEvent::ShiftFinished { .. } => "shift_finished",
            DomainEvent::BreakStarted { .. } => "break_started",
            DomainEvent::BreakEnded { .. } => "break_ended",
            DomainEvent::BreakTransferred { .. } => "break_transferred",
        }
    }

    pub fn shift_id(&self) -> i64 {
        match self {
            DomainEvent::ShiftStarted { shift_id, .. }
            | DomainEvent::ShiftFinished { shift_id, .. }
            | DomainEvent::BreakStarted { shift_id, .. }
            | DomainEvent::BreakEnded { shift_id, .. } => *shift_id,
            DomainEvent::BreakTransferred { from_shift_id, .. } => *from_shift_id,
        }
    }
}

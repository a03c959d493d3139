//! Advisory eligibility checks over an employee's shifts, used to decide
//! which actions to offer. `AttendanceService` re-validates on its own.

use crate::core::breaks::BreakService;
use crate::core::clock::Clock;
use crate::errors::AppResult;
use crate::models::shift::{Shift, ShiftState};
use chrono::Duration;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    pub can_clock_in: bool,
    pub can_take_mandatory_break: bool,
    pub can_take_break: bool,
}

pub struct ValidationService<'a> {
    clock: &'a dyn Clock,
    clock_in_window: Duration,
    breaks: BreakService<'a>,
}

impl<'a> ValidationService<'a> {
    /// `clock_in_window` is the tolerance around shift start; it is kept
    /// separate from (and narrower by default than) the action window.
    pub fn new(clock: &'a dyn Clock, clock_in_window: Duration) -> Self {
        Self {
            clock,
            clock_in_window,
            breaks: BreakService::new(clock),
        }
    }

    /// Some NOT_STARTED shift starts within the clock-in tolerance of now.
    pub fn can_clock_in(&self, shifts: &[Shift]) -> bool {
        let now = self.clock.now();
        shifts.iter().any(|s| {
            s.state == ShiftState::NotStarted
                && now >= s.start - self.clock_in_window
                && now <= s.start + self.clock_in_window
        })
    }

    pub fn can_take_mandatory_break(&self, conn: &Connection, shifts: &[Shift]) -> AppResult<bool> {
        for shift in shifts {
            if self.breaks.can_take_mandatory(conn, shift)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn can_take_break(&self, conn: &Connection, shifts: &[Shift]) -> AppResult<bool> {
        for shift in shifts {
            if self.breaks.can_take_any(conn, shift)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn evaluate(&self, conn: &Connection, shifts: &[Shift]) -> AppResult<Eligibility> {
        Ok(Eligibility {
            can_clock_in: self.can_clock_in(shifts),
            can_take_mandatory_break: self.can_take_mandatory_break(conn, shifts)?,
            can_take_break: self.can_take_break(conn, shifts)?,
        })
    }
}

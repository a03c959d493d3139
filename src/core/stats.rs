//! Read-only elapsed/remaining accounting for a shift.

use crate::core::clock::Clock;
use crate::db::queries::load_breaks_for_shift;
use crate::errors::AppResult;
use crate::models::break_record::{Break, BreakKind};
use crate::models::shift::{Shift, ShiftState};
use chrono::{Duration, NaiveDateTime};
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShiftStats {
    pub total_seconds: i64,
    pub remaining_seconds: i64,
    pub break_seconds: i64,
}

pub struct StatsService<'a> {
    clock: &'a dyn Clock,
}

impl<'a> StatsService<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self { clock }
    }

    /// Planned length minus the part of the break window already elapsed.
    pub fn total_seconds(&self, shift: &Shift) -> i64 {
        let planned = (shift.end - shift.start).abs();
        let (elapsed, _) = split_break_window(shift, self.clock.now());
        (planned - elapsed).num_seconds()
    }

    pub fn remaining_seconds(&self, conn: &Connection, shift: &Shift) -> AppResult<i64> {
        let breaks = load_breaks_for_shift(conn, shift.id)?;
        Ok(self.remaining_with(shift, &breaks))
    }

    pub fn break_seconds(&self, conn: &Connection, shift: &Shift) -> AppResult<i64> {
        let breaks = load_breaks_for_shift(conn, shift.id)?;
        Ok(closed_seconds(&breaks, None))
    }

    pub fn stats(&self, conn: &Connection, shift: &Shift) -> AppResult<ShiftStats> {
        let breaks = load_breaks_for_shift(conn, shift.id)?;
        Ok(ShiftStats {
            total_seconds: self.total_seconds(shift),
            remaining_seconds: self.remaining_with(shift, &breaks),
            break_seconds: closed_seconds(&breaks, None),
        })
    }

    fn remaining_with(&self, shift: &Shift, breaks: &[Break]) -> i64 {
        let now = self.clock.now();
        let total = self.total_seconds(shift);

        if shift.state == ShiftState::NotStarted || now > shift.end {
            return total;
        }

        if let Some(out) = shift.clock_out_at {
            let clock_in = shift.clock_in_at.unwrap_or(shift.start);
            return (total - (out - clock_in).abs().num_seconds()).max(0);
        }

        let (_, pending) = split_break_window(shift, now);
        let additional = closed_seconds(breaks, Some(BreakKind::Additional));

        ((shift.end - now).abs() - pending).num_seconds().saturating_sub(additional).max(0)
    }
}

/// (elapsed, pending) parts of the mandatory break window relative to `now`.
fn split_break_window(shift: &Shift, now: NaiveDateTime) -> (Duration, Duration) {
    match (shift.break_window_start, shift.break_window_end) {
        (Some(ws), Some(we)) if we > ws => {
            let cut = now.clamp(ws, we);
            (cut - ws, we - cut)
        }
        _ => (Duration::zero(), Duration::zero()),
    }
}

/// Sum of closed break durations, optionally of one kind only.
fn closed_seconds(breaks: &[Break], kind: Option<BreakKind>) -> i64 {
    breaks
        .iter()
        .filter(|b| kind.is_none_or(|k| b.kind == k))
        .filter_map(|b| b.duration())
        .map(|d| d.num_seconds())
        .sum()
}

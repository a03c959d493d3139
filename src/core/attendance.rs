//! Attendance state machine: the authoritative entry point for every
//! clock-in, clock-out and break action on a shift.
//!
//! ```text
//! NOT_STARTED → IN_PROGRESS ⇄ ON_BREAK
//!                    ↓           ↓
//!                 FINISHED ←─────┘   (finishing on break ends the break first)
//! ```
//!
//! Every action runs inside one SQLite transaction: a rejected action leaves
//! no trace. Domain events are published only after the commit.

use crate::core::breaks::BreakService;
use crate::core::clock::Clock;
use crate::core::events::{EventSink, publish};
use crate::core::scheduler::TransitionScheduler;
use crate::core::transition::ShiftTransitionService;
use crate::db::jobs::TransitionPayload;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{load_shift, save_shift};
use crate::errors::{AppError, AppResult};
use crate::models::action::Action;
use crate::models::break_record::BreakKind;
use crate::models::events::DomainEvent;
use crate::models::geo::GeoCapture;
use crate::models::shift::{Shift, ShiftState};
use crate::utils::time::display;
use chrono::{Duration, NaiveDateTime};
use rusqlite::Connection;

/// Result of `execute_action`.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub shift: Shift,
    /// Consecutive shift of the same employee, reported on `finish`.
    pub next_shift: Option<Shift>,
}

pub struct AttendanceService<'a> {
    clock: &'a dyn Clock,
    action_window: Duration,
    scheduler: &'a dyn TransitionScheduler,
    events: &'a dyn EventSink,
    breaks: BreakService<'a>,
    transitions: ShiftTransitionService<'a>,
}

impl<'a> AttendanceService<'a> {
    pub fn new(
        clock: &'a dyn Clock,
        action_window: Duration,
        scheduler: &'a dyn TransitionScheduler,
        events: &'a dyn EventSink,
    ) -> Self {
        Self {
            clock,
            action_window,
            scheduler,
            events,
            breaks: BreakService::new(clock),
            transitions: ShiftTransitionService::new(clock, events),
        }
    }

    /// Validate, apply and persist `action` on shift `shift_id`.
    pub fn execute_action(
        &self,
        pool: &mut DbPool,
        action: Action,
        shift_id: i64,
        geo: Option<&GeoCapture>,
    ) -> AppResult<ActionOutcome> {
        let (outcome, events) = pool.with_transaction(|tx| {
            let mut shift = load_shift(tx, shift_id)?;
            let now = self.clock.now();
            self.check_window(&shift, now)?;

            let mut events = Vec::new();
            let next_shift = match action {
                Action::Start => {
                    self.start(tx, &mut shift, now, geo, &mut events)?;
                    None
                }
                Action::Finish => self.finish(tx, &mut shift, now, geo, &mut events)?,
                Action::StartBreak(kind) => {
                    self.start_break(tx, &mut shift, kind, geo, &mut events)?;
                    None
                }
                Action::EndBreak => {
                    self.end_break(tx, &mut shift, geo, &mut events)?;
                    None
                }
            };

            ttlog(
                tx,
                action.as_str(),
                &format!("shift {}", shift.id),
                &format!(
                    "Employee {} → {} at {}",
                    shift.employee_id,
                    shift.state,
                    display(&now)
                ),
            )?;

            Ok((ActionOutcome { shift, next_shift }, events))
        })?;

        publish(self.events, &events);
        Ok(outcome)
    }

    /// Actions are accepted in `[start − window, end + window]`.
    pub fn check_window(&self, shift: &Shift, now: NaiveDateTime) -> AppResult<()> {
        let opens_at = shift.start - self.action_window;
        let closes_at = shift.end + self.action_window;

        if now < opens_at {
            return Err(AppError::TooEarly {
                opens_at: display(&opens_at),
            });
        }
        if now > closes_at {
            return Err(AppError::TooLate {
                closed_at: display(&closes_at),
            });
        }
        Ok(())
    }

    fn start(
        &self,
        conn: &Connection,
        shift: &mut Shift,
        now: NaiveDateTime,
        geo: Option<&GeoCapture>,
        events: &mut Vec<DomainEvent>,
    ) -> AppResult<()> {
        if shift.state != ShiftState::NotStarted {
            return Err(AppError::invalid_transition("clock in", shift.state));
        }
        let geo = geo
            .filter(|g| g.has_position())
            .ok_or_else(|| AppError::MissingGeolocation("clock in".into()))?;

        shift.clock_in_at = Some(now);
        shift.clock_in_geo = geo.clone();
        shift.state = ShiftState::InProgress;
        save_shift(conn, shift)?;

        if let Some(next) = self.transitions.find_next(conn, shift)? {
            self.scheduler.enqueue_at(
                conn,
                now,
                shift.end,
                TransitionPayload {
                    current_shift_id: shift.id,
                    next_shift_id: next.id,
                },
            )?;
        }

        events.push(DomainEvent::ShiftStarted {
            shift_id: shift.id,
            employee_id: shift.employee_id,
            at: now,
        });
        Ok(())
    }

    fn finish(
        &self,
        conn: &Connection,
        shift: &mut Shift,
        now: NaiveDateTime,
        geo: Option<&GeoCapture>,
        events: &mut Vec<DomainEvent>,
    ) -> AppResult<Option<Shift>> {
        if !shift.state.can_advance_to(ShiftState::Finished) {
            return Err(AppError::invalid_transition("clock out", shift.state));
        }

        if shift.state == ShiftState::OnBreak {
            let successor = if now >= shift.end {
                self.transitions.find_next(conn, shift)?
            } else {
                None
            };
            let active = self.breaks.active_break(conn, shift)?;

            match (successor, active) {
                // Boundary reached: the break continues on the next shift.
                (Some(mut next), Some(active))
                    if ShiftTransitionService::can_transfer(shift, &next, Some(&active)) =>
                {
                    let moved = self.transitions.transfer_in(conn, shift, &mut next, active)?;
                    events.push(moved.event());
                }
                _ => self.end_break(conn, shift, geo, events)?,
            }
        }

        shift.clock_out_at = Some(match shift.clock_in_at {
            Some(clock_in) => now.max(clock_in),
            None => now,
        });
        shift.clock_out_geo = geo.cloned().unwrap_or_default();
        shift.state = ShiftState::Finished;
        save_shift(conn, shift)?;

        let next = self.transitions.find_consecutive(conn, shift)?;

        events.push(DomainEvent::ShiftFinished {
            shift_id: shift.id,
            employee_id: shift.employee_id,
            at: now,
            next_shift_id: next.as_ref().map(|s| s.id),
        });
        Ok(next)
    }

    fn start_break(
        &self,
        conn: &Connection,
        shift: &mut Shift,
        kind: BreakKind,
        geo: Option<&GeoCapture>,
        events: &mut Vec<DomainEvent>,
    ) -> AppResult<()> {
        let geo = geo.cloned().unwrap_or_default();
        let br = self.breaks.start(conn, shift, kind, &geo)?;

        events.push(DomainEvent::BreakStarted {
            shift_id: shift.id,
            break_id: br.id,
            kind,
            at: br.start,
        });
        Ok(())
    }

    fn end_break(
        &self,
        conn: &Connection,
        shift: &mut Shift,
        geo: Option<&GeoCapture>,
        events: &mut Vec<DomainEvent>,
    ) -> AppResult<()> {
        let closed = self.breaks.close(conn, shift, geo)?;

        events.push(DomainEvent::BreakEnded {
            shift_id: shift.id,
            break_id: closed.closed.id,
            kind: closed.closed.kind,
            at: closed
                .overflow
                .as_ref()
                .and_then(|b| b.end)
                .or(closed.closed.end)
                .unwrap_or(closed.closed.start),
            overflow_break_id: closed.overflow.as_ref().map(|b| b.id),
        });
        Ok(())
    }
}

//! Hand-off of an open break across the boundary of two back-to-back shifts.

use crate::core::breaks::split_overflow;
use crate::core::clock::Clock;
use crate::core::events::{EventSink, publish};
use crate::db::jobs::{TransitionJob, TransitionPayload, load_due_jobs, mark_done};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{
    find_shift, find_shift_starting_at, insert_break, load_open_break, save_break, save_shift,
};
use crate::errors::{AppError, AppResult};
use crate::models::break_record::Break;
use crate::models::events::DomainEvent;
use crate::models::shift::{Shift, ShiftState};
use crate::ui::messages::warning;
use crate::utils::time::{display, truncate_to_minute};
use rusqlite::Connection;
use std::fmt;

#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub current: Shift,
    pub next: Shift,
    pub closed: Break,
    /// ADDITIONAL break for the part of a mandatory break over the current
    /// shift's allowance.
    pub overflow: Option<Break>,
    pub opened: Break,
}

impl TransferOutcome {
    pub(crate) fn event(&self) -> DomainEvent {
        DomainEvent::BreakTransferred {
            from_shift_id: self.current.id,
            to_shift_id: self.next.id,
            closed_break_id: self.closed.id,
            opened_break_id: self.opened.id,
            overflow_break_id: self.overflow.as_ref().map(|b| b.id),
            at: self.opened.start,
        }
    }
}

/// What the deferred handler did with a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Transferred {
        closed_break_id: i64,
        opened_break_id: i64,
    },
    Skipped(String),
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Transferred {
                closed_break_id,
                opened_break_id,
            } => write!(
                f,
                "transferred break #{} → #{}",
                closed_break_id, opened_break_id
            ),
            JobOutcome::Skipped(reason) => write!(f, "skipped: {}", reason),
        }
    }
}

pub struct ShiftTransitionService<'a> {
    clock: &'a dyn Clock,
    events: &'a dyn EventSink,
}

impl<'a> ShiftTransitionService<'a> {
    pub fn new(clock: &'a dyn Clock, events: &'a dyn EventSink) -> Self {
        Self { clock, events }
    }

    /// `a` ends in the same minute `b` starts.
    pub fn are_consecutive(a: &Shift, b: &Shift) -> bool {
        truncate_to_minute(a.end) == truncate_to_minute(b.start)
    }

    /// Every precondition of `transfer_in` holds.
    pub fn can_transfer(current: &Shift, next: &Shift, active: Option<&Break>) -> bool {
        transfer_blocker(current, next, active).is_none()
    }

    /// NOT_STARTED shift of the same employee starting when `shift` ends.
    pub fn find_next(&self, conn: &Connection, shift: &Shift) -> AppResult<Option<Shift>> {
        find_shift_starting_at(conn, shift.employee_id, shift.end, Some(ShiftState::NotStarted))
    }

    /// Shift of the same employee starting when `shift` ends, in any state.
    pub fn find_consecutive(&self, conn: &Connection, shift: &Shift) -> AppResult<Option<Shift>> {
        find_shift_starting_at(conn, shift.employee_id, shift.end, None)
    }

    /// Move the open break of `current_id` onto `next_id` in one transaction.
    pub fn transfer(
        &self,
        pool: &mut DbPool,
        current_id: i64,
        next_id: i64,
    ) -> AppResult<TransferOutcome> {
        let outcome = pool.with_transaction(|tx| {
            let mut current = find_shift(tx, current_id)?
                .ok_or_else(|| AppError::shift_not_found(current_id))?;
            let mut next =
                find_shift(tx, next_id)?.ok_or_else(|| AppError::shift_not_found(next_id))?;
            let active =
                load_open_break(tx, current.id)?.ok_or(AppError::NoActiveBreak(current.id))?;

            let outcome = self.transfer_in(tx, &mut current, &mut next, active)?;
            ttlog(
                tx,
                "transfer",
                &format!("shift {}", current.id),
                &format!("Break #{} carried over to shift {}", outcome.closed.id, next.id),
            )?;
            Ok(outcome)
        })?;

        publish(self.events, &[outcome.event()]);
        Ok(outcome)
    }

    /// Transfer on the caller's transaction. Writes nothing unless every
    /// precondition holds.
    pub fn transfer_in(
        &self,
        conn: &Connection,
        current: &mut Shift,
        next: &mut Shift,
        mut active: Break,
    ) -> AppResult<TransferOutcome> {
        if let Some(reason) = transfer_blocker(current, next, Some(&active)) {
            return Err(AppError::invalid_transition(
                format!("transfer break to shift {} ({})", next.id, reason),
                current.state,
            ));
        }

        let boundary = current.end;

        active.end = Some(boundary);
        active.append_observation(&format!(
            "Transferred to shift {} at {}",
            next.id,
            display(&boundary)
        ));
        save_break(conn, &active)?;
        let overflow = split_overflow(conn, current, &mut active)?;

        let mut opened = Break::open(next.id, active.kind, boundary, active.start_geo.clone());
        opened.observation = format!("Continues break #{} from shift {}", active.id, current.id);
        opened.id = insert_break(conn, &opened)?;

        current.state = ShiftState::Finished;
        if current.clock_out_at.is_none() {
            current.clock_out_at = Some(boundary);
        }
        save_shift(conn, current)?;

        next.state = ShiftState::OnBreak;
        if next.clock_in_at.is_none() {
            next.clock_in_at = Some(boundary);
            next.clock_in_geo = active.start_geo.clone();
        }
        save_shift(conn, next)?;

        Ok(TransferOutcome {
            current: current.clone(),
            next: next.clone(),
            closed: active,
            overflow,
            opened,
        })
    }

    /// Deferred handler: re-reads both shifts and only transfers when the
    /// state still calls for it. Running it again after success is a no-op.
    pub fn handle_job(&self, pool: &mut DbPool, payload: TransitionPayload) -> AppResult<JobOutcome> {
        let (outcome, events) = pool.with_transaction(|tx| self.handle_job_in(tx, payload))?;
        publish(self.events, &events);
        Ok(outcome)
    }

    fn handle_job_in(
        &self,
        conn: &Connection,
        payload: TransitionPayload,
    ) -> AppResult<(JobOutcome, Vec<DomainEvent>)> {
        let skip = |reason: String| -> AppResult<(JobOutcome, Vec<DomainEvent>)> {
            Ok((JobOutcome::Skipped(reason), Vec::new()))
        };

        let Some(mut current) = find_shift(conn, payload.current_shift_id)? else {
            return skip(format!("shift {} no longer exists", payload.current_shift_id));
        };
        let Some(mut next) = find_shift(conn, payload.next_shift_id)? else {
            return skip(format!("shift {} no longer exists", payload.next_shift_id));
        };
        let active = load_open_break(conn, current.id)?;

        if let Some(reason) = transfer_blocker(&current, &next, active.as_ref()) {
            return skip(reason);
        }
        let Some(active) = active else {
            return skip(format!("shift {} has no open break", current.id));
        };

        let outcome = self.transfer_in(conn, &mut current, &mut next, active)?;
        ttlog(
            conn,
            "transition",
            &format!("shift {}", current.id),
            &format!(
                "Deferred transition moved break #{} to shift {}",
                outcome.closed.id, next.id
            ),
        )?;

        Ok((
            JobOutcome::Transferred {
                closed_break_id: outcome.closed.id,
                opened_break_id: outcome.opened.id,
            },
            vec![outcome.event()],
        ))
    }

    /// Run every pending job due at the current time. A failing job stays
    /// pending and is retried on the next run.
    pub fn run_due(&self, pool: &mut DbPool) -> AppResult<Vec<(TransitionJob, JobOutcome)>> {
        let due = load_due_jobs(&pool.conn, self.clock.now())?;
        let mut results = Vec::with_capacity(due.len());

        for job in due {
            let run = pool.with_transaction(|tx| {
                let (outcome, events) = self.handle_job_in(tx, job.payload)?;
                mark_done(tx, job.id, &outcome.to_string(), self.clock.now())?;
                Ok((outcome, events))
            });

            match run {
                Ok((outcome, events)) => {
                    publish(self.events, &events);
                    results.push((job, outcome));
                }
                Err(e) => warning(format!("Transition job #{} failed: {}", job.id, e)),
            }
        }

        Ok(results)
    }
}

/// Why a transfer between these two shifts must not happen, if anything.
fn transfer_blocker(current: &Shift, next: &Shift, active: Option<&Break>) -> Option<String> {
    if current.state != ShiftState::OnBreak {
        return Some(format!("shift {} is {}", current.id, current.state));
    }
    if next.state != ShiftState::NotStarted {
        return Some(format!("shift {} is {}", next.id, next.state));
    }
    if current.employee_id != next.employee_id {
        return Some("shifts belong to different employees".to_string());
    }
    if !ShiftTransitionService::are_consecutive(current, next) {
        return Some(format!(
            "shift {} does not start when shift {} ends",
            next.id, current.id
        ));
    }
    match active {
        None => Some(format!("shift {} has no open break", current.id)),
        Some(br) if br.shift_id != current.id || !br.is_open() => {
            Some(format!("break #{} is not open on shift {}", br.id, current.id))
        }
        Some(br) if br.start > current.end => Some(format!(
            "break #{} started after shift {} ended",
            br.id, current.id
        )),
        Some(_) => None,
    }
}

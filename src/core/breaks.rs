//! Break lifecycle: opening, closing, and splitting an overlong mandatory
//! break into an additional one.

use crate::core::clock::Clock;
use crate::db::queries::{
    count_closed_mandatory_breaks_on, insert_break, load_open_break, save_break, save_shift,
};
use crate::errors::{AppError, AppResult};
use crate::models::break_record::{Break, BreakKind};
use crate::models::geo::GeoCapture;
use crate::models::shift::{Shift, ShiftState};
use rusqlite::Connection;

/// Result of closing a break.
#[derive(Debug, Clone)]
pub struct ClosedBreak {
    pub closed: Break,
    /// Additional break created for the part of a mandatory break over its allowance.
    pub overflow: Option<Break>,
}

pub struct BreakService<'a> {
    clock: &'a dyn Clock,
}

impl<'a> BreakService<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self { clock }
    }

    /// Open a break on an IN_PROGRESS shift and move it to ON_BREAK.
    pub fn start(
        &self,
        conn: &Connection,
        shift: &mut Shift,
        kind: BreakKind,
        geo: &GeoCapture,
    ) -> AppResult<Break> {
        let action = format!("start a {} break", kind);

        if shift.state != ShiftState::InProgress {
            return Err(AppError::invalid_transition(action, shift.state));
        }
        if !geo.has_position() {
            return Err(AppError::MissingGeolocation(action));
        }
        if !self.can_take_any(conn, shift)? {
            return Err(AppError::invalid_transition(
                format!("{action} (another break is still open)"),
                shift.state,
            ));
        }
        if kind == BreakKind::Mandatory && !self.can_take_mandatory(conn, shift)? {
            return Err(AppError::invalid_transition(
                format!("{action} (no break window configured or already taken today)"),
                shift.state,
            ));
        }

        let mut br = Break::open(shift.id, kind, self.clock.now(), geo.clone());
        br.id = insert_break(conn, &br)?;

        shift.state = ShiftState::OnBreak;
        save_shift(conn, shift)?;

        Ok(br)
    }

    /// Close the most recent open break and move the shift back to IN_PROGRESS.
    pub fn close(
        &self,
        conn: &Connection,
        shift: &mut Shift,
        geo: Option<&GeoCapture>,
    ) -> AppResult<ClosedBreak> {
        let mut br = self
            .active_break(conn, shift)?
            .ok_or(AppError::NoActiveBreak(shift.id))?;

        if shift.state != ShiftState::OnBreak {
            return Err(AppError::invalid_transition("end a break", shift.state));
        }

        let now = self.clock.now();
        br.end = Some(now.max(br.start));
        br.end_geo = geo.cloned().unwrap_or_default();
        save_break(conn, &br)?;

        let overflow = if br.kind == BreakKind::Mandatory {
            self.handle_overflow(conn, shift, &mut br)?
        } else {
            None
        };

        shift.state = ShiftState::InProgress;
        save_shift(conn, shift)?;

        Ok(ClosedBreak {
            closed: br,
            overflow,
        })
    }

    /// Clip a closed mandatory break to the shift's allowance and move the
    /// excess into a new ADDITIONAL break carrying it as owed minutes.
    pub fn handle_overflow(
        &self,
        conn: &Connection,
        shift: &Shift,
        br: &mut Break,
    ) -> AppResult<Option<Break>> {
        split_overflow(conn, shift, br)
    }

    pub fn active_break(&self, conn: &Connection, shift: &Shift) -> AppResult<Option<Break>> {
        load_open_break(conn, shift.id)
    }

    /// IN_PROGRESS, break window configured, and no mandatory break closed
    /// by the employee today.
    pub fn can_take_mandatory(&self, conn: &Connection, shift: &Shift) -> AppResult<bool> {
        if shift.state != ShiftState::InProgress || !shift.has_break_window() {
            return Ok(false);
        }
        let today = self.clock.now().date();
        Ok(count_closed_mandatory_breaks_on(conn, shift.employee_id, &today)? == 0)
    }

    /// IN_PROGRESS and no open break.
    pub fn can_take_any(&self, conn: &Connection, shift: &Shift) -> AppResult<bool> {
        if shift.state != ShiftState::InProgress {
            return Ok(false);
        }
        Ok(self.active_break(conn, shift)?.is_none())
    }
}

/// Overflow split shared by closing a break and carrying it over to the next
/// shift. `br` must already be closed; it is saved when clipped.
pub(crate) fn split_overflow(
    conn: &Connection,
    shift: &Shift,
    br: &mut Break,
) -> AppResult<Option<Break>> {
    if br.kind != BreakKind::Mandatory {
        return Ok(None);
    }
    let Some(original_end) = br.end else {
        return Ok(None);
    };

    let allowance = shift.break_allowance();
    if original_end - br.start <= allowance {
        return Ok(None);
    }

    let clipped_end = br.start + allowance;
    let excess = original_end - clipped_end;

    br.end = Some(clipped_end);
    br.append_observation(&format!(
        "Clipped at {} to the {} min allowance; {} min moved to an additional break",
        clipped_end.format("%H:%M"),
        allowance.num_minutes(),
        excess.num_minutes()
    ));
    save_break(conn, br)?;

    // Same physical break: both sides carry the data captured when it ended.
    let mut extra = Break::open(shift.id, BreakKind::Additional, clipped_end, br.end_geo.clone());
    extra.end = Some(original_end);
    extra.end_geo = br.end_geo.clone();
    extra.owed_minutes = Some(excess.num_minutes());
    extra.observation = format!("Overflow of mandatory break #{}", br.id);
    extra.id = insert_break(conn, &extra)?;

    Ok(Some(extra))
}

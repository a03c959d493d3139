use crate::errors::{AppError, AppResult};
use crate::models::break_record::{Break, BreakKind};
use crate::models::geo::GeoCapture;
use crate::models::shift::{Shift, ShiftState};
use crate::utils::time::{from_db, to_db, truncate_to_minute};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn ts_column(row: &Row, name: &str) -> Result<NaiveDateTime> {
    let raw: String = row.get(name)?;
    from_db(&raw).ok_or_else(|| conversion_error(0, AppError::InvalidTime(raw.clone())))
}

fn opt_ts_column(row: &Row, name: &str) -> Result<Option<NaiveDateTime>> {
    let raw: Option<String> = row.get(name)?;
    match raw {
        Some(s) => from_db(&s)
            .map(Some)
            .ok_or_else(|| conversion_error(0, AppError::InvalidTime(s.clone()))),
        None => Ok(None),
    }
}

fn geo_columns(row: &Row, prefix: &str) -> Result<GeoCapture> {
    Ok(GeoCapture {
        lat: row.get(format!("{prefix}_lat").as_str())?,
        lon: row.get(format!("{prefix}_lon").as_str())?,
        ip: row.get(format!("{prefix}_ip").as_str())?,
        user_agent: row.get(format!("{prefix}_user_agent").as_str())?,
    })
}

fn opt_ts(ts: &Option<NaiveDateTime>) -> Option<String> {
    ts.as_ref().map(to_db)
}

// ---------------------------------------------------------------------------
// Shifts
// ---------------------------------------------------------------------------

pub fn map_shift(row: &Row) -> Result<Shift> {
    let state_str: String = row.get("state")?;
    let state = ShiftState::from_db_str(&state_str).ok_or_else(|| {
        conversion_error(0, AppError::InvalidShift(format!("Invalid state: {}", state_str)))
    })?;

    Ok(Shift {
        id: row.get("id")?,
        employee_id: row.get("employee_id")?,
        contract_id: row.get("contract_id")?,
        start: ts_column(row, "start_at")?,
        end: ts_column(row, "end_at")?,
        break_window_start: opt_ts_column(row, "break_window_start")?,
        break_window_end: opt_ts_column(row, "break_window_end")?,
        state,
        clock_in_at: opt_ts_column(row, "clock_in_at")?,
        clock_in_geo: geo_columns(row, "clock_in")?,
        clock_out_at: opt_ts_column(row, "clock_out_at")?,
        clock_out_geo: geo_columns(row, "clock_out")?,
    })
}

/// Insert a planned shift and return its new id.
pub fn insert_shift(conn: &Connection, shift: &Shift) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO shifts (employee_id, contract_id, start_at, end_at,
                             break_window_start, break_window_end, state)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            shift.employee_id,
            shift.contract_id,
            to_db(&shift.start),
            to_db(&shift.end),
            opt_ts(&shift.break_window_start),
            opt_ts(&shift.break_window_end),
            shift.state.to_db_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Persist the mutable attendance fields of a shift.
pub fn save_shift(conn: &Connection, shift: &Shift) -> AppResult<()> {
    let updated = conn.execute(
        "UPDATE shifts
         SET state = ?1,
             clock_in_at = ?2, clock_in_lat = ?3, clock_in_lon = ?4,
             clock_in_ip = ?5, clock_in_user_agent = ?6,
             clock_out_at = ?7, clock_out_lat = ?8, clock_out_lon = ?9,
             clock_out_ip = ?10, clock_out_user_agent = ?11
         WHERE id = ?12",
        params![
            shift.state.to_db_str(),
            opt_ts(&shift.clock_in_at),
            shift.clock_in_geo.lat,
            shift.clock_in_geo.lon,
            shift.clock_in_geo.ip,
            shift.clock_in_geo.user_agent,
            opt_ts(&shift.clock_out_at),
            shift.clock_out_geo.lat,
            shift.clock_out_geo.lon,
            shift.clock_out_geo.ip,
            shift.clock_out_geo.user_agent,
            shift.id,
        ],
    )?;

    if updated == 0 {
        return Err(AppError::shift_not_found(shift.id));
    }
    Ok(())
}

pub fn find_shift(conn: &Connection, id: i64) -> AppResult<Option<Shift>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM shifts WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_shift).optional()?)
}

pub fn load_shift(conn: &Connection, id: i64) -> AppResult<Shift> {
    find_shift(conn, id)?.ok_or_else(|| AppError::shift_not_found(id))
}

/// Shifts of an employee starting on `date`, ordered by start.
pub fn load_shifts_for_employee_on_date(
    conn: &Connection,
    employee_id: i64,
    date: &NaiveDate,
) -> AppResult<Vec<Shift>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM shifts
         WHERE employee_id = ?1 AND date(start_at) = ?2
         ORDER BY start_at ASC, id ASC",
    )?;

    let rows = stmt.query_map(
        params![employee_id, date.format("%Y-%m-%d").to_string()],
        map_shift,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Shift of `employee_id` whose start falls in the same minute as `at`,
/// optionally restricted to one state.
pub fn find_shift_starting_at(
    conn: &Connection,
    employee_id: i64,
    at: NaiveDateTime,
    state: Option<ShiftState>,
) -> AppResult<Option<Shift>> {
    let from = truncate_to_minute(at);
    let to = from + Duration::minutes(1);

    let mut stmt = conn.prepare_cached(
        "SELECT * FROM shifts
         WHERE employee_id = ?1
           AND start_at >= ?2 AND start_at < ?3
           AND (?4 IS NULL OR state = ?4)
         ORDER BY start_at ASC, id ASC
         LIMIT 1",
    )?;

    Ok(stmt
        .query_row(
            params![
                employee_id,
                to_db(&from),
                to_db(&to),
                state.map(|s| s.to_db_str())
            ],
            map_shift,
        )
        .optional()?)
}

// ---------------------------------------------------------------------------
// Breaks
// ---------------------------------------------------------------------------

pub fn map_break(row: &Row) -> Result<Break> {
    let kind_str: String = row.get("kind")?;
    let kind = BreakKind::from_db_str(&kind_str).ok_or_else(|| {
        conversion_error(0, AppError::Other(format!("Invalid break kind: {}", kind_str)))
    })?;

    Ok(Break {
        id: row.get("id")?,
        shift_id: row.get("shift_id")?,
        kind,
        start: ts_column(row, "start_at")?,
        end: opt_ts_column(row, "end_at")?,
        start_geo: geo_columns(row, "start")?,
        end_geo: geo_columns(row, "end")?,
        owed_minutes: row.get("owed_minutes")?,
        observation: row.get("observation")?,
    })
}

/// Insert a break and return its new id.
pub fn insert_break(conn: &Connection, br: &Break) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO breaks (shift_id, kind, start_at, end_at,
                             start_lat, start_lon, start_ip, start_user_agent,
                             end_lat, end_lon, end_ip, end_user_agent,
                             owed_minutes, observation)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            br.shift_id,
            br.kind.to_db_str(),
            to_db(&br.start),
            opt_ts(&br.end),
            br.start_geo.lat,
            br.start_geo.lon,
            br.start_geo.ip,
            br.start_geo.user_agent,
            br.end_geo.lat,
            br.end_geo.lon,
            br.end_geo.ip,
            br.end_geo.user_agent,
            br.owed_minutes,
            br.observation,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Persist end-side fields of a break (closing, clipping, observation).
pub fn save_break(conn: &Connection, br: &Break) -> AppResult<()> {
    let updated = conn.execute(
        "UPDATE breaks
         SET end_at = ?1, end_lat = ?2, end_lon = ?3, end_ip = ?4, end_user_agent = ?5,
             owed_minutes = ?6, observation = ?7
         WHERE id = ?8",
        params![
            opt_ts(&br.end),
            br.end_geo.lat,
            br.end_geo.lon,
            br.end_geo.ip,
            br.end_geo.user_agent,
            br.owed_minutes,
            br.observation,
            br.id,
        ],
    )?;

    if updated == 0 {
        return Err(AppError::break_not_found(br.id));
    }
    Ok(())
}

pub fn load_breaks_for_shift(conn: &Connection, shift_id: i64) -> AppResult<Vec<Break>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM breaks WHERE shift_id = ?1 ORDER BY start_at ASC, id ASC",
    )?;
    let rows = stmt.query_map([shift_id], map_break)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Most recent open break of a shift.
pub fn load_open_break(conn: &Connection, shift_id: i64) -> AppResult<Option<Break>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM breaks
         WHERE shift_id = ?1 AND end_at IS NULL
         ORDER BY start_at DESC, id DESC
         LIMIT 1",
    )?;
    Ok(stmt.query_row([shift_id], map_break).optional()?)
}

/// Closed MANDATORY breaks taken by `employee_id` that started on `date`.
pub fn count_closed_mandatory_breaks_on(
    conn: &Connection,
    employee_id: i64,
    date: &NaiveDate,
) -> AppResult<i64> {
    let mut stmt = conn.prepare_cached(
        "SELECT COUNT(*) FROM breaks b
         JOIN shifts s ON s.id = b.shift_id
         WHERE s.employee_id = ?1
           AND b.kind = 'mandatory'
           AND b.end_at IS NOT NULL
           AND date(b.start_at) = ?2",
    )?;
    Ok(stmt.query_row(
        params![employee_id, date.format("%Y-%m-%d").to_string()],
        |row| row.get(0),
    )?)
}

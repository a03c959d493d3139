//! Persistence of deferred cross-shift transition jobs.

use crate::errors::{AppError, AppResult};
use crate::utils::time::{from_db, to_db};
use chrono::NaiveDateTime;
use rusqlite::{Connection, Row, params};
use serde::Serialize;

/// Payload of a deferred transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionPayload {
    pub current_shift_id: i64,
    pub next_shift_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionJob {
    pub id: i64,
    pub run_at: NaiveDateTime,
    pub payload: TransitionPayload,
    pub status: String,
    pub outcome: String,
}

fn map_job(row: &Row) -> rusqlite::Result<TransitionJob> {
    let raw: String = row.get("run_at")?;
    let run_at = from_db(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidTime(raw.clone())),
        )
    })?;

    Ok(TransitionJob {
        id: row.get("id")?,
        run_at,
        payload: TransitionPayload {
            current_shift_id: row.get("current_shift_id")?,
            next_shift_id: row.get("next_shift_id")?,
        },
        status: row.get("status")?,
        outcome: row.get("outcome")?,
    })
}

/// Queue `payload` for `run_at`; `created_at` is the civil time of the enqueuing action.
pub fn insert_job(
    conn: &Connection,
    run_at: NaiveDateTime,
    payload: TransitionPayload,
    created_at: NaiveDateTime,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO transition_jobs (run_at, current_shift_id, next_shift_id, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            to_db(&run_at),
            payload.current_shift_id,
            payload.next_shift_id,
            to_db(&created_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Pending jobs whose `run_at` is not after `now`, oldest first.
pub fn load_due_jobs(conn: &Connection, now: NaiveDateTime) -> AppResult<Vec<TransitionJob>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM transition_jobs
         WHERE status = 'pending' AND run_at <= ?1
         ORDER BY run_at ASC, id ASC",
    )?;
    let rows = stmt.query_map([to_db(&now)], map_job)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_all_jobs(conn: &Connection) -> AppResult<Vec<TransitionJob>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM transition_jobs ORDER BY run_at ASC, id ASC")?;
    let rows = stmt.query_map([], map_job)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn mark_done(
    conn: &Connection,
    id: i64,
    outcome: &str,
    processed_at: NaiveDateTime,
) -> AppResult<()> {
    conn.execute(
        "UPDATE transition_jobs
         SET status = 'done', outcome = ?1, processed_at = ?2
         WHERE id = ?3",
        params![outcome, to_db(&processed_at), id],
    )?;
    Ok(())
}

//! Deferred job scheduler seam for cross-shift transitions.

use crate::db::jobs::{self, TransitionPayload};
use crate::errors::AppResult;
use chrono::NaiveDateTime;
use rusqlite::Connection;

pub trait TransitionScheduler {
    /// Schedule `payload` to be handled at `at`, requested at `now`. Runs on
    /// the caller's connection so the job is only visible if the enqueuing
    /// action commits.
    fn enqueue_at(
        &self,
        conn: &Connection,
        now: NaiveDateTime,
        at: NaiveDateTime,
        payload: TransitionPayload,
    ) -> AppResult<()>;
}

/// Queue stored in the `transition_jobs` table, drained by `transitions --run`.
pub struct SqliteScheduler;

impl TransitionScheduler for SqliteScheduler {
    fn enqueue_at(
        &self,
        conn: &Connection,
        now: NaiveDateTime,
        at: NaiveDateTime,
        payload: TransitionPayload,
    ) -> AppResult<()> {
        jobs::insert_job(conn, at, payload, now)?;
        Ok(())
    }
}

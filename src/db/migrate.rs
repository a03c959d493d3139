use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension};

/// Ensure that the `log` table exists: it also records applied migrations.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Create `shifts` and `breaks`.
fn create_attendance_tables(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS shifts (
            id                     INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id            INTEGER NOT NULL,
            contract_id            INTEGER NOT NULL,
            start_at               TEXT NOT NULL,
            end_at                 TEXT NOT NULL,
            break_window_start     TEXT,
            break_window_end       TEXT,
            state                  TEXT NOT NULL DEFAULT 'not_started'
                                   CHECK(state IN ('not_started','in_progress','on_break','finished')),
            clock_in_at            TEXT,
            clock_in_lat           REAL,
            clock_in_lon           REAL,
            clock_in_ip            TEXT,
            clock_in_user_agent    TEXT,
            clock_out_at           TEXT,
            clock_out_lat          REAL,
            clock_out_lon          REAL,
            clock_out_ip           TEXT,
            clock_out_user_agent   TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_shifts_employee_start ON shifts(employee_id, start_at);

        CREATE TABLE IF NOT EXISTS breaks (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            shift_id          INTEGER NOT NULL REFERENCES shifts(id),
            kind              TEXT NOT NULL CHECK(kind IN ('mandatory','additional')),
            start_at          TEXT NOT NULL,
            end_at            TEXT,
            start_lat         REAL,
            start_lon         REAL,
            start_ip          TEXT,
            start_user_agent  TEXT,
            end_lat           REAL,
            end_lon           REAL,
            end_ip            TEXT,
            end_user_agent    TEXT,
            owed_minutes      INTEGER,
            observation       TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_breaks_shift ON breaks(shift_id, start_at);
        "#,
    )?;
    Ok(())
}

/// Create the deferred cross-shift transition queue.
fn create_transition_jobs_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS transition_jobs (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            run_at            TEXT NOT NULL,
            current_shift_id  INTEGER NOT NULL REFERENCES shifts(id),
            next_shift_id     INTEGER NOT NULL REFERENCES shifts(id),
            status            TEXT NOT NULL DEFAULT 'pending'
                              CHECK(status IN ('pending','done')),
            outcome           TEXT NOT NULL DEFAULT '',
            created_at        TEXT NOT NULL,
            processed_at      TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_transition_jobs_due ON transition_jobs(status, run_at);
        "#,
    )?;
    Ok(())
}

struct Migration {
    version: &'static str,
    message: &'static str,
    apply: fn(&Connection) -> AppResult<()>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250301_0001_create_shifts_and_breaks",
        message: "Created shifts and breaks tables",
        apply: create_attendance_tables,
    },
    Migration {
        version: "20250318_0002_create_transition_jobs",
        message: "Created transition_jobs queue",
        apply: create_transition_jobs_table,
    },
];

/// Public entry point: run all pending migrations.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    ensure_log_table(conn)?;

    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }

        (m.apply)(conn).map_err(|e| AppError::Migration(format!("{}: {}", m.version, e)))?;
        mark_applied(conn, m.version, m.message)?;

        success(format!("Migration applied: {} → {}", m.version, m.message));
    }

    Ok(())
}

/// Versions recorded as applied, oldest first.
pub fn applied_migrations(conn: &Connection) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT target FROM log WHERE operation = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::NaiveDateTime;
use rfichaje::core::attendance::{ActionOutcome, AttendanceService};
use rfichaje::core::clock::FixedClock;
use rfichaje::core::events::ChannelSink;
use rfichaje::core::scheduler::SqliteScheduler;
use rfichaje::core::transition::{JobOutcome, ShiftTransitionService, TransferOutcome};
use rfichaje::db::jobs::{TransitionJob, TransitionPayload};
use rfichaje::db::pool::DbPool;
use rfichaje::db::queries::{insert_shift, load_breaks_for_shift, load_shift};
use rfichaje::errors::AppResult;
use rfichaje::models::action::Action;
use rfichaje::models::break_record::Break;
use rfichaje::models::events::DomainEvent;
use rfichaje::models::geo::GeoCapture;
use rfichaje::models::shift::Shift;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};

pub fn rti() -> Command {
    cargo_bin_cmd!("rfichaje")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rfichaje.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Initialize a DB file through the CLI
pub fn init_test_db(db_path: &str) {
    rti()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// `YYYY-MM-DD HH:MM` → NaiveDateTime
pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").expect("valid test timestamp")
}

/// Position and request data of a phone at the office.
pub fn here() -> GeoCapture {
    GeoCapture::new(40.4168, -3.7038)
        .with_request(Some("10.0.0.7".into()), Some("fichaje-test/1.0".into()))
}

/// In-memory database, pinned clock and a channel collecting events.
pub struct Harness {
    pub pool: DbPool,
    pub clock: FixedClock,
    pub scheduler: SqliteScheduler,
    pub sink: ChannelSink,
    pub rx: Receiver<DomainEvent>,
    pub action_window_minutes: i64,
}

impl Harness {
    pub fn new(now: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            pool: DbPool::in_memory().expect("in-memory db"),
            clock: FixedClock::new(ts(now)),
            scheduler: SqliteScheduler,
            sink: ChannelSink::new(tx),
            rx,
            action_window_minutes: 30,
        }
    }

    pub fn set_now(&self, now: &str) {
        self.clock.set(ts(now));
    }

    /// Plan a NOT_STARTED shift and return its id.
    pub fn plan(
        &mut self,
        employee_id: i64,
        start: &str,
        end: &str,
        window: Option<(&str, &str)>,
    ) -> i64 {
        let mut shift = Shift::planned(employee_id, 1, ts(start), ts(end));
        if let Some((ws, we)) = window {
            shift = shift.with_break_window(ts(ws), ts(we));
        }
        insert_shift(&self.pool.conn, &shift).expect("insert shift")
    }

    pub fn act(&mut self, action: Action, shift_id: i64) -> AppResult<ActionOutcome> {
        let geo = here();
        self.act_with(action, shift_id, Some(&geo))
    }

    pub fn act_with(
        &mut self,
        action: Action,
        shift_id: i64,
        geo: Option<&GeoCapture>,
    ) -> AppResult<ActionOutcome> {
        let service = AttendanceService::new(
            &self.clock,
            chrono::Duration::minutes(self.action_window_minutes),
            &self.scheduler,
            &self.sink,
        );
        service.execute_action(&mut self.pool, action, shift_id, geo)
    }

    pub fn run_due(&mut self) -> AppResult<Vec<(TransitionJob, JobOutcome)>> {
        ShiftTransitionService::new(&self.clock, &self.sink).run_due(&mut self.pool)
    }

    pub fn handle_job(&mut self, current: i64, next: i64) -> AppResult<JobOutcome> {
        ShiftTransitionService::new(&self.clock, &self.sink).handle_job(
            &mut self.pool,
            TransitionPayload {
                current_shift_id: current,
                next_shift_id: next,
            },
        )
    }

    pub fn transfer(&mut self, current: i64, next: i64) -> AppResult<TransferOutcome> {
        ShiftTransitionService::new(&self.clock, &self.sink).transfer(&mut self.pool, current, next)
    }

    pub fn shift(&self, id: i64) -> Shift {
        load_shift(&self.pool.conn, id).expect("load shift")
    }

    pub fn breaks(&self, shift_id: i64) -> Vec<Break> {
        load_breaks_for_shift(&self.pool.conn, shift_id).expect("load breaks")
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.rx.try_iter().collect()
    }

    pub fn count(&self, table: &str) -> i64 {
        self.pool
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .expect("count rows")
    }
}

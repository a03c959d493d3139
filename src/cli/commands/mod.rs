pub mod clock;
pub mod config;
pub mod db;
pub mod eligibility;
pub mod init;
pub mod log;
pub mod plan;
pub mod shifts;
pub mod status;
pub mod transitions;

use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::events::DomainEvent;
use crate::ui::messages::{event, warning};
use std::sync::mpsc::Receiver;

/// Record and print every event published during the command.
/// Failures are reported and never abort the command.
pub(crate) fn drain_events(pool: &DbPool, rx: &Receiver<DomainEvent>) {
    for ev in rx.try_iter() {
        if let Err(e) = record_event(pool, &ev) {
            warning(format!("Failed to record {} event: {}", ev.name(), e));
        }
    }
}

fn record_event(pool: &DbPool, ev: &DomainEvent) -> AppResult<()> {
    let payload = serde_json::to_string(ev)?;
    ttlog(&pool.conn, "event", ev.name(), &payload)?;
    event(format!("{} (shift {})", ev.name(), ev.shift_id()));
    Ok(())
}

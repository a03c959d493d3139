use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::insert_shift;
use crate::errors::{AppError, AppResult};
use crate::models::shift::Shift;
use crate::ui::messages::success;
use crate::utils::time::{display, hhmm, on_date, parse_datetime, require_datetime};

/// Insert a NOT_STARTED shift (stand-in for the scheduling module).
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Plan {
        employee,
        contract,
        start,
        end,
        break_start,
        break_end,
    } = cmd
    {
        let start_at = require_datetime(start)?;
        let day = start_at.date();
        let end_at = match parse_datetime(end) {
            Some(ts) => ts,
            None => on_date(day, end)?,
        };

        if end_at <= start_at {
            return Err(AppError::InvalidShift(format!(
                "end {} must be later than start {}",
                display(&end_at),
                display(&start_at)
            )));
        }

        let mut shift = Shift::planned(*employee, *contract, start_at, end_at);

        if let (Some(bs), Some(be)) = (break_start, break_end) {
            let ws = on_date(day, bs)?;
            let we = on_date(day, be)?;
            if we <= ws || ws < start_at || we > end_at {
                return Err(AppError::InvalidShift(format!(
                    "break window {}-{} must lie inside the shift",
                    bs, be
                )));
            }
            shift = shift.with_break_window(ws, we);
        }

        let mut pool = DbPool::new(&cfg.database)?;
        let id = pool.with_transaction(|tx| {
            let id = insert_shift(tx, &shift)?;
            ttlog(
                tx,
                "plan",
                &format!("shift {}", id),
                &format!(
                    "Employee {} {} → {}",
                    employee,
                    display(&start_at),
                    hhmm(&end_at)
                ),
            )?;
            Ok(id)
        })?;

        success(format!(
            "Planned shift {} for employee {}: {} → {}",
            id,
            employee,
            display(&start_at),
            display(&end_at)
        ));
    }

    Ok(())
}

use super::drain_events;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::clock::Clock;
use crate::core::events::ChannelSink;
use crate::core::transition::{JobOutcome, ShiftTransitionService};
use crate::db::jobs::load_all_jobs;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::time::display;
use std::sync::mpsc;

pub fn handle(cmd: &Commands, cfg: &Config, clock: &dyn Clock) -> AppResult<()> {
    if let Commands::Transitions { run, list } = cmd {
        let mut pool = DbPool::new(&cfg.database)?;

        if *run {
            let (tx, rx) = mpsc::channel();
            let sink = ChannelSink::new(tx);
            let service = ShiftTransitionService::new(clock, &sink);

            let results = service.run_due(&mut pool)?;
            drain_events(&pool, &rx);

            if results.is_empty() {
                info("No transition jobs due.");
            }
            for (job, outcome) in results {
                let line = format!(
                    "Job #{} (shift {} → {}): {}",
                    job.id, job.payload.current_shift_id, job.payload.next_shift_id, outcome
                );
                match outcome {
                    JobOutcome::Transferred { .. } => success(line),
                    JobOutcome::Skipped(_) => info(line),
                }
            }
        }

        if *list {
            for job in load_all_jobs(&pool.conn)? {
                println!(
                    "#{:<4} {}  shift {} → {}  {:<8} {}",
                    job.id,
                    display(&job.run_at),
                    job.payload.current_shift_id,
                    job.payload.next_shift_id,
                    job.status,
                    job.outcome
                );
            }
        }
    }

    Ok(())
}

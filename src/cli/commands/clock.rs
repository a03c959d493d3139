use super::drain_events;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::attendance::AttendanceService;
use crate::core::clock::Clock;
use crate::core::events::ChannelSink;
use crate::core::scheduler::SqliteScheduler;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::action::Action;
use crate::models::geo::GeoCapture;
use crate::ui::messages::{info, success};
use crate::utils::time::display;
use std::sync::mpsc;

pub fn handle(cmd: &Commands, cfg: &Config, clock: &dyn Clock) -> AppResult<()> {
    if let Commands::Clock {
        action,
        shift_id,
        lat,
        lon,
        ip,
        user_agent,
    } = cmd
    {
        let action = Action::from_str_opt(action).ok_or_else(|| {
            AppError::InvalidAction(format!(
                "'{}' (use start, finish, start_break_mandatory, start_break_additional or end_break)",
                action
            ))
        })?;

        let geo = GeoCapture {
            lat: *lat,
            lon: *lon,
            ip: ip.clone(),
            user_agent: user_agent.clone(),
        };
        let geo = if geo.is_empty() { None } else { Some(geo) };

        let mut pool = DbPool::new(&cfg.database)?;
        let (tx, rx) = mpsc::channel();
        let sink = ChannelSink::new(tx);
        let scheduler = SqliteScheduler;
        let service = AttendanceService::new(clock, cfg.action_window(), &scheduler, &sink);

        let outcome = service.execute_action(&mut pool, action, *shift_id, geo.as_ref())?;
        drain_events(&pool, &rx);

        success(format!(
            "{} on shift {} at {}: now {}",
            action,
            outcome.shift.id,
            display(&clock.now()),
            outcome.shift.state
        ));

        if let Some(next) = outcome.next_shift {
            info(format!(
                "Next shift {} starts at {} ({})",
                next.id,
                display(&next.start),
                next.state
            ));
        }
    }

    Ok(())
}

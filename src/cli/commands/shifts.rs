use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::clock::Clock;
use crate::db::pool::DbPool;
use crate::db::queries::load_shifts_for_employee_on_date;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{header, info};
use crate::utils::colors::{RESET, colorize_optional};
use crate::utils::date::{date_str, parse_date};
use crate::utils::formatting::{describe_state, pad_right};
use crate::utils::time::hhmm;

pub fn handle(cmd: &Commands, cfg: &Config, clock: &dyn Clock) -> AppResult<()> {
    if let Commands::Shifts { employee, date } = cmd {
        let day = match date {
            Some(d) => parse_date(d).ok_or_else(|| AppError::InvalidDate(d.to_string()))?,
            None => clock.now().date(),
        };

        let pool = DbPool::new(&cfg.database)?;
        let shifts = load_shifts_for_employee_on_date(&pool.conn, *employee, &day)?;

        header(format!("Employee {} on {}", employee, date_str(&day)));

        if shifts.is_empty() {
            info("No shifts planned.");
            return Ok(());
        }

        println!("  ID   START  END    BREAK        IN     OUT    STATE");
        for s in shifts {
            let window = match (s.break_window_start, s.break_window_end) {
                (Some(ws), Some(we)) => format!("{}-{}", hhmm(&ws), hhmm(&we)),
                _ => "--:--".to_string(),
            };
            let clock_in = s.clock_in_at.map(|t| hhmm(&t)).unwrap_or_else(|| "--:--".into());
            let clock_out = s.clock_out_at.map(|t| hhmm(&t)).unwrap_or_else(|| "--:--".into());
            let (label, color) = describe_state(&s.state.to_string());

            println!(
                "{:>4}   {}  {}  {}  {}  {}  {}{}{}",
                s.id,
                hhmm(&s.start),
                hhmm(&s.end),
                colorize_optional(&pad_right(&window, 11)),
                colorize_optional(&clock_in),
                colorize_optional(&clock_out),
                color,
                label,
                RESET
            );
        }
    }

    Ok(())
}

use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::clock::Clock;
use crate::core::stats::StatsService;
use crate::db::pool::DbPool;
use crate::db::queries::{load_breaks_for_shift, load_shift};
use crate::errors::AppResult;
use crate::ui::messages::header;
use crate::utils::colors::{RESET, color_for_optional_field, color_for_remaining};
use crate::utils::formatting::{bold, describe_state, secs2readable};
use crate::utils::time::{display, hhmm};

pub fn handle(cmd: &Commands, cfg: &Config, clock: &dyn Clock) -> AppResult<()> {
    if let Commands::Status { shift_id, json } = cmd {
        let pool = DbPool::new(&cfg.database)?;
        let shift = load_shift(&pool.conn, *shift_id)?;
        let breaks = load_breaks_for_shift(&pool.conn, shift.id)?;
        let stats = StatsService::new(clock).stats(&pool.conn, &shift)?;

        if *json {
            let doc = serde_json::json!({
                "shift": shift,
                "breaks": breaks,
                "stats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
            return Ok(());
        }

        let (label, color) = describe_state(&shift.state.to_string());
        header(format!("Shift {} (employee {})", shift.id, shift.employee_id));
        println!(
            "{} {} → {}   {}{}{}",
            bold("Planned:"),
            display(&shift.start),
            hhmm(&shift.end),
            color,
            label,
            RESET
        );

        let clock_in = shift.clock_in_at.map(|t| display(&t));
        let clock_out = shift.clock_out_at.map(|t| display(&t));
        println!(
            "{} {}{}{}   {} {}{}{}",
            bold("In:"),
            color_for_optional_field(clock_in.as_deref()),
            clock_in.as_deref().unwrap_or("--:--"),
            RESET,
            bold("Out:"),
            color_for_optional_field(clock_out.as_deref()),
            clock_out.as_deref().unwrap_or("--:--"),
            RESET
        );

        if !breaks.is_empty() {
            println!("\n{}", bold("Breaks:"));
            for b in &breaks {
                let end = b.end.map(|t| hhmm(&t)).unwrap_or_else(|| "open".into());
                let owed = b
                    .owed_minutes
                    .map(|m| format!(" owed {} min", m))
                    .unwrap_or_default();
                println!(
                    "  #{:<4} {:<10} {} → {}{}  {}",
                    b.id,
                    b.kind,
                    hhmm(&b.start),
                    end,
                    owed,
                    b.observation
                );
            }
        }

        println!();
        println!("{} {}", bold("Total:"), secs2readable(stats.total_seconds, false));
        println!(
            "{} {}{}{}",
            bold("Remaining:"),
            color_for_remaining(stats.remaining_seconds),
            secs2readable(stats.remaining_seconds, false),
            RESET
        );
        println!("{} {}", bold("Breaks:"), secs2readable(stats.break_seconds, true));
    }

    Ok(())
}

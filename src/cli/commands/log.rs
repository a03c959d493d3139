use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::load_log;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use ansi_term::Colour;
use regex::Regex;

fn strip_ansi(re: &Regex, s: &str) -> String {
    re.replace_all(s, "").into_owned()
}

/// Color for a log operation
fn color_for_operation(op: &str) -> Colour {
    match op {
        "start" => Colour::Green,
        "finish" => Colour::Blue,
        "start_break_mandatory" | "start_break_additional" => Colour::Yellow,
        "end_break" => Colour::Cyan,
        "transfer" | "transition" => Colour::RGB(255, 153, 51),
        "event" => Colour::Fixed(244),
        "migration_applied" => Colour::Purple,
        _ => Colour::White,
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if matches!(cmd, Commands::Log { print: true }) {
        let pool = DbPool::new(&cfg.database)?;
        let re = Regex::new(r"\x1B\[[0-9;]*[mK]")
            .map_err(|e| crate::errors::AppError::Other(e.to_string()))?;

        for (id, raw_date, operation, target, message) in load_log(&pool.conn)? {
            let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or(raw_date);

            let op_target = if target.is_empty() {
                operation.clone()
            } else {
                format!("{operation} ({target})")
            };

            println!(
                "{:>4}  {}  {:<40}  {}",
                id,
                date,
                color_for_operation(&operation).paint(op_target),
                strip_ansi(&re, &message)
            );
        }
    }

    Ok(())
}

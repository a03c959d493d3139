use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

fn count(pool: &DbPool, sql: &str) -> AppResult<i64> {
    Ok(pool.conn.query_row(sql, [], |row| row.get(0))?)
}

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> AppResult<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) TOTALS
    //
    let shifts = count(pool, "SELECT COUNT(*) FROM shifts")?;
    let breaks = count(pool, "SELECT COUNT(*) FROM breaks")?;
    let open_breaks = count(pool, "SELECT COUNT(*) FROM breaks WHERE end_at IS NULL")?;
    let pending = count(
        pool,
        "SELECT COUNT(*) FROM transition_jobs WHERE status = 'pending'",
    )?;

    println!("{}• Shifts:{} {}{}{}", CYAN, RESET, GREEN, shifts, RESET);
    println!(
        "{}• Breaks:{} {}{}{} ({} open)",
        CYAN, RESET, GREEN, breaks, RESET, open_breaks
    );
    println!("{}• Pending transitions:{} {}", CYAN, RESET, pending);

    //
    // 3) DATE RANGE
    //
    let first: Option<String> = pool
        .conn
        .query_row(
            "SELECT date(start_at) FROM shifts ORDER BY start_at ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    let last: Option<String> = pool
        .conn
        .query_row(
            "SELECT date(start_at) FROM shifts ORDER BY start_at DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    println!("{}• Date range:{}", CYAN, RESET);
    println!(
        "    from: {}",
        first.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );
    println!(
        "    to:   {}",
        last.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );

    println!();
    Ok(())
}

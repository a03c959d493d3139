//! Formatting utilities used for CLI outputs.

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

pub fn pad_right(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}

/// Seconds → `02h 25m` (or `02:25` when `short`).
pub fn secs2readable(secs: i64, short: bool) -> String {
    let mins = secs.abs() / 60;
    let sign = if secs < 0 { "-" } else { "" };
    let hours = mins / 60;
    let minutes = mins % 60;

    if short {
        format!("{}{:02}:{:02}", sign, hours, minutes)
    } else {
        format!("{}{:02}h {:02}m", sign, hours, minutes)
    }
}

/// Label and ANSI color for a shift state code.
pub fn describe_state(code: &str) -> (String, &'static str) {
    match code {
        "NOT_STARTED" => ("Not started".into(), "\x1b[90m"),
        "IN_PROGRESS" => ("In progress".into(), "\x1b[32m"),
        "ON_BREAK" => ("On break".into(), "\x1b[33m"),
        "FINISHED" => ("Finished".into(), "\x1b[34m"),
        other => (other.to_string(), "\x1b[0m"),
    }
}

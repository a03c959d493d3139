use clap::{Parser, Subcommand};

/// Command-line interface definition for rFichaje
/// Shift attendance tracking with SQLite
#[derive(Parser)]
#[command(
    name = "rfichaje",
    version = env!("CARGO_PKG_VERSION"),
    about = "Shift attendance CLI: clock in/out, breaks and cross-shift hand-off on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Pin the clock to a civil time (YYYY-MM-DD HH:MM)
    #[arg(global = true, long = "now", hide = true)]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields with their defaults")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Plan a NOT_STARTED shift for an employee
    Plan {
        #[arg(long)]
        employee: i64,

        #[arg(long)]
        contract: i64,

        /// Shift start (YYYY-MM-DD HH:MM)
        #[arg(long)]
        start: String,

        /// Shift end (YYYY-MM-DD HH:MM, or HH:MM on the start date)
        #[arg(long)]
        end: String,

        /// Mandatory break window start (HH:MM on the start date)
        #[arg(long = "break-start", requires = "break_end")]
        break_start: Option<String>,

        /// Mandatory break window end (HH:MM on the start date)
        #[arg(long = "break-end", requires = "break_start")]
        break_end: Option<String>,
    },

    /// List an employee's shifts for a day
    Shifts {
        #[arg(long)]
        employee: i64,

        /// Day to list (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Run an attendance action on a shift
    Clock {
        /// start | finish | start_break_mandatory | start_break_additional | end_break
        action: String,

        shift_id: i64,

        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,

        #[arg(long)]
        ip: Option<String>,

        #[arg(long = "ua")]
        user_agent: Option<String>,
    },

    /// Show a shift with its breaks and time accounting
    Status {
        shift_id: i64,

        #[arg(long, help = "Print as JSON")]
        json: bool,
    },

    /// Show which actions an employee can currently take
    Eligibility {
        #[arg(long)]
        employee: i64,
    },

    /// Deferred cross-shift transitions
    Transitions {
        #[arg(long = "run", help = "Run every due transition job")]
        run: bool,

        #[arg(long = "list", help = "List all transition jobs")]
        list: bool,
    },
}

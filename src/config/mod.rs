use crate::errors::{AppError, AppResult};
use chrono::{Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

pub mod migrate;

/// Keys every configuration file is expected to carry.
pub const CONFIG_KEYS: [&str; 4] = [
    "database",
    "utc_offset",
    "action_window_minutes",
    "clock_in_eligibility_minutes",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    /// Civil time zone of the organization, as a UTC offset (`+01:00`).
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
    /// Tolerance around shift start/end inside which attendance actions are accepted.
    #[serde(default = "default_action_window")]
    pub action_window_minutes: i64,
    /// Tolerance around shift start used by the advisory clock-in check.
    #[serde(default = "default_eligibility_window")]
    pub clock_in_eligibility_minutes: i64,
}

fn default_utc_offset() -> String {
    "+01:00".to_string()
}
fn default_action_window() -> i64 {
    30
}
fn default_eligibility_window() -> i64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        let db_path = Self::database_file();
        Self {
            database: db_path.to_string_lossy().to_string(),
            utc_offset: default_utc_offset(),
            action_window_minutes: default_action_window(),
            clock_in_eligibility_minutes: default_eligibility_window(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rfichaje")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rfichaje")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rfichaje.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rfichaje.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if path.exists() {
            let content = fs::read_to_string(&path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    /// Parsed civil time zone.
    pub fn offset(&self) -> AppResult<FixedOffset> {
        self.utc_offset
            .parse::<FixedOffset>()
            .map_err(|e| AppError::Config(format!("invalid utc_offset '{}': {}", self.utc_offset, e)))
    }

    pub fn action_window(&self) -> Duration {
        Duration::minutes(self.action_window_minutes)
    }

    pub fn clock_in_eligibility_window(&self) -> Duration {
        Duration::minutes(self.clock_in_eligibility_minutes)
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = match custom_name {
            Some(name) => {
                let p = crate::utils::path::expand_tilde(&name);
                if p.is_absolute() { p } else { dir.join(p) }
            }
            None => Self::database_file(),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        // Write config file
        if !is_test {
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        // Create empty DB file if not exists
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path).map_err(|e| {
                io::Error::new(e.kind(), format!("cannot create {}: {}", db_path.display(), e))
            })?;
        }

        Ok(config)
    }
}

use crate::cli::parser::Commands;
use crate::config::Config;
use crate::config::migrate::{migrate_config_file, missing_keys};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use std::process::Command;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
        migrate,
        edit_config,
        editor,
    } = cmd
    {
        let path = Config::config_file();

        // ---- PRINT CONFIG ----
        if *print_config {
            println!("📄 Current configuration:\n");
            println!("{}", serde_yaml::to_string(cfg)?);
        }

        // ---- CHECK CONFIG ----
        if *check {
            if !path.exists() {
                warning(format!("No configuration file at {}", path.display()));
            } else {
                let missing = missing_keys(&path)?;
                if missing.is_empty() {
                    success("Configuration file is complete.");
                } else {
                    warning(format!("Missing fields: {}", missing.join(", ")));
                }
            }
            cfg.offset()?;
            info(format!(
                "Action window ±{} min, clock-in eligibility ±{} min",
                cfg.action_window_minutes, cfg.clock_in_eligibility_minutes
            ));
        }

        // ---- MIGRATE CONFIG ----
        if *migrate && path.exists() {
            migrate_config_file(&path)?;
        }

        // ---- EDIT CONFIG ----
        if *edit_config {
            let editor_to_use = editor
                .clone()
                .or_else(|| std::env::var("EDITOR").ok())
                .or_else(|| std::env::var("VISUAL").ok())
                .unwrap_or_else(|| {
                    if cfg!(target_os = "windows") {
                        "notepad".to_string()
                    } else {
                        "nano".to_string()
                    }
                });

            let status = Command::new(&editor_to_use)
                .arg(&path)
                .status()
                .map_err(|e| AppError::Config(format!("cannot run '{}': {}", editor_to_use, e)))?;

            if status.success() {
                success(format!(
                    "Configuration file edited successfully using '{}'",
                    editor_to_use
                ));
            } else {
                return Err(AppError::Config(format!(
                    "editor '{}' exited with {}",
                    editor_to_use, status
                )));
            }
        }
    }

    Ok(())
}

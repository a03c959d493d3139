//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use crate::models::shift::ShiftState;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Invalid shift: {0}")]
    InvalidShift(String),

    // ---------------------------
    // Attendance errors
    // ---------------------------
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Too early: actions on this shift are allowed from {opens_at}")]
    TooEarly { opens_at: String },

    #[error("Too late: actions on this shift were allowed until {closed_at}")]
    TooLate { closed_at: String },

    #[error("Cannot {action} while shift is {state}")]
    InvalidTransition { action: String, state: ShiftState },

    #[error("No active break on shift {0}")]
    NoActiveBreak(i64),

    #[error("Geolocation is required to {0}")]
    MissingGeolocation(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    pub fn shift_not_found(id: i64) -> Self {
        AppError::NotFound { entity: "Shift", id }
    }

    pub fn break_not_found(id: i64) -> Self {
        AppError::NotFound { entity: "Break", id }
    }

    pub fn invalid_transition(action: impl Into<String>, state: ShiftState) -> Self {
        AppError::InvalidTransition {
            action: action.into(),
            state,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

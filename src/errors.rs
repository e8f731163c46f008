//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.
//! The scheduling core is the exception: it never fails, see
//! `core::scheduler::projector::ProjectionOutcome`.

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

    #[error("Document encoding error: {0}")]
    Document(#[from] serde_json::Error),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid date-time format: {0} (expected YYYY-MM-DDTHH:MM)")]
    InvalidDateTime(String),

    #[error("Invalid break definition: {0} (expected NAME=HH:MM-HH:MM)")]
    InvalidBreak(String),

    #[error("Invalid machine type: {0} (expected CNC or VMC)")]
    InvalidMachineType(String),

    #[error("Invalid loss entry: {0} (expected KIND=HOURS, e.g. tool_change=0.5)")]
    InvalidLoss(String),

    #[error("Invalid number for {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },

    // ---------------------------
    // Logic errors
    // ---------------------------
    #[error("No calendar entry for date {0}")]
    NoCalendarEntry(String),

    #[error("Machine not found: {0}")]
    MachineNotFound(i64),

    #[error("Machine already exists: {0}")]
    DuplicateMachine(String),

    #[error("Production plan not found: {0}")]
    PlanNotFound(String),

    #[error("{0} already exists")]
    DuplicatePlan(String),

    #[error("Job not found: {0}")]
    JobNotFound(i64),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;

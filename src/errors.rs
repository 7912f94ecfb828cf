use std::result::Result as StdResult;

use thiserror::Error;

use crate::calendar::CellId;

/// Error type that captures calendar build and selection failures.
///
/// Rejected picks (out of bounds, unselectable) are not errors; they are
/// reported through [`crate::calendar::PickOutcome`] instead.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Invalid date range: {0}")]
    InvalidRange(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
    #[error("Cell {0} does not belong to the current grid")]
    UnknownCell(CellId),
    #[error("Calendar not initialized. Call `init` with a date range first")]
    NotInitialized,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = StdResult<T, CalendarError>;

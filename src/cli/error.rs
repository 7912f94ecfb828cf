use std::io;

use crate::errors::CalendarError;

/// Fatal shell errors; the loop stops when one of these escapes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CalendarError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        CliError::Input(err.to_string())
    }
}

/// Per-command failures; reported and the shell keeps going.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Calendar not initialized. Use `init <min> <max>` first.")]
    NotInitialized,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Core(CalendarError),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CalendarError> for CommandError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::NotInitialized => CommandError::NotInitialized,
            other => CommandError::Core(other),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

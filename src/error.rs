//! Error types for the row store and its command dispatcher.

use thiserror::Error;

/// Result type for table and page store operations
pub type TableResult<T> = Result<T, TableError>;

/// Result type for dispatcher operations
pub type CommandResult<T> = Result<T, CommandError>;

/// Record codec contract violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Byte block handed to the decoder is not exactly one row wide
    #[error("row block must be {expected} bytes, got {found}")]
    BlockLength { expected: usize, found: usize },
}

/// Errors raised by the table and its page store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Append attempted on a full table; the table is left untouched
    #[error("Table full.")]
    CapacityExceeded { max_rows: usize },

    /// Row index past the last addressable slot
    #[error("row index {index} out of range (max {max_rows} rows)")]
    RowOutOfRange { index: usize, max_rows: usize },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Errors reported back to the user at the prompt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    // Malformed input
    #[error("Syntax error. Missing {0}. Usage: insert <id> <username> <email>")]
    MissingField(&'static str),

    #[error("Syntax error. Invalid id '{0}'.")]
    InvalidId(String),

    #[error("Syntax error. Unexpected '{0}'.")]
    UnexpectedToken(String),

    // Unknown commands
    #[error("Unrecognized meta-command: {0}")]
    UnrecognizedMeta(String),

    #[error("Unrecognized keyword at start of '{0}'.")]
    UnrecognizedKeyword(String),

    #[error("Error: {0}")]
    Table(#[from] TableError),
}

impl CommandError {
    /// True for the malformed-input class of errors
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            CommandError::MissingField(_)
                | CommandError::InvalidId(_)
                | CommandError::UnexpectedToken(_)
        )
    }
}

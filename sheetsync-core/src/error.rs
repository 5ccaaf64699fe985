//! Error types for the sheetsync ecosystem.

use thiserror::Error;

/// Errors that can occur while deriving or reconciling events.
///
/// Only `LockTimeout` is fatal for a whole run; everything else is caught at
/// the sheet, row, or key boundary and logged.
#[derive(Error, Debug)]
pub enum SheetSyncError {
    #[error("Sheet name {0:?} does not match \"<Month> <Year>\"")]
    SheetShape(String),

    #[error("Invalid day header in sheet {sheet:?} row {row}: {detail}")]
    DayHeader {
        sheet: String,
        row: u32,
        detail: String,
    },

    #[error("No calendar mapping for person: {0}")]
    Mapping(String),

    #[error("Calendar mutation failed: {0}")]
    Mutation(String),

    #[error("Could not acquire run lock within {0}s")]
    LockTimeout(u64),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for sheetsync operations.
pub type SyncResult<T> = Result<T, SheetSyncError>;

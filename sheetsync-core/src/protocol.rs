//! Provider protocol types.
//!
//! Defines the JSON protocol used for communication between the sheetsync
//! CLI and provider binaries over stdin/stdout: one request line in, one
//! response line out. Providers manage their own credentials; the CLI only
//! passes provider-specific parameters through from the config.

use serde::{Deserialize, Serialize};

/// Commands that providers must implement. Spreadsheet providers answer
/// `ListSheets`; calendar providers answer the event commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    ListSheets,
    ListEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
}

/// Request sent from the CLI to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from a provider to the CLI.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

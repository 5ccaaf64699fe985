//! Provider subprocess clients.
//!
//! External collaborators are provider binaries (e.g.
//! `sheetsync-provider-gsheets`, `sheetsync-provider-gcal`) spoken to with
//! JSON over stdin/stdout: one request line in, one response line out.
//!
//! The protocol is language-agnostic - any executable that speaks it can be
//! a provider. Providers manage their own credentials; the CLI only passes
//! provider-specific parameters through from the calendar config.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

use sheetsync_core::error::{SheetSyncError, SyncResult};
use sheetsync_core::event::{EventUpdate, ExistingEvent, NewEvent};
use sheetsync_core::protocol::{Command as ProviderCommand, Request, Response};
use sheetsync_core::store::{CalendarStore, SheetData, SheetSource};

use crate::config::ProviderConfig;

/// A client for one provider subprocess, discovered by looking for an
/// executable named `sheetsync-provider-{name}` in PATH.
struct ProviderClient {
    binary_path: PathBuf,
    params: HashMap<String, toml::Value>,
}

impl ProviderClient {
    fn from_config(config: &ProviderConfig) -> SyncResult<Self> {
        let binary_name = format!("sheetsync-provider-{}", config.provider);
        let binary_path = which::which(&binary_name)
            .map_err(|_| SheetSyncError::ProviderNotInstalled(config.provider.clone()))?;

        Ok(ProviderClient {
            binary_path,
            params: config.params.clone(),
        })
    }

    /// Call a provider command and return the result.
    async fn call<R: DeserializeOwned>(
        &self,
        command: ProviderCommand,
        additional: &[(&str, serde_json::Value)],
    ) -> SyncResult<R> {
        let request = Request {
            command,
            params: build_params(&self.params, additional),
        };
        let request_json = serde_json::to_string(&request)
            .map_err(|err| SheetSyncError::Serialization(err.to_string()))?;

        let mut child = Command::new(&self.binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit()) // Let provider errors show in terminal
            .spawn()?;

        // Write request to stdin, then drop it to signal EOF.
        {
            let mut stdin = child.stdin.take().ok_or_else(|| {
                SheetSyncError::Provider("provider stdin unavailable".to_string())
            })?;
            stdin.write_all(request_json.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
            stdin.flush().await?;
        }

        let stdout = child.stdout.take().ok_or_else(|| {
            SheetSyncError::Provider("provider stdout unavailable".to_string())
        })?;
        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        reader.read_line(&mut line).await?;

        if line.is_empty() {
            return Err(SheetSyncError::Provider(
                "provider returned no response".to_string(),
            ));
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(SheetSyncError::Provider(format!(
                "provider exited with status {}",
                status.code().unwrap_or(-1)
            )));
        }

        let response: Response<R> = serde_json::from_str(&line).map_err(|err| {
            SheetSyncError::Provider(format!("unparseable provider response: {err}"))
        })?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error } => Err(SheetSyncError::Provider(error)),
        }
    }
}

/// Spreadsheet source backed by a provider subprocess.
pub struct SheetProvider {
    client: ProviderClient,
}

impl SheetProvider {
    pub fn from_config(config: &ProviderConfig) -> SyncResult<Self> {
        Ok(SheetProvider {
            client: ProviderClient::from_config(config)?,
        })
    }
}

impl SheetSource for SheetProvider {
    async fn sheets(&self) -> SyncResult<Vec<SheetData>> {
        self.client.call(ProviderCommand::ListSheets, &[]).await
    }
}

/// Calendar sink backed by a provider subprocess.
///
/// Every call carries the run's resolved timezone so the provider can
/// interpret the engine's naive wall-clock values.
pub struct CalendarProvider {
    client: ProviderClient,
    timezone: String,
}

impl CalendarProvider {
    pub fn from_config(config: &ProviderConfig, timezone: &chrono_tz::Tz) -> SyncResult<Self> {
        Ok(CalendarProvider {
            client: ProviderClient::from_config(config)?,
            timezone: timezone.name().to_string(),
        })
    }
}

impl CalendarStore for CalendarProvider {
    async fn events_between(
        &self,
        calendar_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> SyncResult<Vec<ExistingEvent>> {
        self.client
            .call(
                ProviderCommand::ListEvents,
                &[
                    ("calendar_id", json!(calendar_id)),
                    ("time_min", json!(start)),
                    ("time_max", json!(end)),
                    ("timezone", json!(self.timezone)),
                ],
            )
            .await
    }

    async fn create_event(&self, calendar_id: &str, event: &NewEvent) -> SyncResult<()> {
        self.client
            .call(
                ProviderCommand::CreateEvent,
                &[
                    ("calendar_id", json!(calendar_id)),
                    ("event", to_json(event)?),
                    ("timezone", json!(self.timezone)),
                ],
            )
            .await
            .map_err(as_mutation)
    }

    async fn update_event(&self, calendar_id: &str, update: &EventUpdate) -> SyncResult<()> {
        self.client
            .call(
                ProviderCommand::UpdateEvent,
                &[
                    ("calendar_id", json!(calendar_id)),
                    ("update", to_json(update)?),
                    ("timezone", json!(self.timezone)),
                ],
            )
            .await
            .map_err(as_mutation)
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> SyncResult<()> {
        self.client
            .call(
                ProviderCommand::DeleteEvent,
                &[
                    ("calendar_id", json!(calendar_id)),
                    ("event_id", json!(event_id)),
                ],
            )
            .await
            .map_err(as_mutation)
    }
}

/// A provider failure raised by a mutation call is a mutation failure;
/// everything else (missing binary, IO) passes through unchanged.
fn as_mutation(err: SheetSyncError) -> SheetSyncError {
    match err {
        SheetSyncError::Provider(detail) => SheetSyncError::Mutation(detail),
        other => other,
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> SyncResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|err| SheetSyncError::Serialization(err.to_string()))
}

/// Convert provider config params to JSON and merge with call-specific
/// params.
fn build_params(
    config_params: &HashMap<String, toml::Value>,
    additional: &[(&str, serde_json::Value)],
) -> serde_json::Value {
    let mut params = serde_json::Map::new();

    // Config params first (toml::Value implements Serialize)
    for (key, value) in config_params {
        if let Ok(json_value) = serde_json::to_value(value) {
            params.insert(key.clone(), json_value);
        }
    }

    // Call-specific params override config ones
    for (key, value) in additional {
        params.insert((*key).to_string(), value.clone());
    }

    serde_json::Value::Object(params)
}

//! Collaborator traits and the data they exchange.
//!
//! The engine never performs I/O itself: it reads sheets through
//! [`SheetSource`], mutates calendars through [`CalendarStore`], and guards
//! a run with [`RunLock`]. Production implementations live in the CLI crate
//! (subprocess providers, file lock); tests supply in-memory fakes.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SyncResult;
use crate::event::{EventUpdate, ExistingEvent, NewEvent};

/// One sheet of the source spreadsheet, read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetData {
    /// Sheet title, expected to follow the `"<Month> <Year>"` convention.
    pub name: String,
    /// Day-number display values, aligned 1:1 with each row's data cells.
    pub day_headers: Vec<String>,
    pub rows: Vec<PersonRow>,
}

/// One person's row of a sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRow {
    /// Row number in the source sheet; part of every derived event key.
    pub row: u32,
    pub name: String,
    /// Background color of the identity cell, e.g. `"#ffff00"`.
    #[serde(default)]
    pub background_color: String,
    /// Cell display values, identity cell excluded.
    pub cells: Vec<String>,
}

/// Read-only access to the spreadsheet source.
#[allow(async_fn_in_trait)]
pub trait SheetSource {
    async fn sheets(&self) -> SyncResult<Vec<SheetData>>;
}

/// Mutable access to the calendar sink, keyed by calendar identifier.
#[allow(async_fn_in_trait)]
pub trait CalendarStore {
    /// Events with a start inside `[start, end)`.
    async fn events_between(
        &self,
        calendar_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> SyncResult<Vec<ExistingEvent>>;

    async fn create_event(&self, calendar_id: &str, event: &NewEvent) -> SyncResult<()>;

    async fn update_event(&self, calendar_id: &str, update: &EventUpdate) -> SyncResult<()>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> SyncResult<()>;
}

/// Run-wide cooperative mutual exclusion.
///
/// The guard releases the lock on drop, so every exit path - success,
/// per-sheet error, or abort - releases it.
pub trait RunLock {
    type Guard;

    fn acquire(&self, timeout: Duration) -> SyncResult<Self::Guard>;
}

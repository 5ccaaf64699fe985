//! In-memory collaborator fakes shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::{SheetSyncError, SyncResult};
use crate::event::{EventUpdate, ExistingEvent, NewEvent};
use crate::store::{CalendarStore, RunLock, SheetData, SheetSource};

#[derive(Debug, Default, Clone, Copy)]
pub struct CallCounts {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

#[derive(Default)]
struct FakeCalendarState {
    next_id: u64,
    events: HashMap<String, Vec<ExistingEvent>>,
    fail_deletes: HashSet<String>,
    calls: CallCounts,
}

/// An in-memory calendar store recording every mutation call.
#[derive(Default)]
pub struct FakeCalendar {
    state: Mutex<FakeCalendarState>,
}

impl FakeCalendar {
    pub fn new() -> Self {
        FakeCalendar::default()
    }

    pub fn seed(&self, calendar_id: &str, event: ExistingEvent) {
        let mut state = self.state.lock().unwrap();
        state
            .events
            .entry(calendar_id.to_string())
            .or_default()
            .push(event);
    }

    /// Make future deletions of this event id fail.
    pub fn fail_delete(&self, event_id: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_deletes
            .insert(event_id.to_string());
    }

    pub fn events(&self, calendar_id: &str) -> Vec<ExistingEvent> {
        self.state
            .lock()
            .unwrap()
            .events
            .get(calendar_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().unwrap().calls
    }

    pub fn reset_calls(&self) {
        self.state.lock().unwrap().calls = CallCounts::default();
    }
}

impl CalendarStore for FakeCalendar {
    async fn events_between(
        &self,
        calendar_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> SyncResult<Vec<ExistingEvent>> {
        Ok(self
            .events(calendar_id)
            .into_iter()
            .filter(|e| {
                let day = e.start.date();
                day >= start && day < end
            })
            .collect())
    }

    async fn create_event(&self, calendar_id: &str, event: &NewEvent) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        state.calls.creates += 1;
        let id = format!("ev-{}", state.next_id);
        state
            .events
            .entry(calendar_id.to_string())
            .or_default()
            .push(ExistingEvent {
                id,
                title: event.title.clone(),
                start: event.start,
                end: event.end,
                all_day: event.all_day,
                color: event.color,
                description: Some(event.description.clone()),
            });
        Ok(())
    }

    async fn update_event(&self, calendar_id: &str, update: &EventUpdate) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.updates += 1;
        let events = state.events.entry(calendar_id.to_string()).or_default();
        let event = events
            .iter_mut()
            .find(|e| e.id == update.event_id)
            .ok_or_else(|| {
                SheetSyncError::Mutation(format!("no event with id {}", update.event_id))
            })?;
        if let Some(title) = &update.title {
            event.title = title.clone();
        }
        event.start = update.start;
        event.end = update.end;
        event.all_day = update.all_day;
        if let Some(color) = update.color {
            event.color = Some(color);
        }
        Ok(())
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.deletes += 1;
        if state.fail_deletes.contains(event_id) {
            return Err(SheetSyncError::Mutation(format!(
                "delete of {event_id} rejected"
            )));
        }
        let events = state.events.entry(calendar_id.to_string()).or_default();
        let before = events.len();
        events.retain(|e| e.id != event_id);
        if events.len() == before {
            return Err(SheetSyncError::Mutation(format!(
                "no event with id {event_id}"
            )));
        }
        Ok(())
    }
}

/// A sheet source serving a fixed set of sheets.
pub struct FakeSheets {
    pub sheets: Vec<SheetData>,
}

impl SheetSource for FakeSheets {
    async fn sheets(&self) -> SyncResult<Vec<SheetData>> {
        Ok(self.sheets.clone())
    }
}

/// A lock that always acquires immediately.
pub struct FakeLock;

impl RunLock for FakeLock {
    type Guard = ();

    fn acquire(&self, _timeout: Duration) -> SyncResult<()> {
        Ok(())
    }
}

/// A lock that is always held elsewhere.
pub struct BusyLock;

impl RunLock for BusyLock {
    type Guard = ();

    fn acquire(&self, timeout: Duration) -> SyncResult<()> {
        Err(SheetSyncError::LockTimeout(timeout.as_secs()))
    }
}

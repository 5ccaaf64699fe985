//! Event types shared between the engine and calendar providers.
//!
//! All wall-clock values are naive and interpreted in the run's single
//! resolved timezone; the timezone id travels to the provider separately.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::color::EventColor;
use crate::grid::HalfDaySlot;

/// Start or end of an event: a bare date for all-day events, a local
/// date-time for timed events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    Date(NaiveDate),
    Local(NaiveDateTime),
}

impl EventTime {
    /// The calendar day this time falls on.
    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::Date(d) => *d,
            EventTime::Local(dt) => dt.date(),
        }
    }
}

/// Absence kind; its tag is part of every derived event key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbsenceKind {
    FullDay,
    HalfDay,
}

impl AbsenceKind {
    pub fn tag(self) -> &'static str {
        match self {
            AbsenceKind::FullDay => "H",
            AbsenceKind::HalfDay => "Half",
        }
    }
}

/// A desired event, recomputed fresh from the grid every run.
///
/// `key` is the sole basis for matching against existing events: unique
/// within one person's desired set and stable across runs as long as the
/// underlying grid content is unchanged. For all-day events `end` is
/// exclusive (one day past the last covered day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSpec {
    pub key: String,
    pub title: String,
    pub start: EventTime,
    pub end: EventTime,
    pub all_day: bool,
    pub color: Option<EventColor>,
    pub kind: AbsenceKind,
}

/// An event fetched from the calendar sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingEvent {
    pub id: String,
    pub title: String,
    pub start: EventTime,
    pub end: EventTime,
    pub all_day: bool,
    pub color: Option<EventColor>,
    pub description: Option<String>,
}

/// Payload for creating a new event.
///
/// `description` carries the ownership tag; writing it is mandatory, it is
/// the only mechanism by which a future run recognizes the event as
/// sync-owned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub start: EventTime,
    pub end: EventTime,
    pub all_day: bool,
    pub color: Option<EventColor>,
    pub description: String,
}

/// Field-level patch for an existing event.
///
/// `title` and `color` are present only when they differ from the event's
/// current values; dates are always re-sent (idempotent re-application).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventUpdate {
    pub event_id: String,
    pub title: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub all_day: bool,
    pub color: Option<EventColor>,
}

impl EventUpdate {
    /// True when the update only re-applies dates, changing nothing else.
    pub fn is_refresh_only(&self) -> bool {
        self.title.is_none() && self.color.is_none()
    }
}

/// Wall-clock window for a timed event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// The fixed wall-clock windows for half-day absences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfDayWindows {
    pub morning: TimeWindow,
    pub afternoon: TimeWindow,
}

impl Default for HalfDayWindows {
    fn default() -> Self {
        HalfDayWindows {
            morning: TimeWindow {
                start: hm(8, 0),
                end: hm(12, 0),
            },
            afternoon: TimeWindow {
                start: hm(13, 0),
                end: hm(17, 0),
            },
        }
    }
}

impl HalfDayWindows {
    pub fn window(&self, slot: HalfDaySlot) -> TimeWindow {
        match slot {
            HalfDaySlot::Morning => self.morning,
            HalfDaySlot::Afternoon => self.afternoon,
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("literal wall-clock time")
}

//! Indexing of sync-owned existing events.

use std::collections::HashMap;

use crate::event::ExistingEvent;
use crate::key::OWNERSHIP_PREFIX;

/// Filter a month window's events down to those carrying the ownership
/// prefix and index them by their embedded key.
///
/// The prefix match is exact - a differently cased or spaced prefix makes
/// the event invisible, keeping it out of both the update and delete paths.
pub fn index_owned(events: Vec<ExistingEvent>) -> HashMap<String, ExistingEvent> {
    let mut owned = HashMap::new();
    for event in events {
        let Some(description) = event.description.as_deref() else {
            continue;
        };
        let Some(rest) = description.strip_prefix(OWNERSHIP_PREFIX) else {
            continue;
        };
        owned.insert(rest.trim().to_string(), event);
    }
    owned
}

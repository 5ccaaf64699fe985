//! Reconciliation: diff the desired set against indexed existing events
//! and apply the resulting mutations.
//!
//! Planning is a pure two-pass diff over the two maps (claim desired keys,
//! then delete unclaimed), with no ordering dependency between keys.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::warn;

use crate::error::SyncResult;
use crate::event::{EventSpec, EventUpdate, ExistingEvent, NewEvent};
use crate::key;
use crate::store::CalendarStore;

/// Mutation counts from applying one or more plans.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncStats {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl SyncStats {
    pub fn merge(&mut self, other: SyncStats) {
        self.created += other.created;
        self.updated += other.updated;
        self.deleted += other.deleted;
    }
}

/// The create/update/delete decisions for one person and one month.
#[derive(Debug, Default)]
pub struct ReconcilePlan {
    pub to_create: Vec<EventSpec>,
    pub to_update: Vec<EventUpdate>,
    pub to_delete: Vec<ExistingEvent>,
}

impl ReconcilePlan {
    /// True when applying the plan would change anything beyond the
    /// always-applied date re-set.
    pub fn has_changes(&self) -> bool {
        !self.to_create.is_empty()
            || !self.to_delete.is_empty()
            || self.to_update.iter().any(|u| !u.is_refresh_only())
    }
}

/// Diff desired against existing events.
///
/// Keys present in both become updates, desired-only keys become creates,
/// and existing keys left unclaimed become deletes. Deletes are sorted by
/// event id so mutation order is deterministic.
pub fn plan(
    desired: &BTreeMap<String, EventSpec>,
    existing: &HashMap<String, ExistingEvent>,
) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();
    let mut claimed: HashSet<&str> = HashSet::new();

    for (key, spec) in desired {
        match existing.get(key) {
            Some(current) => {
                claimed.insert(key.as_str());
                plan.to_update.push(update_for(spec, current));
            }
            None => plan.to_create.push(spec.clone()),
        }
    }

    for (key, event) in existing {
        if !claimed.contains(key.as_str()) {
            plan.to_delete.push(event.clone());
        }
    }
    plan.to_delete.sort_by(|a, b| a.id.cmp(&b.id));

    plan
}

/// Patch bringing `current` in line with `spec`: title only when changed,
/// dates always, color only when a resolved color differs from the
/// current one (an unresolved color never clears a manual one).
fn update_for(spec: &EventSpec, current: &ExistingEvent) -> EventUpdate {
    EventUpdate {
        event_id: current.id.clone(),
        title: (spec.title != current.title).then(|| spec.title.clone()),
        start: spec.start,
        end: spec.end,
        all_day: spec.all_day,
        color: spec.color.filter(|c| Some(*c) != current.color),
    }
}

/// Issue the plan's mutations against one calendar.
///
/// Create and update failures propagate (the caller isolates them per
/// person); deletion failures are logged per key and never block sibling
/// deletions.
pub async fn apply<C: CalendarStore>(
    store: &C,
    calendar_id: &str,
    plan: &ReconcilePlan,
) -> SyncResult<SyncStats> {
    let mut stats = SyncStats::default();

    for spec in &plan.to_create {
        let event = NewEvent {
            title: spec.title.clone(),
            start: spec.start,
            end: spec.end,
            all_day: spec.all_day,
            color: spec.color,
            description: key::tagged_description(&spec.key),
        };
        store.create_event(calendar_id, &event).await?;
        stats.created += 1;
    }

    for update in &plan.to_update {
        store.update_event(calendar_id, update).await?;
        stats.updated += 1;
    }

    for event in &plan.to_delete {
        if let Err(err) = store.delete_event(calendar_id, &event.id).await {
            warn!(
                "failed to delete event {} ({:?}): {err}",
                event.id, event.title
            );
            continue;
        }
        stats.deleted += 1;
    }

    Ok(stats)
}

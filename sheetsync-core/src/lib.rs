//! Core engine for the sheetsync ecosystem.
//!
//! This crate turns monthly absence sheets (one row per person, one column
//! per day, cell codes for absence types) into a canonical set of desired
//! calendar events, and reconciles that set against the events already in an
//! external calendar:
//! - `month`, `color`, `grid`, `key`, `desired` derive the desired set
//! - `index` and `reconcile` diff it against sync-owned existing events
//! - `sync` orchestrates a full run across sheets and persons
//! - `store` defines the collaborator traits, `protocol` the provider wire
//!   format spoken by `sheetsync-provider-*` binaries

pub mod color;
pub mod desired;
pub mod error;
pub mod event;
pub mod grid;
pub mod index;
pub mod key;
pub mod month;
pub mod protocol;
pub mod reconcile;
pub mod store;
pub mod sync;

#[cfg(test)]
mod testing;

pub use error::{SheetSyncError, SyncResult};
pub use event::*;

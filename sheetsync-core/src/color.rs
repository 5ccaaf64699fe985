//! Background-color to event-color resolution.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The event color palette supported by the calendar sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventColor {
    Yellow,
    Red,
    Green,
    Blue,
    Orange,
    Purple,
}

/// Maps normalized hex background colors to event colors.
///
/// An unmatched color resolves to `None`, which callers must treat as "no
/// color override" - it never clears a color already set on an event.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    entries: HashMap<String, EventColor>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        let entries = HashMap::from([
            ("#ffff00".to_string(), EventColor::Yellow),
            ("#ff0000".to_string(), EventColor::Red),
            ("#00ff00".to_string(), EventColor::Green),
            ("#0000ff".to_string(), EventColor::Blue),
            ("#ffa500".to_string(), EventColor::Orange),
            ("#800080".to_string(), EventColor::Purple),
        ]);
        ColorPalette { entries }
    }
}

impl ColorPalette {
    /// Build a palette from explicit entries (e.g. a config override).
    /// Keys are normalized to lowercase.
    pub fn new(entries: HashMap<String, EventColor>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(hex, color)| (hex.trim().to_lowercase(), color))
            .collect();
        ColorPalette { entries }
    }

    pub fn resolve(&self, background: &str) -> Option<EventColor> {
        self.entries.get(&background.trim().to_lowercase()).copied()
    }
}

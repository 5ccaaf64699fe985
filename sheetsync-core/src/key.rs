//! Deterministic event identity.
//!
//! Keys are the only cross-run memory the system has: they are embedded in
//! the event description behind [`OWNERSHIP_PREFIX`] and matched exactly on
//! the next run. Two different absences for the same person on the same day
//! but different kinds are distinct keys and may coexist.

use chrono::NaiveDate;

/// Literal prefix marking an event description as sync-owned.
pub const OWNERSHIP_PREFIX: &str = "SheetSync: ";

const DATE_FMT: &str = "%Y-%m-%d";

/// Key for a full-day run: `<sheet>|<row>|H|<start>|<end-exclusive>`.
pub fn full_day_key(sheet: &str, row: u32, start: NaiveDate, end_exclusive: NaiveDate) -> String {
    format!(
        "{sheet}|{row}|H|{}|{}",
        start.format(DATE_FMT),
        end_exclusive.format(DATE_FMT)
    )
}

/// Key for a half-day cell: `<sheet>|<row>|Half|<date>|<H1|H2>`.
pub fn half_day_key(sheet: &str, row: u32, date: NaiveDate, code: &str) -> String {
    format!("{sheet}|{row}|Half|{}|{code}", date.format(DATE_FMT))
}

/// Description text carrying the ownership tag for a key.
pub fn tagged_description(key: &str) -> String {
    format!("{OWNERSHIP_PREFIX}{key}")
}

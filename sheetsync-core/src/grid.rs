//! Row scanning: cell codes to absence spans.
//!
//! The parser is total over arbitrary trimmed string input: invalid input
//! always degrades to "no span" plus a logged diagnostic, never an error.

use log::warn;

use crate::error::{SheetSyncError, SyncResult};

/// Which half of the day a half-day absence covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfDaySlot {
    Morning,
    Afternoon,
}

impl HalfDaySlot {
    pub fn from_code(code: &str) -> Option<HalfDaySlot> {
        match code {
            "H1" => Some(HalfDaySlot::Morning),
            "H2" => Some(HalfDaySlot::Afternoon),
            _ => None,
        }
    }

    /// The literal cell code; part of the derived event key.
    pub fn code(self) -> &'static str {
        match self {
            HalfDaySlot::Morning => "H1",
            HalfDaySlot::Afternoon => "H2",
        }
    }
}

/// A candidate absence parsed from one person's row. Days are calendar
/// days within the sheet's month, already validated against its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsenceSpan {
    /// Maximal run of consecutive `H` cells, both days inclusive.
    FullDay { start_day: u32, end_day: u32 },
    /// A single `H1` or `H2` cell.
    HalfDay { day: u32, slot: HalfDaySlot },
}

/// Scan one person's data cells (identity cell excluded) against the
/// aligned day-header row.
///
/// Cell codes are trimmed and matched case-sensitively: `H` cells group
/// into maximal runs, `H1`/`H2` stay single, anything else is skipped. A
/// non-numeric or out-of-range day header drops the whole affected span
/// with a diagnostic and scanning resumes after it.
pub fn parse_row(
    sheet: &str,
    row: u32,
    cells: &[String],
    day_headers: &[String],
    days_in_month: u32,
) -> Vec<AbsenceSpan> {
    let mut spans = Vec::new();
    let mut col = 0;

    while col < cells.len() {
        let code = cells[col].trim();

        if code == "H" {
            let start = col;
            let mut end = col;
            while end + 1 < cells.len() && cells[end + 1].trim() == "H" {
                end += 1;
            }

            let start_day = day_at(sheet, row, day_headers, start, days_in_month);
            let end_day = day_at(sheet, row, day_headers, end, days_in_month);
            match (start_day, end_day) {
                (Ok(start_day), Ok(end_day)) => {
                    spans.push(AbsenceSpan::FullDay { start_day, end_day })
                }
                (Err(err), _) | (_, Err(err)) => {
                    warn!("{err}; dropping full-day span at columns {start}..={end}")
                }
            }
            col = end + 1;
        } else if let Some(slot) = HalfDaySlot::from_code(code) {
            match day_at(sheet, row, day_headers, col, days_in_month) {
                Ok(day) => spans.push(AbsenceSpan::HalfDay { day, slot }),
                Err(err) => warn!("{err}; dropping half-day cell at column {col}"),
            }
            col += 1;
        } else {
            col += 1;
        }
    }

    spans
}

/// Translate a data-column offset into a calendar day via the aligned
/// header. This is the only place column indexes meet calendar days.
fn day_at(
    sheet: &str,
    row: u32,
    day_headers: &[String],
    col: usize,
    days_in_month: u32,
) -> SyncResult<u32> {
    let raw = day_headers.get(col).map(|h| h.trim()).unwrap_or("");
    let day: u32 = raw.parse().map_err(|_| SheetSyncError::DayHeader {
        sheet: sheet.to_string(),
        row,
        detail: format!("non-numeric day header {raw:?} at column {col}"),
    })?;
    if day == 0 || day > days_in_month {
        return Err(SheetSyncError::DayHeader {
            sheet: sheet.to_string(),
            row,
            detail: format!("day {day} outside 1..={days_in_month} at column {col}"),
        });
    }
    Ok(day)
}

//! Desired-event derivation for one person and one month.

use std::collections::BTreeMap;

use chrono::Duration;

use crate::color::ColorPalette;
use crate::error::{SheetSyncError, SyncResult};
use crate::event::{AbsenceKind, EventSpec, EventTime, HalfDayWindows};
use crate::grid::{self, AbsenceSpan};
use crate::key;
use crate::month::Month;
use crate::store::PersonRow;

/// Sheet years outside this range cannot produce valid dates and are
/// rejected as unparseable sheet names.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1000..=9999;

/// Identity of one sheet, parsed from the `"<Month> <Year>"` naming
/// convention. Trailing name parts are ignored, as the source always did.
#[derive(Debug, Clone)]
pub struct SheetContext {
    pub name: String,
    pub month: Month,
    pub year: i32,
    pub days_in_month: u32,
}

impl SheetContext {
    pub fn from_sheet_name(name: &str) -> SyncResult<SheetContext> {
        let shape_err = || SheetSyncError::SheetShape(name.to_string());

        let mut parts = name.split_whitespace();
        let month_name = parts.next().ok_or_else(shape_err)?;
        let year_part = parts.next().ok_or_else(shape_err)?;

        let month = Month::from_name(month_name).ok_or_else(shape_err)?;
        let year: i32 = year_part.parse().map_err(|_| shape_err())?;
        if !YEAR_RANGE.contains(&year) {
            return Err(shape_err());
        }

        Ok(SheetContext {
            name: name.to_string(),
            month,
            year,
            days_in_month: month.days_in(year),
        })
    }

    /// Date of a day within this sheet's month.
    pub fn date(&self, day: u32) -> Option<chrono::NaiveDate> {
        self.month.date(self.year, day)
    }

    /// The month's date range, end exclusive.
    pub fn month_window(&self) -> (chrono::NaiveDate, chrono::NaiveDate) {
        let start = self
            .month
            .date(self.year, 1)
            .expect("first of month exists for a validated year");
        let end = if self.month == Month::December {
            Month::January.date(self.year + 1, 1)
        } else {
            chrono::NaiveDate::from_ymd_opt(self.year, self.month.number() + 1, 1)
        }
        .expect("first of next month exists for a validated year");
        (start, end)
    }
}

/// Composes grid parsing, color resolution, and key derivation into the
/// full desired-event set for one person's row.
pub struct DesiredSetBuilder<'a> {
    sheet: &'a SheetContext,
    palette: &'a ColorPalette,
    windows: &'a HalfDayWindows,
}

impl<'a> DesiredSetBuilder<'a> {
    pub fn new(
        sheet: &'a SheetContext,
        palette: &'a ColorPalette,
        windows: &'a HalfDayWindows,
    ) -> Self {
        DesiredSetBuilder {
            sheet,
            palette,
            windows,
        }
    }

    pub fn build(&self, person: &PersonRow, day_headers: &[String]) -> BTreeMap<String, EventSpec> {
        let color = self.palette.resolve(&person.background_color);
        let spans = grid::parse_row(
            &self.sheet.name,
            person.row,
            &person.cells,
            day_headers,
            self.sheet.days_in_month,
        );

        let mut desired = BTreeMap::new();
        for span in spans {
            match span {
                AbsenceSpan::FullDay { start_day, end_day } => {
                    let (Some(start), Some(last)) =
                        (self.sheet.date(start_day), self.sheet.date(end_day))
                    else {
                        continue;
                    };
                    // All-day end dates are exclusive: one day past the run.
                    let end_exclusive = last + Duration::days(1);
                    let key =
                        key::full_day_key(&self.sheet.name, person.row, start, end_exclusive);
                    desired.insert(
                        key.clone(),
                        EventSpec {
                            key,
                            title: format!("{} - OOO", person.name.trim()),
                            start: EventTime::Date(start),
                            end: EventTime::Date(end_exclusive),
                            all_day: true,
                            color,
                            kind: AbsenceKind::FullDay,
                        },
                    );
                }
                AbsenceSpan::HalfDay { day, slot } => {
                    let Some(date) = self.sheet.date(day) else {
                        continue;
                    };
                    let window = self.windows.window(slot);
                    let key = key::half_day_key(&self.sheet.name, person.row, date, slot.code());
                    desired.insert(
                        key.clone(),
                        EventSpec {
                            key,
                            title: format!("{} - Half", person.name.trim()),
                            start: EventTime::Local(date.and_time(window.start)),
                            end: EventTime::Local(date.and_time(window.end)),
                            all_day: false,
                            color,
                            kind: AbsenceKind::HalfDay,
                        },
                    );
                }
            }
        }
        desired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::EventColor;
    use chrono::{NaiveDate, NaiveTime};

    fn context(name: &str) -> SheetContext {
        SheetContext::from_sheet_name(name).unwrap()
    }

    fn person(row: u32, name: &str, background: &str, cells: &[&str]) -> PersonRow {
        PersonRow {
            row,
            name: name.to_string(),
            background_color: background.to_string(),
            cells: cells.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn headers(n: u32) -> Vec<String> {
        (1..=n).map(|d| d.to_string()).collect()
    }

    #[test]
    fn sheet_names_parse_per_the_month_year_convention() {
        let ctx = context("March 2025");
        assert_eq!(ctx.month, Month::March);
        assert_eq!(ctx.year, 2025);
        assert_eq!(ctx.days_in_month, 31);

        assert!(SheetContext::from_sheet_name("Overview").is_err());
        assert!(SheetContext::from_sheet_name("march 2025").is_err());
        assert!(SheetContext::from_sheet_name("March banana").is_err());
        assert!(SheetContext::from_sheet_name("").is_err());
        assert!(SheetContext::from_sheet_name("March 99999999").is_err());
        // Trailing parts are ignored.
        assert!(SheetContext::from_sheet_name("March 2025 (draft)").is_ok());
    }

    #[test]
    fn month_window_is_end_exclusive() {
        let (start, end) = context("March 2025").month_window();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());

        let (start, end) = context("December 2025").month_window();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn full_day_runs_become_all_day_specs_with_exclusive_end() {
        let ctx = context("March 2025");
        let palette = ColorPalette::default();
        let windows = HalfDayWindows::default();
        let builder = DesiredSetBuilder::new(&ctx, &palette, &windows);

        let desired = builder.build(&person(6, "John", "", &["H", "H", "H"]), &headers(31));
        assert_eq!(desired.len(), 1);

        let spec = &desired["March 2025|6|H|2025-03-01|2025-03-04"];
        assert_eq!(spec.title, "John - OOO");
        assert!(spec.all_day);
        assert_eq!(
            spec.start,
            EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
        );
        assert_eq!(
            spec.end,
            EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap())
        );
        assert_eq!(spec.color, None);
    }

    #[test]
    fn run_ending_on_the_last_day_spills_into_the_next_month() {
        let ctx = context("March 2025");
        let palette = ColorPalette::default();
        let windows = HalfDayWindows::default();
        let builder = DesiredSetBuilder::new(&ctx, &palette, &windows);

        let mut cells = vec!["".to_string(); 31];
        cells[30] = "H".to_string();
        let row = PersonRow {
            row: 6,
            name: "John".to_string(),
            background_color: String::new(),
            cells,
        };
        let desired = builder.build(&row, &headers(31));
        let spec = desired.values().next().unwrap();
        assert_eq!(
            spec.end,
            EventTime::Date(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap())
        );
    }

    #[test]
    fn half_days_use_the_fixed_wall_clock_windows() {
        let ctx = context("March 2025");
        let palette = ColorPalette::default();
        let windows = HalfDayWindows::default();
        let builder = DesiredSetBuilder::new(&ctx, &palette, &windows);

        let mut cells = vec!["".to_string(); 31];
        cells[9] = "H1".to_string();
        cells[10] = "H2".to_string();
        let row = PersonRow {
            row: 7,
            name: "Brian".to_string(),
            background_color: String::new(),
            cells,
        };
        let desired = builder.build(&row, &headers(31));
        assert_eq!(desired.len(), 2);

        let morning = &desired["March 2025|7|Half|2025-03-10|H1"];
        let day10 = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(morning.title, "Brian - Half");
        assert!(!morning.all_day);
        assert_eq!(
            morning.start,
            EventTime::Local(day10.and_time(NaiveTime::from_hms_opt(8, 0, 0).unwrap()))
        );
        assert_eq!(
            morning.end,
            EventTime::Local(day10.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap()))
        );

        let afternoon = &desired["March 2025|7|Half|2025-03-11|H2"];
        let day11 = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        assert_eq!(
            afternoon.start,
            EventTime::Local(day11.and_time(NaiveTime::from_hms_opt(13, 0, 0).unwrap()))
        );
        assert_eq!(
            afternoon.end,
            EventTime::Local(day11.and_time(NaiveTime::from_hms_opt(17, 0, 0).unwrap()))
        );
    }

    #[test]
    fn identity_cell_background_resolves_to_an_event_color() {
        let ctx = context("March 2025");
        let palette = ColorPalette::default();
        let windows = HalfDayWindows::default();
        let builder = DesiredSetBuilder::new(&ctx, &palette, &windows);

        let desired = builder.build(&person(6, "John", "#FF0000", &["H"]), &headers(31));
        assert_eq!(
            desired.values().next().unwrap().color,
            Some(EventColor::Red)
        );

        let desired = builder.build(&person(6, "John", "#123456", &["H"]), &headers(31));
        assert_eq!(desired.values().next().unwrap().color, None);
    }

    #[test]
    fn identical_rows_produce_byte_identical_key_sets() {
        let ctx = context("March 2025");
        let palette = ColorPalette::default();
        let windows = HalfDayWindows::default();
        let builder = DesiredSetBuilder::new(&ctx, &palette, &windows);

        let row = person(6, "John", "", &["H", "H", "", "H1"]);
        let a: Vec<String> = builder.build(&row, &headers(31)).into_keys().collect();
        let b: Vec<String> = builder.build(&row, &headers(31)).into_keys().collect();
        assert_eq!(a, b);

        let other_row = person(7, "John", "", &["H", "H", "", "H1"]);
        let c: Vec<String> = builder.build(&other_row, &headers(31)).into_keys().collect();
        assert!(a.iter().all(|k| !c.contains(k)));
    }
}

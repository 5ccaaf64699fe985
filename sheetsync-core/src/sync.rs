//! Run orchestration: sheets → persons → reconcile, under one lock.
//!
//! A run is best-effort convergence: unparseable sheets and failing rows
//! are logged and skipped so one bad sheet or person never aborts the rest.
//! Only lock acquisition failure is fatal, and it aborts before any
//! mutation has started.

use std::collections::HashMap;
use std::time::Duration;

use log::{info, warn};

use crate::color::ColorPalette;
use crate::desired::{DesiredSetBuilder, SheetContext};
use crate::error::{SheetSyncError, SyncResult};
use crate::event::HalfDayWindows;
use crate::index;
use crate::reconcile::{self, ReconcilePlan, SyncStats};
use crate::store::{CalendarStore, PersonRow, RunLock, SheetData, SheetSource};

/// Static configuration for one run.
pub struct RunSettings {
    /// Person name → calendar identifier.
    pub calendars: HashMap<String, String>,
    pub palette: ColorPalette,
    pub windows: HalfDayWindows,
    pub lock_timeout: Duration,
}

/// Outcome of a run; partial convergence is an accepted result.
#[derive(Debug, Default)]
pub struct RunReport {
    pub stats: SyncStats,
    pub sheets_processed: usize,
    pub sheets_skipped: usize,
    pub rows_skipped: usize,
}

/// Reconcile every sheet against the configured calendars.
///
/// Sheets, then persons within a sheet, are processed strictly
/// sequentially; all calendar reads and writes for one person complete
/// before the next begins.
pub async fn run<S, C, L>(
    sheets: &S,
    store: &C,
    lock: &L,
    settings: &RunSettings,
) -> SyncResult<RunReport>
where
    S: SheetSource,
    C: CalendarStore,
    L: RunLock,
{
    let _guard = lock.acquire(settings.lock_timeout)?;

    let mut report = RunReport::default();
    for sheet in sheets.sheets().await? {
        let ctx = match SheetContext::from_sheet_name(&sheet.name) {
            Ok(ctx) => ctx,
            Err(err) => {
                warn!("skipping sheet: {err}");
                report.sheets_skipped += 1;
                continue;
            }
        };
        info!(
            "processing sheet {:?} ({} {}, {} days)",
            ctx.name,
            ctx.month.name(),
            ctx.year,
            ctx.days_in_month
        );

        for person in &sheet.rows {
            if person.name.trim().is_empty() {
                continue;
            }
            match sync_person(store, &ctx, &sheet, person, settings).await {
                Ok(stats) => report.stats.merge(stats),
                Err(err) => {
                    warn!(
                        "skipping row {} ({:?}) in sheet {:?}: {err}",
                        person.row, person.name, ctx.name
                    );
                    report.rows_skipped += 1;
                }
            }
        }
        report.sheets_processed += 1;
    }

    Ok(report)
}

async fn sync_person<C: CalendarStore>(
    store: &C,
    ctx: &SheetContext,
    sheet: &SheetData,
    person: &PersonRow,
    settings: &RunSettings,
) -> SyncResult<SyncStats> {
    let (calendar_id, plan) = person_plan(store, ctx, sheet, person, settings).await?;
    reconcile::apply(store, &calendar_id, &plan).await
}

async fn person_plan<C: CalendarStore>(
    store: &C,
    ctx: &SheetContext,
    sheet: &SheetData,
    person: &PersonRow,
    settings: &RunSettings,
) -> SyncResult<(String, ReconcilePlan)> {
    let name = person.name.trim();
    let calendar_id = settings
        .calendars
        .get(name)
        .ok_or_else(|| SheetSyncError::Mapping(name.to_string()))?;

    let builder = DesiredSetBuilder::new(ctx, &settings.palette, &settings.windows);
    let desired = builder.build(person, &sheet.day_headers);

    let (month_start, month_end) = ctx.month_window();
    let existing = index::index_owned(
        store
            .events_between(calendar_id, month_start, month_end)
            .await?,
    );

    Ok((calendar_id.clone(), reconcile::plan(&desired, &existing)))
}

/// The plan for one person within one sheet.
pub struct PersonPlan {
    pub person: String,
    pub calendar_id: String,
    pub plan: ReconcilePlan,
}

/// Plans for every person of one sheet.
pub struct SheetPreview {
    pub sheet: String,
    pub plans: Vec<PersonPlan>,
}

/// Compute every plan a run would apply, without the lock and without
/// issuing any mutation.
pub async fn preview<S, C>(
    sheets: &S,
    store: &C,
    settings: &RunSettings,
) -> SyncResult<Vec<SheetPreview>>
where
    S: SheetSource,
    C: CalendarStore,
{
    let mut previews = Vec::new();
    for sheet in sheets.sheets().await? {
        let ctx = match SheetContext::from_sheet_name(&sheet.name) {
            Ok(ctx) => ctx,
            Err(err) => {
                warn!("skipping sheet: {err}");
                continue;
            }
        };

        let mut plans = Vec::new();
        for person in &sheet.rows {
            if person.name.trim().is_empty() {
                continue;
            }
            match person_plan(store, &ctx, &sheet, person, settings).await {
                Ok((calendar_id, plan)) => plans.push(PersonPlan {
                    person: person.name.trim().to_string(),
                    calendar_id,
                    plan,
                }),
                Err(err) => warn!(
                    "skipping row {} ({:?}) in sheet {:?}: {err}",
                    person.row, person.name, ctx.name
                ),
            }
        }
        previews.push(SheetPreview {
            sheet: ctx.name,
            plans,
        });
    }
    Ok(previews)
}

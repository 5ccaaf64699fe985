mod config;
mod lock;
mod provider;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::warn;

use provider::{CalendarProvider, SheetProvider};
use sheetsync_core::sync;

#[derive(Parser)]
#[command(name = "sheetsync")]
#[command(about = "Sync monthly absence sheets from a spreadsheet to per-person calendars")]
struct Cli {
    /// Path to an alternate config file
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every sheet against the configured calendars
    Sync,
    /// Show the changes a sync would make, without applying them
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Sync => cmd_sync(&cfg).await,
        Commands::Status => cmd_status(&cfg).await,
    }
}

async fn cmd_sync(cfg: &config::Config) -> Result<()> {
    let timezone = cfg.timezone()?;
    let settings = cfg.run_settings()?;

    let sheets = SheetProvider::from_config(&cfg.spreadsheet)?;
    let store = CalendarProvider::from_config(&cfg.calendar, &timezone)?;
    let lock = lock::FileLock::new(config::lock_path()?);

    let report = sync::run(&sheets, &store, &lock, &settings).await?;

    println!(
        "{} created, {} updated, {} deleted across {} sheets",
        report.stats.created, report.stats.updated, report.stats.deleted, report.sheets_processed
    );
    if report.sheets_skipped > 0 || report.rows_skipped > 0 {
        warn!(
            "skipped {} sheets and {} rows, see warnings above",
            report.sheets_skipped, report.rows_skipped
        );
    }

    Ok(())
}

async fn cmd_status(cfg: &config::Config) -> Result<()> {
    let timezone = cfg.timezone()?;
    let settings = cfg.run_settings()?;

    let sheets = SheetProvider::from_config(&cfg.spreadsheet)?;
    let store = CalendarProvider::from_config(&cfg.calendar, &timezone)?;

    let previews = sync::preview(&sheets, &store, &settings).await?;

    let mut any_changes = false;
    for preview in &previews {
        let changed: Vec<_> = preview
            .plans
            .iter()
            .filter(|p| p.plan.has_changes())
            .collect();
        if changed.is_empty() {
            continue;
        }
        any_changes = true;

        println!("\n{}", preview.sheet);
        for person_plan in changed {
            println!("  {} ({})", person_plan.person, person_plan.calendar_id);
            for spec in &person_plan.plan.to_create {
                println!("    + {} [{}]", spec.title, spec.key);
            }
            for update in person_plan.plan.to_update.iter().filter(|u| !u.is_refresh_only()) {
                println!("    ~ {}", update.event_id);
                if let Some(title) = &update.title {
                    println!("        title -> {:?}", title);
                }
                if let Some(color) = &update.color {
                    println!("        color -> {:?}", color);
                }
            }
            for event in &person_plan.plan.to_delete {
                println!("    - {} [{}]", event.title, event.id);
            }
        }
    }

    if !any_changes {
        println!("Everything up to date.");
    } else {
        println!("\nRun `sheetsync sync` to apply these changes.");
    }

    Ok(())
}

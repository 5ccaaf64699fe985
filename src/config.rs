use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sheetsync_core::color::{ColorPalette, EventColor};
use sheetsync_core::event::{HalfDayWindows, TimeWindow};
use sheetsync_core::sync::RunSettings;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// IANA timezone id used for all date interpretation (e.g. "Europe/Berlin")
    pub timezone: String,

    /// Seconds to wait for the run lock before aborting
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,

    /// Spreadsheet source provider
    pub spreadsheet: ProviderConfig,

    /// Calendar sink provider
    pub calendar: ProviderConfig,

    /// Person name -> calendar identifier
    pub people: HashMap<String, String>,

    /// Optional palette override: hex background color -> event color.
    /// When present it replaces the built-in six-entry table.
    #[serde(default)]
    pub colors: Option<HashMap<String, EventColor>>,

    /// Optional half-day wall-clock window override
    #[serde(default)]
    pub half_day: Option<HalfDayConfig>,
}

/// A provider name plus whatever extra keys the provider binary needs
/// (spreadsheet id, account, ...), passed through untouched.
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    pub provider: String,
    #[serde(flatten)]
    pub params: HashMap<String, toml::Value>,
}

/// Half-day windows as "HH:MM" strings.
#[derive(Debug, Deserialize)]
pub struct HalfDayConfig {
    pub morning_start: String,
    pub morning_end: String,
    pub afternoon_start: String,
    pub afternoon_end: String,
}

fn default_lock_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Validate and resolve the configured timezone.
    pub fn timezone(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown timezone id in config: {}", self.timezone))
    }

    pub fn palette(&self) -> ColorPalette {
        match &self.colors {
            Some(entries) => ColorPalette::new(entries.clone()),
            None => ColorPalette::default(),
        }
    }

    pub fn windows(&self) -> Result<HalfDayWindows> {
        match &self.half_day {
            Some(half_day) => half_day.windows(),
            None => Ok(HalfDayWindows::default()),
        }
    }

    pub fn run_settings(&self) -> Result<RunSettings> {
        Ok(RunSettings {
            calendars: self.people.clone(),
            palette: self.palette(),
            windows: self.windows()?,
            lock_timeout: Duration::from_secs(self.lock_timeout_secs),
        })
    }
}

impl HalfDayConfig {
    fn windows(&self) -> Result<HalfDayWindows> {
        Ok(HalfDayWindows {
            morning: TimeWindow {
                start: parse_time(&self.morning_start)?,
                end: parse_time(&self.morning_end)?,
            },
            afternoon: TimeWindow {
                start: parse_time(&self.afternoon_start)?,
                end: parse_time(&self.afternoon_end)?,
            },
        })
    }
}

fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .with_context(|| format!("Invalid half-day time {value:?} (expected HH:MM)"))
}

/// Get the config directory path (~/.config/sheetsync)
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("sheetsync");
    Ok(config_dir)
}

/// Get the config file path (~/.config/sheetsync/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the run lock file path (~/.config/sheetsync/run.lock)
pub fn lock_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("run.lock"))
}

/// Load config from the default path or an explicit override.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config_path()?,
    };

    if !path.exists() {
        anyhow::bail!(
            "Config file not found at {}\n\n\
            Create it with your providers and calendar mapping:\n\n\
            timezone = \"Europe/Berlin\"\n\n\
            [spreadsheet]\n\
            provider = \"gsheets\"\n\
            spreadsheet_id = \"your-spreadsheet-id\"\n\n\
            [calendar]\n\
            provider = \"gcal\"\n\
            account = \"you@example.com\"\n\n\
            [people]\n\
            John = \"john-calendar-id@group.calendar.google.com\"",
            path.display()
        );
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    parse_config(&contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))
}

fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents)?;
    // Surface bad timezone and window values at load time, not mid-run.
    config.timezone()?;
    config.windows()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        timezone = "Europe/Berlin"

        [spreadsheet]
        provider = "gsheets"
        spreadsheet_id = "abc123"

        [calendar]
        provider = "gcal"
        account = "team@example.com"

        [people]
        John = "cal-john"
        Brian = "cal-brian"
    "#;

    #[test]
    fn parses_a_minimal_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.timezone, "Europe/Berlin");
        assert_eq!(config.lock_timeout_secs, 30);
        assert_eq!(config.spreadsheet.provider, "gsheets");
        assert_eq!(
            config.spreadsheet.params["spreadsheet_id"],
            toml::Value::String("abc123".to_string())
        );
        assert_eq!(config.people["John"], "cal-john");
        assert!(config.timezone().is_ok());
    }

    #[test]
    fn rejects_an_unknown_timezone() {
        let contents = SAMPLE.replace("Europe/Berlin", "Mars/Olympus_Mons");
        assert!(parse_config(&contents).is_err());
    }

    #[test]
    fn color_override_replaces_the_default_palette() {
        let contents = format!("{SAMPLE}\n[colors]\n\"#123456\" = \"purple\"\n");
        let config = parse_config(&contents).unwrap();
        let palette = config.palette();
        assert_eq!(palette.resolve("#123456"), Some(EventColor::Purple));
        assert_eq!(palette.resolve("#ffff00"), None);
    }

    #[test]
    fn half_day_override_parses_hh_mm_times() {
        let contents = format!(
            "{SAMPLE}\n[half_day]\n\
            morning_start = \"09:00\"\nmorning_end = \"12:30\"\n\
            afternoon_start = \"13:30\"\nafternoon_end = \"18:00\"\n"
        );
        let config = parse_config(&contents).unwrap();
        let windows = config.windows().unwrap();
        assert_eq!(
            windows.morning.start,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(
            windows.afternoon.end,
            NaiveTime::from_hms_opt(18, 0, 0).unwrap()
        );

        let bad = format!("{SAMPLE}\n[half_day]\nmorning_start = \"9am\"\nmorning_end = \"12:00\"\nafternoon_start = \"13:00\"\nafternoon_end = \"17:00\"\n");
        assert!(parse_config(&bad).is_err());
    }
}

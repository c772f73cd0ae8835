//! Layered settings resolution.
//!
//! Settings are merged in a fixed order, later stages winning per key:
//!
//! 1. built-in defaults ([`Settings::default`])
//! 2. the optional JSON config file (unknown keys are kept)
//! 3. command-line overrides (only the ones actually given)
//! 4. the `test` preset
//! 5. default output file name, unless in test mode
//! 6. the `fast` preset
//!
//! The result is an immutable [`Settings`] value that is passed by reference
//! to every later stage of a run.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

/// Catalog page scraped when no `source` is configured.
pub const DEFAULT_SOURCE: &str = "https://www.protondb.com/explore";

/// Browser executable used when no `driver` is configured.
pub const DEFAULT_DRIVER: &str = "/usr/bin/chromium";

/// Prefix of the synthesized output file name.
pub const OUTPUT_PREFIX: &str = "protondb";

/// Sort orders understood by the catalog.
pub const SORT_KEYS: [&str; 6] = [
    "recentlyImproved",
    "wilsonRating",
    "playerCount",
    "userScore",
    "mostBorked",
    "fixWanted",
];

/// Fully resolved run settings.
///
/// Field order is the order keys appear in `--printconfig` output and in
/// the database header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Config file the settings were read from, if any.
    pub config: Option<PathBuf>,
    /// Database file to create. Unset in test mode.
    pub output: Option<String>,
    /// Path to the browser executable.
    pub driver: String,
    /// Launch the browser with lean, faster-loading options.
    pub optimize: bool,
    /// Catalog page the page URLs are built from.
    pub source: String,
    pub sort: String,
    /// Include Linux-native games.
    pub native: bool,
    pub maxpages: u32,
    pub initpage: u32,
    /// Number of PageDown presses per page.
    pub pagedown: u32,
    /// Seconds to wait between browser steps.
    pub wait: f64,
    pub printconfig: bool,
    pub test: bool,
    pub fast: bool,
    /// Config file keys without a matching field, echoed into the header.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config: None,
            output: None,
            driver: DEFAULT_DRIVER.to_string(),
            optimize: false,
            source: DEFAULT_SOURCE.to_string(),
            sort: "wilsonRating".to_string(),
            native: false,
            // 50 games per page
            maxpages: 20,
            initpage: 0,
            pagedown: 10,
            wait: 0.4,
            printconfig: false,
            test: false,
            fast: false,
            extra: Map::new(),
        }
    }
}

impl Settings {
    /// The configured `wait` as a duration. Negative values count as zero.
    pub fn wait_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.wait).unwrap_or(Duration::ZERO)
    }

    /// Serialize every setting, in declaration order, followed by passthrough keys.
    pub fn to_map(&self) -> Result<Map<String, Value>, AppError> {
        into_object(serde_json::to_value(self)?)
    }
}

/// Values given on the command line.
///
/// `None` means "not given" and never masks a lower layer. This matters for
/// the boolean flags: an absent `--native` must not override `"native": true`
/// from the config file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxpages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initpage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagedown: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printconfig: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fast: Option<bool>,
}

/// Named override bundles applied after every other layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Short, verbose run that never writes a database file.
    Test,
    /// Optimized browser and minimal waiting. Applied last.
    Fast,
}

impl Preset {
    pub fn is_enabled(self, settings: &Settings) -> bool {
        match self {
            Preset::Test => settings.test,
            Preset::Fast => settings.fast,
        }
    }

    pub fn apply(self, settings: &mut Settings) {
        match self {
            Preset::Test => {
                settings.optimize = false;
                settings.maxpages = 2;
                settings.initpage = 0;
                settings.pagedown = 10;
                settings.wait = 1.0;
                settings.output = None;
                settings.printconfig = true;
            }
            Preset::Fast => {
                settings.optimize = true;
                settings.wait = 0.1;
            }
        }
    }
}

/// Resolve settings for a run started now.
pub fn resolve(overrides: &SettingsOverrides) -> Result<Settings, AppError> {
    resolve_on(overrides, Utc::now().date_naive())
}

/// Resolve settings as if the run started on `today` (UTC).
///
/// A missing config file is reported as a warning and skipped. A config file
/// that exists but is unreadable, not a JSON object, or holds a value of the
/// wrong type for a known setting is an error.
pub fn resolve_on(overrides: &SettingsOverrides, today: NaiveDate) -> Result<Settings, AppError> {
    let mut merged = Settings::default().to_map()?;

    if let Some(path) = &overrides.config {
        match read_config_file(path) {
            Ok(file) => merged.extend(file),
            Err(err @ AppError::ConfigNotFound(_)) => tracing::warn!("{err}"),
            Err(err) => return Err(err),
        }
    }

    merged.extend(into_object(serde_json::to_value(overrides)?)?);

    let mut settings: Settings = serde_json::from_value(Value::Object(merged))
        .map_err(|e| AppError::ConfigError(format!("Invalid setting: {e}")))?;

    if Preset::Test.is_enabled(&settings) {
        Preset::Test.apply(&mut settings);
    } else if settings.output.as_deref().is_none_or(str::is_empty) {
        settings.output = Some(default_output_name(&settings.sort, today));
    }

    if Preset::Fast.is_enabled(&settings) {
        Preset::Fast.apply(&mut settings);
    }

    tracing::debug!(?settings, "Settings resolved");
    Ok(settings)
}

/// `protondb-<sort>-<YYYY-MM-DD>.json`
pub fn default_output_name(sort: &str, today: NaiveDate) -> String {
    format!("{OUTPUT_PREFIX}-{sort}-{}.json", today.format("%Y-%m-%d"))
}

fn read_config_file(path: &Path) -> Result<Map<String, Value>, AppError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(AppError::ConfigNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(AppError::ConfigError(format!(
                "Failed to read {}: {e}",
                path.display()
            )));
        }
    };

    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| AppError::ConfigError(format!("Invalid JSON in {}: {e}", path.display())))?;

    into_object(value).map_err(|_| {
        AppError::ConfigError(format!("{} must contain a JSON object", path.display()))
    })
}

fn into_object(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AppError::ConfigError(format!(
            "Expected a JSON object, found {other}"
        ))),
    }
}

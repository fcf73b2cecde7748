use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use dirs::home_dir;
use serde::Deserialize;
use toml::Value as TomlValue;

use crate::daylight::DEFAULT_DAY_END_HOUR;
use crate::daylight::DEFAULT_DAY_START_HOUR;
use crate::daylight::DayWindow;
use crate::daylight::Theme;
use crate::error::AutoThemeErr;
use crate::error::Result;

pub const CONFIG_TOML_FILE: &str = "config.toml";
pub const AUTOTHEME_HOME_ENV_VAR: &str = "AUTOTHEME_HOME";

pub const DEFAULT_DAY_PRESET: &str = "GruvboxLight";
pub const DEFAULT_NIGHT_PRESET: &str = "GruvboxDark";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

const DEFAULT_SOCKET_FILE: &str = "host.sock";

/// What to apply, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSchedule {
    pub day_preset: String,
    pub night_preset: String,
    pub window: DayWindow,
    pub poll_interval: Duration,
}

impl Default for ThemeSchedule {
    fn default() -> Self {
        Self {
            day_preset: DEFAULT_DAY_PRESET.to_string(),
            night_preset: DEFAULT_NIGHT_PRESET.to_string(),
            window: DayWindow::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ThemeSchedule {
    pub fn preset_for(&self, theme: Theme) -> &str {
        match theme {
            Theme::Day => &self.day_preset,
            Theme::Night => &self.night_preset,
        }
    }

    /// Both preset names, day first.
    pub fn required_presets(&self) -> [&str; 2] {
        [self.day_preset.as_str(), self.night_preset.as_str()]
    }
}

/// Application configuration loaded from disk and merged with overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub schedule: ThemeSchedule,

    /// Unix socket the host bridge listens on.
    pub socket_path: PathBuf,

    /// Directory containing all autotheme state (defaults to `~/.autotheme`
    /// but can be overridden by the `AUTOTHEME_HOME` environment variable).
    pub autotheme_home: PathBuf,
}

/// Base config deserialized from `~/.autotheme/config.toml`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigToml {
    pub day_preset: Option<String>,
    pub night_preset: Option<String>,
    pub day_start_hour: Option<u32>,
    pub day_end_hour: Option<u32>,
    pub poll_interval_secs: Option<u64>,
    pub socket_path: Option<PathBuf>,
}

/// Optional overrides for user configuration (e.g., from CLI flags).
#[derive(Default, Debug, Clone)]
pub struct ConfigOverrides {
    pub socket_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration, optionally applying overrides (CLI flags). Merges
    /// `~/.autotheme/config.toml`, the `-c key=value` overrides and any
    /// values provided in `overrides` (highest precedence).
    pub fn load_with_cli_overrides(
        cli_overrides: Vec<(String, TomlValue)>,
        overrides: ConfigOverrides,
    ) -> Result<Self> {
        let autotheme_home = find_autotheme_home()?;
        let mut root_value = load_config_as_toml(&autotheme_home)?;

        for (path, value) in cli_overrides {
            apply_toml_override(&mut root_value, &path, value);
        }

        let cfg: ConfigToml = root_value.try_into().map_err(|e| {
            AutoThemeErr::InvalidConfig(format!("failed to deserialize {CONFIG_TOML_FILE}: {e}"))
        })?;

        Self::load_from_base_config_with_overrides(cfg, overrides, autotheme_home)
    }

    /// Meant to be used exclusively for tests: `load_with_cli_overrides()`
    /// should be used in all other cases.
    pub fn load_from_base_config_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
        autotheme_home: PathBuf,
    ) -> Result<Self> {
        let defaults = ThemeSchedule::default();

        let window = DayWindow::new(
            cfg.day_start_hour.unwrap_or(DEFAULT_DAY_START_HOUR),
            cfg.day_end_hour.unwrap_or(DEFAULT_DAY_END_HOUR),
        );
        if window.start > 23 || window.end > 24 || window.start >= window.end {
            return Err(AutoThemeErr::InvalidConfig(format!(
                "day window {}..{} must satisfy start < end with start <= 23 and end <= 24",
                window.start, window.end
            )));
        }

        let poll_interval = match cfg.poll_interval_secs {
            Some(0) => {
                return Err(AutoThemeErr::InvalidConfig(
                    "poll_interval_secs must be greater than zero".to_string(),
                ));
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.poll_interval,
        };

        let day_preset = non_empty(cfg.day_preset, "day_preset")?.unwrap_or(defaults.day_preset);
        let night_preset =
            non_empty(cfg.night_preset, "night_preset")?.unwrap_or(defaults.night_preset);

        let socket_path = overrides
            .socket_path
            .or(cfg.socket_path)
            .unwrap_or_else(|| autotheme_home.join(DEFAULT_SOCKET_FILE));

        Ok(Self {
            schedule: ThemeSchedule {
                day_preset,
                night_preset,
                window,
                poll_interval,
            },
            socket_path,
            autotheme_home,
        })
    }
}

fn non_empty(value: Option<String>, field: &str) -> Result<Option<String>> {
    match value {
        Some(name) if name.trim().is_empty() => Err(AutoThemeErr::InvalidConfig(format!(
            "{field} must not be empty"
        ))),
        other => Ok(other),
    }
}

/// Reads `config.toml` from `autotheme_home`. A missing file yields an empty
/// table so callers can layer overrides on top of it.
pub fn load_config_as_toml(autotheme_home: &Path) -> Result<TomlValue> {
    let config_toml_path = autotheme_home.join(CONFIG_TOML_FILE);
    match std::fs::read_to_string(&config_toml_path) {
        Ok(contents) => match toml::from_str::<toml::Table>(&contents) {
            Ok(table) => Ok(TomlValue::Table(table)),
            Err(e) => {
                tracing::error!("Failed to parse {}: {e}", config_toml_path.display());
                Err(AutoThemeErr::InvalidConfig(format!(
                    "{}: {e}",
                    config_toml_path.display()
                )))
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("{} not found, using defaults", config_toml_path.display());
            Ok(TomlValue::Table(Default::default()))
        }
        Err(e) => {
            tracing::error!("Failed to read {}: {e}", config_toml_path.display());
            Err(e.into())
        }
    }
}

/// Apply a single dotted-path override onto `root`, creating intermediate
/// tables as necessary and replacing whatever sat at the leaf.
fn apply_toml_override(root: &mut TomlValue, path: &str, value: TomlValue) {
    use toml::value::Table;

    let segments: Vec<&str> = path.split('.').collect();
    let mut current = root;

    for (idx, segment) in segments.iter().enumerate() {
        let is_last = idx == segments.len() - 1;

        if is_last {
            match current {
                TomlValue::Table(table) => {
                    table.insert((*segment).to_string(), value);
                }
                _ => {
                    let mut table = Table::new();
                    table.insert((*segment).to_string(), value);
                    *current = TomlValue::Table(table);
                }
            }
            return;
        }

        if !current.is_table() {
            *current = TomlValue::Table(Table::new());
        }
        let TomlValue::Table(table) = current else {
            return;
        };
        current = table
            .entry((*segment).to_string())
            .or_insert_with(|| TomlValue::Table(Table::new()));
    }
}

/// Returns the path to the autotheme configuration directory, which can be
/// specified by the `AUTOTHEME_HOME` environment variable. If not set,
/// defaults to `~/.autotheme`.
///
/// - If `AUTOTHEME_HOME` is set, the value is used as-is.
/// - If `AUTOTHEME_HOME` is not set, this function does not verify that the
///   directory exists.
pub fn find_autotheme_home() -> std::io::Result<PathBuf> {
    if let Ok(val) = std::env::var(AUTOTHEME_HOME_ENV_VAR)
        && !val.is_empty()
    {
        return Ok(PathBuf::from(val));
    }

    let mut p = home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        )
    })?;
    p.push(".autotheme");
    Ok(p)
}

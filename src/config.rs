use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::ConfigError;

const DEFAULT_OPTIN_FILE: &str = "optedInUsers.json";
const DEFAULT_ARTIFACT_DIR: &str = "./calendars";
const DEFAULT_RETENTION_DAYS: u64 = 5;
const DEFAULT_MAINTENANCE_SECS: u64 = 60 * 60;

/// `KEY=VALUE` pairs read from an env-style file.
#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let values = content
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| parse_entry(line).map(|entry| (idx + 1, line, entry)))
            .map(|(line, content, entry)| {
                entry.ok_or_else(|| ConfigError::InvalidLine {
                    line,
                    content: content.to_string(),
                })
            })
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// `None` for blank and comment lines, `Some(None)` for a line without `=`.
fn parse_entry(line: &str) -> Option<Option<(String, String)>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let entry = line
        .split_once('=')
        .map(|(key, value)| (key.trim().to_string(), unquote(value.trim()).to_string()));
    Some(entry)
}

fn unquote(value: &str) -> &str {
    ['"', '\'']
        .iter()
        .find_map(|&quote| value.strip_prefix(quote)?.strip_suffix(quote))
        .unwrap_or(value)
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: Option<String>,
    pub optin_file: PathBuf,
    pub artifact_dir: PathBuf,
    pub artifact_retention: Duration,
    pub event_timezone: Tz,
    pub maintenance_interval: Duration,
}

impl Settings {
    /// Resolves every setting from the config file first, then `lookup`
    /// (normally the process environment).
    pub fn resolve<F>(config: &AppConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_prop = |key: &str| -> Option<String> { config.get(key).or_else(|| lookup(key)) };

        let event_timezone = match get_prop("EVENT_TIMEZONE") {
            Some(name) => name.parse::<Tz>().map_err(|_| ConfigError::InvalidValue {
                key: "EVENT_TIMEZONE",
                value: name,
            })?,
            None => Tz::UTC,
        };
        let retention_days = parse_number(&get_prop, "ARTIFACT_RETENTION_DAYS", DEFAULT_RETENTION_DAYS)?;
        let artifact_retention = retention_days
            .checked_mul(24 * 60 * 60)
            .map(Duration::from_secs)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "ARTIFACT_RETENTION_DAYS",
                value: retention_days.to_string(),
            })?;
        let maintenance_secs = parse_number(&get_prop, "MAINTENANCE_INTERVAL_SECS", DEFAULT_MAINTENANCE_SECS)?;
        if maintenance_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MAINTENANCE_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            discord_token: get_prop("DISCORD_TOKEN").filter(|t| !t.trim().is_empty()),
            optin_file: get_prop("OPTIN_FILE")
                .unwrap_or_else(|| DEFAULT_OPTIN_FILE.to_string())
                .into(),
            artifact_dir: get_prop("ARTIFACT_DIR")
                .unwrap_or_else(|| DEFAULT_ARTIFACT_DIR.to_string())
                .into(),
            artifact_retention,
            event_timezone,
            maintenance_interval: Duration::from_secs(maintenance_secs),
        })
    }

    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.discord_token
            .as_deref()
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))
    }
}

fn parse_number<F>(get_prop: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match get_prop(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

use crate::ingest::merger::MatchStrategy;
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const UTC: FixedOffset = match FixedOffset::east_opt(0) {
    Some(offset) => offset,
    None => panic!("invalid offset"),
};

/// Application configuration loaded from environment variables or TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Path to a MaxMind GeoLite2 .mmdb file for IP geolocation.
    /// If not set or file is missing, lookups return "Unknown" placeholders.
    #[serde(default)]
    pub geoip_db_path: Option<PathBuf>,
    /// How incoming events are matched to existing sessions.
    #[serde(default)]
    pub match_strategy: MatchStrategy,
    /// Hour offset from UTC used for the activity-by-hour report.
    #[serde(default)]
    pub utc_offset_hours: i32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            geoip_db_path: None,
            match_strategy: MatchStrategy::default(),
            utc_offset_hours: 0,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults.
    ///
    /// Environment variables override file values:
    /// - `SITELYTICS_HOST` → host
    /// - `SITELYTICS_PORT` → port
    /// - `SITELYTICS_DATA_DIR` → data_dir
    /// - `SITELYTICS_GEOIP_DB` → geoip_db_path
    /// - `SITELYTICS_MATCH_STRATEGY` → match_strategy
    /// - `SITELYTICS_UTC_OFFSET` → utc_offset_hours
    pub fn load(config_path: Option<&Path>) -> Self {
        let mut config =
            config_path.map_or_else(Self::default, |path| match std::fs::read_to_string(path) {
                Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                    tracing::warn!("Failed to parse config file: {e}, using defaults");
                    Self::default()
                }),
                Err(e) => {
                    tracing::warn!("Failed to read config file: {e}, using defaults");
                    Self::default()
                }
            });

        // Environment variable overrides
        if let Ok(host) = std::env::var("SITELYTICS_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("SITELYTICS_PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }
        if let Ok(data_dir) = std::env::var("SITELYTICS_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(geoip) = std::env::var("SITELYTICS_GEOIP_DB") {
            config.geoip_db_path = Some(PathBuf::from(geoip));
        }
        if let Ok(val) = std::env::var("SITELYTICS_MATCH_STRATEGY") {
            match val.parse() {
                Ok(strategy) => config.match_strategy = strategy,
                Err(e) => tracing::warn!("{e}, keeping configured strategy"),
            }
        }
        if let Ok(val) = std::env::var("SITELYTICS_UTC_OFFSET") {
            if let Ok(hours) = val.parse() {
                config.utc_offset_hours = hours;
            }
        }

        config
    }

    /// Returns the configured UTC offset, falling back to UTC when the
    /// hour value is outside the valid -23..=23 range.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| {
            tracing::warn!(
                hours = self.utc_offset_hours,
                "UTC offset out of range, using UTC"
            );
            UTC
        })
    }
}

//! Runtime configuration for scheduling and logging.
//!
//! # Responsibility
//! - Describe business hours, horizon and availability seeding.
//! - Load configuration from JSON text or the process environment.
//!
//! # Invariants
//! - A validated `SchedulingConfig` always yields at least one slot per open day.
//! - Missing JSON fields fall back to salon defaults.

use crate::logging::default_log_level;
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Env var holding a path to a JSON config file.
pub const ENV_CONFIG_PATH: &str = "SALON_CONFIG";
/// Env var overriding `scheduling.seed`.
pub const ENV_SEED: &str = "SALON_SEED";
/// Env var overriding `logging.level`.
pub const ENV_LOG_LEVEL: &str = "SALON_LOG_LEVEL";
/// Env var overriding `logging.log_dir`.
pub const ENV_LOG_DIR: &str = "SALON_LOG_DIR";

const DEFAULT_HORIZON_DAYS: u32 = 30;
const DEFAULT_OPEN_HOUR: u32 = 9;
const DEFAULT_CLOSE_HOUR: u32 = 18;
const DEFAULT_SLOT_MINUTES: u32 = 60;
const DEFAULT_OPEN_PROBABILITY: f64 = 0.7;

/// Configuration loading/validation error.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    InvalidSeed(String),
    ZeroHorizon,
    InvalidHours { open_hour: u32, close_hour: u32 },
    InvalidSlotLength(u32),
    InvalidProbability(f64),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::InvalidSeed(raw) => write!(f, "{ENV_SEED} must be an unsigned integer, got `{raw}`"),
            Self::ZeroHorizon => write!(f, "horizon_days must be at least 1"),
            Self::InvalidHours {
                open_hour,
                close_hour,
            } => write!(
                f,
                "business hours must satisfy open_hour < close_hour <= 23, got {open_hour}..{close_hour}"
            ),
            Self::InvalidSlotLength(minutes) => write!(
                f,
                "slot_minutes must be positive and evenly divide business hours, got {minutes}"
            ),
            Self::InvalidProbability(value) => {
                write!(f, "open_probability must be within 0.0..=1.0, got {value}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SalonConfig {
    pub scheduling: SchedulingConfig,
    pub logging: LoggingConfig,
}

impl SalonConfig {
    /// Parses and validates configuration from JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.scheduling.validate()?;
        Ok(config)
    }

    /// Reads and validates configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Loads configuration from the process environment.
    ///
    /// Starts from `SALON_CONFIG` (or defaults when unset), then applies
    /// `SALON_SEED`, `SALON_LOG_LEVEL` and `SALON_LOG_DIR` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Same as [`SalonConfig::from_env`], reading variables through `lookup`.
    ///
    /// Blank values count as unset.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = match var(ENV_CONFIG_PATH) {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };

        if let Some(raw) = var(ENV_SEED) {
            let seed = raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeed(raw.clone()))?;
            config.scheduling.seed = Some(seed);
        }
        if let Some(level) = var(ENV_LOG_LEVEL) {
            config.logging.level = level;
        }
        if let Some(dir) = var(ENV_LOG_DIR) {
            config.logging.log_dir = Some(dir);
        }

        config.scheduling.validate()?;
        Ok(config)
    }
}

/// Slot generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Consecutive calendar days covered, starting at the generation date.
    pub horizon_days: u32,
    /// First slot start hour (inclusive).
    pub open_hour: u32,
    /// Business close hour (exclusive end of the last slot).
    pub close_hour: u32,
    pub slot_minutes: u32,
    /// Weekly day without slots. `None` keeps every day open.
    pub closed_weekday: Option<Weekday>,
    /// Chance that a generated slot starts open.
    pub open_probability: f64,
    /// Seed for availability draws. `None` draws a fresh seed per store.
    pub seed: Option<u64>,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            open_hour: DEFAULT_OPEN_HOUR,
            close_hour: DEFAULT_CLOSE_HOUR,
            slot_minutes: DEFAULT_SLOT_MINUTES,
            closed_weekday: Some(Weekday::Sun),
            open_probability: DEFAULT_OPEN_PROBABILITY,
            seed: None,
        }
    }
}

impl SchedulingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon_days == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        if self.open_hour >= self.close_hour || self.close_hour > 23 {
            return Err(ConfigError::InvalidHours {
                open_hour: self.open_hour,
                close_hour: self.close_hour,
            });
        }
        let business_minutes = (self.close_hour - self.open_hour) * 60;
        if self.slot_minutes == 0 || business_minutes % self.slot_minutes != 0 {
            return Err(ConfigError::InvalidSlotLength(self.slot_minutes));
        }
        if !(0.0..=1.0).contains(&self.open_probability) {
            return Err(ConfigError::InvalidProbability(self.open_probability));
        }
        Ok(())
    }

    /// Number of slots per professional per open day.
    pub fn slots_per_day(&self) -> u32 {
        (self.close_hour.saturating_sub(self.open_hour) * 60) / self.slot_minutes.max(1)
    }

    /// Start times of every slot in one open day, in order.
    pub fn slot_starts(&self) -> Vec<NaiveTime> {
        (0..self.slots_per_day())
            .filter_map(|index| {
                let minutes = self.open_hour * 60 + index * self.slot_minutes;
                NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
            })
            .collect()
    }
}

/// Logging parameters consumed by `logging::init_logging`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute log directory. `None` leaves file logging disabled.
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

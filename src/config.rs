// config.rs

use crate::scheduler::DEFAULT_IDLE_POLL;
use crate::tap_clock::{TempoConfig, DEFAULT_MIN_GOOD_TAPS, DEFAULT_TOLERANCE_PERMILLE};
use crate::tap_window::DEFAULT_WINDOW_SIZE;
use config::{Config, Environment, File};
use log::{debug, LevelFilter};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `TAPSYNC_WINDOW_SIZE=8`.
pub const ENV_PREFIX: &str = "TAPSYNC";

/// Smallest window that still yields a median of two or more deltas.
const MIN_WINDOW_SIZE: usize = 3;
const MAX_IDLE_POLL_MS: u64 = 100;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables of the player, layered from defaults, an optional file and the
/// environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub window_size: usize,
    pub tolerance_permille: u64,
    pub min_good_taps: usize,
    pub idle_poll_ms: u64,
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            tolerance_permille: DEFAULT_TOLERANCE_PERMILLE,
            min_good_taps: DEFAULT_MIN_GOOD_TAPS,
            idle_poll_ms: DEFAULT_IDLE_POLL.as_millis() as u64,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Settings {
    /// Loads settings from `path` (if given) and `TAPSYNC_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, SettingsError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("window_size", defaults.window_size as i64)?
            .set_default("tolerance_permille", defaults.tolerance_permille as i64)?
            .set_default("min_good_taps", defaults.min_good_taps as i64)?
            .set_default("idle_poll_ms", defaults.idle_poll_ms as i64)?
            .set_default("log_level", defaults.log_level)?;

        if let Some(path) = path {
            debug!("Reading settings from {}", path.display());
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        debug!("Settings loaded: {:?}", settings);
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.window_size < MIN_WINDOW_SIZE {
            return Err(invalid(
                "window_size",
                format!("must be at least {}", MIN_WINDOW_SIZE),
            ));
        }
        if self.min_good_taps == 0 || self.min_good_taps >= self.window_size {
            return Err(invalid(
                "min_good_taps",
                format!("must be between 1 and {}", self.window_size - 1),
            ));
        }
        if self.tolerance_permille >= 1000 {
            return Err(invalid("tolerance_permille", "must be below 1000".into()));
        }
        if self.idle_poll_ms == 0 || self.idle_poll_ms > MAX_IDLE_POLL_MS {
            return Err(invalid(
                "idle_poll_ms",
                format!("must be between 1 and {}", MAX_IDLE_POLL_MS),
            ));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn tempo_config(&self) -> TempoConfig {
        TempoConfig {
            window_size: self.window_size,
            tolerance_permille: self.tolerance_permille,
            min_good_taps: self.min_good_taps,
        }
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    pub fn level_filter(&self) -> Result<LevelFilter, SettingsError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| invalid("log_level", format!("unknown level {:?}", self.log_level)))
    }
}

fn invalid(field: &'static str, reason: String) -> SettingsError {
    SettingsError::Invalid { field, reason }
}

//! Engine configuration and its on-disk TOML form.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Tunable parameters for ladder generation and analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Distance between adjacent strikes
    pub strike_gap: f64,
    /// Number of strikes on each side of ATM
    pub ladder_half_width: u32,
    /// Half-width of the payoff window as a fraction of spot (0.15 = ±15%)
    pub range_fraction: f64,
    /// Number of points sampled across the payoff window
    pub sample_count: usize,
    /// Fraction of notional held as margin for naked short legs
    pub margin_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strike_gap: 50.0,
            ladder_half_width: 15,
            range_fraction: 0.15,
            sample_count: 101,
            margin_rate: 0.15,
        }
    }
}

impl EngineConfig {
    /// Get the default config file path.
    ///
    /// Default path: `~/.zee/payoff/config.toml`
    /// Can be overridden with `PAYOFF_CONFIG_FILE` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("PAYOFF_CONFIG_FILE") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".zee/payoff/config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Load config from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load config from a specific path. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.strike_gap.is_finite() && self.strike_gap > 0.0) {
            return Err(Error::InvalidInput(format!(
                "strike_gap must be positive, got {}",
                self.strike_gap
            )));
        }
        if self.ladder_half_width == 0 {
            return Err(Error::InvalidInput(
                "ladder_half_width must be at least 1".to_string(),
            ));
        }
        validate_range_fraction(self.range_fraction)?;
        validate_sample_count(self.sample_count)?;
        if !(self.margin_rate.is_finite() && self.margin_rate >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "margin_rate must be non-negative, got {}",
                self.margin_rate
            )));
        }
        Ok(())
    }
}

pub(crate) fn validate_range_fraction(range_fraction: f64) -> Result<()> {
    if !(range_fraction > 0.0 && range_fraction < 1.0) {
        return Err(Error::InvalidInput(format!(
            "range_fraction must be within (0, 1), got {}",
            range_fraction
        )));
    }
    Ok(())
}

pub(crate) fn validate_sample_count(sample_count: usize) -> Result<()> {
    if sample_count < 2 {
        return Err(Error::InvalidInput(format!(
            "sample_count must be at least 2, got {}",
            sample_count
        )));
    }
    Ok(())
}

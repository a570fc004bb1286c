use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::situation::interpolation::default_max_delta_elevation;
use crate::units::{Length, in_meters, meters};
use chrono::Duration;

/// Smallest usable history, a situation change needs two samples
pub const MIN_HISTORY_SIZE: usize = 2;

/// Rolling history and per-situation processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    /// Distance within which an elevation is reused for the next situation
    #[serde(default = "default_transfer_radius_m")]
    pub transfer_radius_m: f64,
    #[serde(default = "default_true")]
    pub drag_to_ground: bool,
    #[serde(default = "default_true")]
    pub calc_std_deviations: bool,
    /// A sample this far (seconds) behind the newest one restarts the history
    #[serde(default = "default_time_jump_s")]
    pub time_jump_s: u32,
    /// Shift altitudes by the guessed scenery deviation minus CG
    #[serde(default)]
    pub fix_scenery_offset: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            transfer_radius_m: default_transfer_radius_m(),
            drag_to_ground: true,
            calc_std_deviations: true,
            time_jump_s: default_time_jump_s(),
            fix_scenery_offset: false,
        }
    }
}

impl TrackerConfig {
    pub fn transfer_radius(&self) -> Length {
        meters(self.transfer_radius_m)
    }

    pub fn time_jump(&self) -> Duration {
        Duration::seconds(i64::from(self.time_jump_s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolationConfig {
    /// Largest elevation step (meters) between two situations that is interpolated
    #[serde(default = "default_max_delta_elevation_m")]
    pub max_delta_elevation_m: f64,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            max_delta_elevation_m: default_max_delta_elevation_m(),
        }
    }
}

impl InterpolationConfig {
    pub fn max_delta_elevation(&self) -> Length {
        meters(self.max_delta_elevation_m)
    }
}

/// Per ICAO type performance override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftOverride {
    pub icao: String,
    #[serde(default)]
    pub vtol: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cg_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate_kts: Option<f64>,
}

/// Top-level configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SitusConfig {
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub interpolation: InterpolationConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aircraft: Vec<AircraftOverride>,
}

fn default_history_size() -> usize {
    6
}

fn default_time_jump_s() -> u32 {
    30
}

fn default_transfer_radius_m() -> f64 {
    100.0
}

fn default_max_delta_elevation_m() -> f64 {
    in_meters(default_max_delta_elevation())
}

fn default_true() -> bool {
    true
}

impl SitusConfig {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Load config from `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: SitusConfig = toml::from_str(contents).context("Invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a TOML file (atomic: write to .tmp then rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_toml()?;
        let tmp_path = path.with_extension("toml.tmp");
        std::fs::write(&tmp_path, &contents)
            .with_context(|| format!("Failed to write {:?}", tmp_path))?;
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to rename {:?} to {:?}", tmp_path, path))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    pub fn validate(&self) -> Result<()> {
        if self.tracker.history_size < MIN_HISTORY_SIZE {
            bail!(
                "tracker.history_size must be at least {}, got {}",
                MIN_HISTORY_SIZE,
                self.tracker.history_size
            );
        }
        if self.tracker.time_jump_s == 0 {
            bail!("tracker.time_jump_s must be at least 1");
        }
        if !(self.tracker.transfer_radius_m.is_finite() && self.tracker.transfer_radius_m >= 0.0) {
            bail!(
                "tracker.transfer_radius_m must be a non-negative number, got {}",
                self.tracker.transfer_radius_m
            );
        }
        if !(self.interpolation.max_delta_elevation_m.is_finite()
            && self.interpolation.max_delta_elevation_m > 0.0)
        {
            bail!(
                "interpolation.max_delta_elevation_m must be positive, got {}",
                self.interpolation.max_delta_elevation_m
            );
        }
        for aircraft in &self.aircraft {
            if aircraft.icao.trim().is_empty() {
                bail!("aircraft entry without icao type");
            }
        }
        Ok(())
    }
}

/// Resolve the config file path.
///
/// Priority:
/// 1. `SITUS_CONFIG` env var
/// 2. `./situs.toml`
pub fn config_path() -> PathBuf {
    match std::env::var("SITUS_CONFIG") {
        Ok(path) => PathBuf::from(path),
        Err(_) => PathBuf::from("./situs.toml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SitusConfig::from_toml("").unwrap();
        assert_eq!(config, SitusConfig::default());
        assert_eq!(config.tracker.history_size, 6);
        assert_eq!(config.tracker.transfer_radius_m, 100.0);
        assert!(config.tracker.drag_to_ground);
        assert!(config.tracker.calc_std_deviations);
        assert_eq!(config.tracker.time_jump(), Duration::seconds(30));
        assert!(!config.tracker.fix_scenery_offset);
        assert_eq!(config.interpolation.max_delta_elevation_m, 4.0);
    }

    #[test]
    fn test_partial_config() {
        let config = SitusConfig::from_toml(
            r#"
            [tracker]
            history_size = 10
            drag_to_ground = false

            [[aircraft]]
            icao = "EC35"
            vtol = true
            cg_m = 1.2
            "#,
        )
        .unwrap();
        assert_eq!(config.tracker.history_size, 10);
        assert!(!config.tracker.drag_to_ground);
        assert!(config.tracker.calc_std_deviations);
        assert_eq!(config.aircraft.len(), 1);
        assert!(config.aircraft[0].vtol);
        assert_eq!(config.aircraft[0].rotate_kts, None);
    }

    #[test]
    fn test_history_size_below_minimum_is_rejected() {
        let err = SitusConfig::from_toml("[tracker]\nhistory_size = 1\n").unwrap_err();
        assert!(err.to_string().contains("history_size"));
    }

    #[test]
    fn test_zero_time_jump_is_rejected() {
        let err = SitusConfig::from_toml("[tracker]\ntime_jump_s = 0\n").unwrap_err();
        assert!(err.to_string().contains("time_jump_s"));
    }

    #[test]
    fn test_negative_max_delta_is_rejected() {
        assert!(SitusConfig::from_toml("[interpolation]\nmax_delta_elevation_m = -1.0\n").is_err());
    }
}

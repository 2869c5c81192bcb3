//! Configuration management for the EcoHAB CLI.

use anyhow::{Context, Result};
use ecohab::prelude::{DetectorConfig, ScoreConvention, SignificanceTester};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "ecohab.toml";

/// Analysis configuration (`ecohab.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub detector: DetectorSection,
    #[serde(default)]
    pub significance: SignificanceSection,
    #[serde(default)]
    pub sociability: SociabilitySection,
    #[serde(default)]
    pub solitude: SolitudeSection,
    #[serde(default)]
    pub dataset: DatasetSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorSection {
    #[serde(default = "default_threshold")]
    pub threshold_secs: f64,
    #[serde(default = "default_lookback")]
    pub lookback_secs: f64,
    #[serde(default = "default_guard")]
    pub guard_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceSection {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub convention: ScoreConvention,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SociabilitySection {
    /// Bin width for the binned sociability tables.
    #[serde(default = "default_bin_secs")]
    pub bin_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolitudeSection {
    #[serde(default = "default_aggregate_label")]
    pub aggregate_label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSection {
    /// Mice with fewer compartment entries are left out of every analysis.
    #[serde(default)]
    pub min_visits: usize,
}

// Default value functions
fn default_threshold() -> f64 { 3.0 }
fn default_lookback() -> f64 { 2.0 }
fn default_guard() -> f64 { 0.1 }
fn default_alpha() -> f64 { 0.05 }
fn default_bin_secs() -> f64 { 12.0 * 3600.0 }
fn default_aggregate_label() -> String { "ALL DARK".to_string() }

impl Default for DetectorSection {
    fn default() -> Self {
        Self {
            threshold_secs: default_threshold(),
            lookback_secs: default_lookback(),
            guard_secs: default_guard(),
        }
    }
}

impl Default for SignificanceSection {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            convention: ScoreConvention::default(),
        }
    }
}

impl Default for SociabilitySection {
    fn default() -> Self {
        Self {
            bin_secs: default_bin_secs(),
        }
    }
}

impl Default for SolitudeSection {
    fn default() -> Self {
        Self {
            aggregate_label: default_aggregate_label(),
        }
    }
}

impl DetectorSection {
    pub fn to_detector_config(&self) -> DetectorConfig {
        DetectorConfig::default()
            .with_threshold(self.threshold_secs)
            .with_lookback(self.lookback_secs)
            .with_guard(self.guard_secs)
    }
}

impl SignificanceSection {
    pub fn to_tester(&self) -> Result<SignificanceTester> {
        SignificanceTester::new(self.alpha, self.convention).context("Invalid [significance] section")
    }
}

impl Config {
    /// Load config from ecohab.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Find ecohab.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [detector]
            threshold_secs = 5.0

            [significance]
            convention = "legacy_p_value"
            "#,
        )
        .unwrap();
        assert_eq!(config.detector.threshold_secs, 5.0);
        assert_eq!(config.detector.lookback_secs, 2.0);
        assert_eq!(config.significance.alpha, 0.05);
        assert_eq!(config.significance.convention, ScoreConvention::LegacyPValue);
        assert_eq!(config.solitude.aggregate_label, "ALL DARK");
        assert_eq!(config.dataset.min_visits, 0);
    }

    #[test]
    fn default_toml_round_trips() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = Config::default();
        config.sociability.bin_secs = 3600.0;
        config.save(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn invalid_alpha_rejected() {
        let mut config = Config::default();
        config.significance.alpha = 2.0;
        assert!(config.significance.to_tester().is_err());
    }
}

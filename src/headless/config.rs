//! JSON configuration parsing for headless mode
//!
//! Parses JSON scenario files and resolves the mage options they point at.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::mage::MageOptions;

/// Headless scenario configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Scenario name used in the report
    #[serde(default = "default_name")]
    pub name: String,
    /// Number of enemy targets (default: 1)
    #[serde(default = "default_targets")]
    pub targets: usize,
    /// Health of every target
    #[serde(default = "default_target_health")]
    pub target_health: f64,
    /// Maximum fight duration in seconds (default: 300)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f64,
    /// Number of iterations to run (default: 1)
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Random seed for deterministic reproduction.
    /// Iteration `i` uses `seed + i`.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Rotation name: "Frost" or "Fire"
    #[serde(default = "default_rotation")]
    pub rotation: String,
    /// Time window in which the mage burns
    #[serde(default)]
    pub burn_phase: Option<BurnWindow>,
    /// Path to a RON options file
    #[serde(default)]
    pub options_path: Option<String>,
    /// Inline options, used when no options file is given
    #[serde(default)]
    pub options: Option<MageOptions>,
    /// Custom output path for the JSON report (optional)
    #[serde(default)]
    pub output_path: Option<String>,
}

/// Burn phase window in seconds from the start of the fight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurnWindow {
    pub start_secs: f64,
    pub end_secs: f64,
}

impl BurnWindow {
    pub fn contains(&self, secs: f64) -> bool {
        secs >= self.start_secs && secs < self.end_secs
    }
}

/// Fixed-priority rotation driving the mage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    Frost,
    Fire,
}

fn default_name() -> String {
    "Patchwerk".to_string()
}

fn default_targets() -> usize {
    1
}

fn default_target_health() -> f64 {
    10_000_000.0
}

fn default_max_duration() -> f64 {
    300.0
}

fn default_iterations() -> u32 {
    1
}

fn default_rotation() -> String {
    "Frost".to_string()
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            targets: default_targets(),
            target_health: default_target_health(),
            max_duration_secs: default_max_duration(),
            iterations: default_iterations(),
            random_seed: None,
            rotation: default_rotation(),
            burn_phase: None,
            options_path: None,
            options: None,
            output_path: None,
        }
    }
}

impl ScenarioConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_json(&contents)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(contents: &str) -> Result<Self, String> {
        let config: ScenarioConfig =
            serde_json::from_str(contents).map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.targets == 0 {
            return Err("targets must be at least 1".to_string());
        }
        if self.target_health <= 0.0 {
            return Err("target_health must be positive".to_string());
        }
        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }
        if self.iterations == 0 {
            return Err("iterations must be at least 1".to_string());
        }

        Self::parse_rotation(&self.rotation)?;

        if let Some(window) = &self.burn_phase {
            if window.start_secs < 0.0 || window.end_secs <= window.start_secs {
                return Err(format!(
                    "burn_phase window {}..{} is invalid",
                    window.start_secs, window.end_secs
                ));
            }
        }

        if let Some(options) = &self.options {
            options.validate()?;
        }

        Ok(())
    }

    /// Parse a rotation name string into Rotation
    pub fn parse_rotation(name: &str) -> Result<Rotation, String> {
        match name {
            "Frost" => Ok(Rotation::Frost),
            "Fire" => Ok(Rotation::Fire),
            _ => Err(format!(
                "Unknown rotation: '{}'. Valid rotations: Frost, Fire",
                name
            )),
        }
    }

    pub fn rotation(&self) -> Result<Rotation, String> {
        Self::parse_rotation(&self.rotation)
    }

    /// Resolve the mage options: options file first, then inline options,
    /// then defaults.
    pub fn mage_options(&self) -> Result<MageOptions, String> {
        if let Some(path) = &self.options_path {
            return MageOptions::load_from_file(Path::new(path));
        }
        Ok(self.options.clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = ScenarioConfig::from_json("{}").unwrap();
        assert_eq!(config.targets, 1);
        assert_eq!(config.iterations, 1);
        assert_eq!(config.rotation().unwrap(), Rotation::Frost);
        assert_eq!(config.mage_options().unwrap(), MageOptions::default());
    }

    #[test]
    fn test_unknown_rotation_rejected() {
        let err = ScenarioConfig::from_json(r#"{"rotation": "Arcane"}"#).unwrap_err();
        assert!(err.contains("Unknown rotation"));
    }

    #[test]
    fn test_inverted_burn_window_rejected() {
        let err = ScenarioConfig::from_json(
            r#"{"burn_phase": {"start_secs": 30.0, "end_secs": 10.0}}"#,
        )
        .unwrap_err();
        assert!(err.contains("burn_phase"));
    }

    #[test]
    fn test_inline_options() {
        let config =
            ScenarioConfig::from_json(r#"{"options": {"bugs": false, "icicle_capacity": 3}}"#).unwrap();
        let options = config.mage_options().unwrap();
        assert!(!options.bugs);
        assert_eq!(options.icicle_capacity, 3);
    }
}

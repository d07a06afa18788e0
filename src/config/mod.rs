use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::forecast::{ForecastStrategy, DEFAULT_HORIZON};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub raw_data: PathBuf,
    pub cleaned_data: PathBuf,
    pub model: PathBuf,
    pub predictions: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            raw_data: PathBuf::from("data.json"),
            cleaned_data: PathBuf::from("cleaned_data.csv"),
            model: PathBuf::from("model.bin"),
            predictions: PathBuf::from("predictions.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    pub test_size: f64,
    pub seed: u64,
    pub window_size: usize,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            window_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub strategy: ForecastStrategy,
    pub horizon: usize,
    /// Unscale sequence output with the bounds used to scale its input.
    /// When false the bounds are re-fit on the raw inference window.
    pub reuse_bounds: bool,
    /// First forecast day is the day after this; today (UTC) when unset.
    pub start_date: Option<NaiveDate>,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            strategy: ForecastStrategy::default(),
            horizon: DEFAULT_HORIZON,
            reuse_bounds: true,
            start_date: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathSettings,
    pub training: TrainingSettings,
    pub forecast: ForecastSettings,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let test_size = self.training.test_size;
        if !(0.0..1.0).contains(&test_size) {
            return Err(ConfigError::Invalid(format!(
                "training.test_size must be in [0, 1), got {test_size}"
            )));
        }
        if self.training.window_size == 0 {
            return Err(ConfigError::Invalid(
                "training.window_size must be positive".to_string(),
            ));
        }
        if self.forecast.horizon == 0 {
            return Err(ConfigError::Invalid(
                "forecast.horizon must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_pipeline_paths() {
        let config = Config::default();
        assert_eq!(config.paths.raw_data, PathBuf::from("data.json"));
        assert_eq!(config.paths.cleaned_data, PathBuf::from("cleaned_data.csv"));
        assert_eq!(config.paths.predictions, PathBuf::from("predictions.json"));
        assert_eq!(config.training.test_size, 0.2);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.forecast.horizon, 10);
        assert_eq!(
            config.forecast.strategy,
            ForecastStrategy::SingleFeatureIterative
        );
        assert!(config.forecast.reuse_bounds);
        assert!(config.forecast.start_date.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = Config::from_yaml(
            "forecast:\n  strategy: windowed-sequence\n  reuse_bounds: false\n  start_date: 2024-01-01\n",
        )
        .unwrap();

        assert_eq!(config.forecast.strategy, ForecastStrategy::WindowedSequence);
        assert!(!config.forecast.reuse_bounds);
        assert_eq!(
            config.forecast.start_date,
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(config.forecast.horizon, 10);
        assert_eq!(config.paths, PathSettings::default());
        assert_eq!(config.training, TrainingSettings::default());
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = Config::from_yaml(include_str!("../../config/pipeline.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_empty_mapping_is_default() {
        assert_eq!(Config::from_yaml("{}").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for yaml in [
            "training:\n  test_size: 1.0\n",
            "training:\n  test_size: -0.1\n",
            "training:\n  window_size: 0\n",
            "forecast:\n  horizon: 0\n",
        ] {
            assert!(
                matches!(Config::from_yaml(yaml), Err(ConfigError::Invalid(_))),
                "{yaml} should be rejected"
            );
        }
    }

    #[test]
    fn test_unknown_strategy_is_a_yaml_error() {
        assert!(matches!(
            Config::from_yaml("forecast:\n  strategy: lstm\n"),
            Err(ConfigError::Yaml(_))
        ));
    }
}

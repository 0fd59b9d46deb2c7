//! Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CleanroomError, Result};
use crate::input::ParserConfig;
use crate::vocabulary::Vocabularies;

/// Default cap on detect/correct/enrich iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 3;

/// Fuzzy-match thresholds per canonical column (scores are 0-100, a match
/// must score strictly above its threshold).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub country_threshold: f64,
    /// Lower than the country threshold: the city vocabulary is noisier.
    pub city_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            country_threshold: 70.0,
            city_threshold: 40.0,
        }
    }
}

/// Replacement values for categorical columns outside their vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackValues {
    pub gender: String,
    pub marital_status: String,
}

impl Default for FallbackValues {
    fn default() -> Self {
        Self {
            gender: "Other".to_string(),
            marital_status: "Single".to_string(),
        }
    }
}

/// Configuration for a cleaning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of detect/correct/enrich iterations.
    pub max_iterations: usize,
    pub matching: MatchingConfig,
    pub vocabularies: Vocabularies,
    pub fallbacks: FallbackValues,
    /// Input parsing options.
    #[serde(skip)]
    pub parser: ParserConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            matching: MatchingConfig::default(),
            vocabularies: Vocabularies::default(),
            fallbacks: FallbackValues::default(),
            parser: ParserConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| CleanroomError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(CleanroomError::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        for (name, threshold) in [
            ("country_threshold", self.matching.country_threshold),
            ("city_threshold", self.matching.city_threshold),
        ] {
            if !(0.0..=100.0).contains(&threshold) {
                return Err(CleanroomError::Config(format!(
                    "{} must be within 0-100, got {}",
                    name, threshold
                )));
            }
        }
        if !self.vocabularies.genders.contains(&self.fallbacks.gender) {
            return Err(CleanroomError::Config(format!(
                "gender fallback '{}' is not in the gender vocabulary",
                self.fallbacks.gender
            )));
        }
        if !self
            .vocabularies
            .marital_statuses
            .contains(&self.fallbacks.marital_status)
        {
            return Err(CleanroomError::Config(format!(
                "marital status fallback '{}' is not in the marital status vocabulary",
                self.fallbacks.marital_status
            )));
        }
        Ok(())
    }
}

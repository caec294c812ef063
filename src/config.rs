use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use validator::Validate;

use crate::core::features::FeatureExtractor;
use crate::error::MatchError;
use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

/// Per-dimension weights; unknown keys are a configuration error
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightsConfig {
    #[serde(default = "default_budget_weight")]
    pub budget: f64,
    #[serde(default = "default_lifestyle_weight")]
    pub lifestyle: f64,
    #[serde(default = "default_cleanliness_weight")]
    pub cleanliness: f64,
    #[serde(default = "default_smoking_weight")]
    pub smoking: f64,
    #[serde(default = "default_pets_weight")]
    pub pets: f64,
    #[serde(default = "default_guests_weight")]
    pub guests: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_availability_weight")]
    pub availability: f64,
    #[serde(default = "default_stay_duration_weight")]
    pub stay_duration: f64,
    #[serde(default = "default_housing_type_weight")]
    pub housing_type: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            budget: default_budget_weight(),
            lifestyle: default_lifestyle_weight(),
            cleanliness: default_cleanliness_weight(),
            smoking: default_smoking_weight(),
            pets: default_pets_weight(),
            guests: default_guests_weight(),
            location: default_location_weight(),
            availability: default_availability_weight(),
            stay_duration: default_stay_duration_weight(),
            housing_type: default_housing_type_weight(),
        }
    }
}

fn default_budget_weight() -> f64 { 0.20 }
fn default_lifestyle_weight() -> f64 { 0.12 }
fn default_cleanliness_weight() -> f64 { 0.10 }
fn default_smoking_weight() -> f64 { 0.10 }
fn default_pets_weight() -> f64 { 0.08 }
fn default_guests_weight() -> f64 { 0.05 }
fn default_location_weight() -> f64 { 0.12 }
fn default_availability_weight() -> f64 { 0.10 }
fn default_stay_duration_weight() -> f64 { 0.06 }
fn default_housing_type_weight() -> f64 { 0.07 }

impl TryFrom<&WeightsConfig> for ScoringWeights {
    type Error = MatchError;

    fn try_from(config: &WeightsConfig) -> Result<Self, Self::Error> {
        ScoringWeights {
            budget: config.budget,
            lifestyle: config.lifestyle,
            cleanliness: config.cleanliness,
            smoking: config.smoking,
            pets: config.pets,
            guests: config.guests,
            location: config.location,
            availability: config.availability,
            stay_duration: config.stay_duration,
            housing_type: config.housing_type,
        }
        .validated()
    }
}

/// Normalization bounds and ordinal scales used by the feature extractor
#[derive(Debug, Clone, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "default_budget_floor")]
    pub budget_floor: f64,
    #[serde(default = "default_budget_ceiling")]
    pub budget_ceiling: f64,
    #[serde(default = "default_stay_floor_months")]
    pub stay_floor_months: u32,
    #[serde(default = "default_stay_ceiling_months")]
    pub stay_ceiling_months: u32,
    /// Ordered from calmest to liveliest
    #[serde(default = "default_lifestyle_scale")]
    pub lifestyle_scale: Vec<String>,
    /// Ordered from most relaxed to most strict
    #[serde(default = "default_cleanliness_scale")]
    pub cleanliness_scale: Vec<String>,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            budget_floor: default_budget_floor(),
            budget_ceiling: default_budget_ceiling(),
            stay_floor_months: default_stay_floor_months(),
            stay_ceiling_months: default_stay_ceiling_months(),
            lifestyle_scale: default_lifestyle_scale(),
            cleanliness_scale: default_cleanliness_scale(),
        }
    }
}

fn default_budget_floor() -> f64 { 0.0 }
fn default_budget_ceiling() -> f64 { 10_000.0 }
fn default_stay_floor_months() -> u32 { 1 }
fn default_stay_ceiling_months() -> u32 { 36 }

fn default_lifestyle_scale() -> Vec<String> {
    ["quiet", "balanced", "social", "party"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_cleanliness_scale() -> Vec<String> {
    ["relaxed", "moderate", "clean", "very_clean"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Maximum number of pair scores kept; 0 disables the score cache
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    /// Maximum number of feature vectors kept; 0 disables the feature cache
    #[serde(default = "default_feature_entries")]
    pub feature_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            feature_entries: default_feature_entries(),
        }
    }
}

fn default_max_entries() -> u64 { 100_000 }
fn default_feature_entries() -> u64 { 10_000 }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MatchingSettings {
    /// Worker threads for scoring; defaults to available parallelism
    #[validate(range(min = 1))]
    pub workers: Option<usize>,
    #[serde(default = "default_top_n")]
    #[validate(range(min = 1))]
    pub default_top_n: usize,
    #[serde(default = "default_max_top_n")]
    #[validate(range(min = 1))]
    pub max_top_n: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            workers: None,
            default_top_n: default_top_n(),
            max_top_n: default_max_top_n(),
        }
    }
}

fn default_top_n() -> usize { 20 }
fn default_max_top_n() -> usize { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ROOMMATE__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ROOMMATE__CACHE__MAX_ENTRIES -> cache.max_entries
            .add_source(
                Environment::with_prefix("ROOMMATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("ROOMMATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Startup validation; any error here is a fatal misconfiguration
    pub fn validate(&self) -> Result<(), MatchError> {
        ScoringWeights::try_from(&self.scoring.weights)?;
        FeatureExtractor::new(&self.features)?;

        self.matching
            .validate()
            .map_err(|e| MatchError::invalid_argument(format!("matching settings: {}", e)))?;

        if self.matching.default_top_n > self.matching.max_top_n {
            return Err(MatchError::invalid_argument(format!(
                "default_top_n ({}) exceeds max_top_n ({})",
                self.matching.default_top_n, self.matching.max_top_n
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.budget, 0.20);
        assert_eq!(weights.location, 0.12);
        assert_eq!(weights.housing_type, 0.07);

        let scoring = ScoringWeights::try_from(&weights).unwrap();
        assert_eq!(scoring, ScoringWeights::default());
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_settings_from_toml() {
        let settings = from_toml(
            r#"
            [scoring.weights]
            budget = 0.30
            location = 0.02

            [cache]
            max_entries = 500

            [matching]
            workers = 2
            default_top_n = 5
            "#,
        )
        .unwrap();

        assert_eq!(settings.scoring.weights.budget, 0.30);
        assert_eq!(settings.cache.max_entries, 500);
        assert_eq!(settings.cache.feature_entries, 10_000);
        assert_eq!(settings.matching.workers, Some(2));
        assert_eq!(settings.matching.max_top_n, 100);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_weights_not_summing_to_one_is_fatal() {
        let settings = from_toml(
            r#"
            [scoring.weights]
            budget = 0.90
            "#,
        )
        .unwrap();

        assert!(matches!(
            settings.validate(),
            Err(MatchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unknown_weight_is_rejected() {
        let result = from_toml(
            r#"
            [scoring.weights]
            hair_color = 0.1
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut settings = Settings::default();
        settings.matching.workers = Some(0);
        assert!(settings.validate().is_err());
    }
}

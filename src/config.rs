//! YAML configuration for the prediction pipeline.
//!
//! Every stage of the pipeline (dataset, model, embedding, feature layout,
//! charts, selection checks) is described in one YAML file loaded at startup.
//! Missing sections fall back to their defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//!
//! dataset:
//!   path: "data/sample_survey.csv"
//!
//! model:
//!   path: "data/sample_model.json"
//!
//! embedding:
//!   mode: "simulated"
//!   dim: 768
//!   cache_capacity: 1024
//!
//! features:
//!   column_prefix: "embed_"
//!
//! charts:
//!   histogram_max_bins: 20
//!   top_n: 10
//!
//! selection:
//!   strict: true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use embedding::EmbeddingConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the whole pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    /// Configuration format version
    #[serde(default = "default_config_version")]
    pub version: String,

    #[serde(default)]
    pub dataset: DatasetYamlConfig,

    #[serde(default)]
    pub model: ModelYamlConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub features: FeaturesYamlConfig,

    #[serde(default)]
    pub charts: ChartsYamlConfig,

    #[serde(default)]
    pub selection: SelectionYamlConfig,
}

impl AppConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: AppConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.dataset.validate()?;
        self.model.validate()?;
        self.embedding
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("embedding: {e}")))?;
        self.features.validate()?;
        self.charts.validate()?;

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            dataset: DatasetYamlConfig::default(),
            model: ModelYamlConfig::default(),
            embedding: EmbeddingConfig::default(),
            features: FeaturesYamlConfig::default(),
            charts: ChartsYamlConfig::default(),
            selection: SelectionYamlConfig::default(),
        }
    }
}

/// Survey dataset location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetYamlConfig {
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
}

impl DatasetYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "dataset.path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DatasetYamlConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

/// Model artifact location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelYamlConfig {
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
}

impl ModelYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "model.path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ModelYamlConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

/// Feature row layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesYamlConfig {
    /// Prefix of the positional embedding columns (`embed_0`, `embed_1`, ...)
    #[serde(default = "default_column_prefix")]
    pub column_prefix: String,
}

impl FeaturesYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.column_prefix.is_empty() {
            return Err(ConfigLoadError::Validation(
                "features.column_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FeaturesYamlConfig {
    fn default() -> Self {
        Self {
            column_prefix: default_column_prefix(),
        }
    }
}

/// Chart view parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsYamlConfig {
    #[serde(default = "default_histogram_max_bins")]
    pub histogram_max_bins: usize,

    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl ChartsYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.histogram_max_bins == 0 {
            return Err(ConfigLoadError::Validation(
                "charts.histogram_max_bins must be >= 1".to_string(),
            ));
        }
        if self.top_n == 0 {
            return Err(ConfigLoadError::Validation(
                "charts.top_n must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ChartsYamlConfig {
    fn default() -> Self {
        Self {
            histogram_max_bins: default_histogram_max_bins(),
            top_n: default_top_n(),
        }
    }
}

/// Selection checks applied before a prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionYamlConfig {
    /// Require every selected value to exist in the dataset. When `false`,
    /// a free-text Question is accepted.
    #[serde(default = "true_value")]
    pub strict: bool,
}

impl Default for SelectionYamlConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

fn default_config_version() -> String {
    "1.0".to_string()
}
fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/sample_survey.csv")
}
fn default_model_path() -> PathBuf {
    PathBuf::from("data/sample_model.json")
}
fn default_column_prefix() -> String {
    model::DEFAULT_EMBEDDING_PREFIX.to_string()
}
fn default_histogram_max_bins() -> usize {
    20
}
fn default_top_n() -> usize {
    10
}
fn true_value() -> bool {
    true
}

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub cleaner: CleanerConfig,
    pub filter: FilterConfig,
}

/// File locations for every stage. File names are joined onto `data_dir`
/// unless they are already absolute.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub raw_data: PathBuf,
    pub cleaned_data: PathBuf,
    pub filtered_bikes: PathBuf,
    pub brand_counts: PathBuf,
    pub sorted_bicycles: PathBuf,
    pub price_per_weight: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            raw_data: PathBuf::from(constants::RAW_DATA_FILE),
            cleaned_data: PathBuf::from(constants::CLEANED_DATA_FILE),
            filtered_bikes: PathBuf::from(constants::FILTERED_BIKES_FILE),
            brand_counts: PathBuf::from(constants::BRAND_COUNTS_FILE),
            sorted_bicycles: PathBuf::from(constants::SORTED_BICYCLES_FILE),
            price_per_weight: PathBuf::from(constants::PRICE_PER_WEIGHT_FILE),
        }
    }
}

impl PathsConfig {
    pub fn resolve(&self, file: &Path) -> PathBuf {
        self.data_dir.join(file)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// One-off display name patches keyed by model_id. Empty unless an
    /// operator opts in; every applied entry is logged.
    pub model_name_overrides: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub bike_type: String,
    pub max_price_gbp: f64,
    pub require_in_stock: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            bike_type: constants::MOUNTAIN_BIKE.to_string(),
            max_price_gbp: constants::MAX_PRICE_GBP,
            require_in_stock: true,
        }
    }
}

impl Config {
    /// Loads configuration from `explicit`, then `$BIKE_PIPELINE_CONFIG`,
    /// then `pipeline.toml` in the working directory.
    ///
    /// A named file that cannot be read is an error; an absent default file
    /// means built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        if let Ok(path) = std::env::var(constants::CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Self::load_from(Path::new(&path));
            }
        }

        let default_path = Path::new(constants::DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Self::load_from(default_path)
        } else {
            debug!("No {} found, using defaults", constants::DEFAULT_CONFIG_FILE);
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_toml_str(&config_content)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if !config.filter.max_price_gbp.is_finite() {
            return Err(PipelineError::Config(
                "filter.max_price_gbp must be a finite number".to_string(),
            ));
        }
        Ok(config)
    }
}

//! Configuration management
//!
//! Settings are layered: built-in defaults, then the user's global
//! `config.yaml`, then `.amv/config.yaml` in the working directory, then an
//! explicit `--config` file. Later layers override earlier ones key by key.

use miette::Diagnostic;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::dilution::RecipeSet;

/// Project-local configuration file, relative to the working directory
pub const PROJECT_CONFIG: &str = ".amv/config.yaml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV: &str = "AMV_CONFIG";

/// Which stock concentration the theoretical concentration of a prepared
/// level is based on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcentrationBasis {
    /// Nominal level target scaled by the stock correction factor
    #[default]
    Corrected,
    /// Nominal level target as planned
    Nominal,
}

impl std::fmt::Display for ConcentrationBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConcentrationBasis::Corrected => write!(f, "corrected"),
            ConcentrationBasis::Nominal => write!(f, "nominal"),
        }
    }
}

/// Precision settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecisionConfig {
    /// Maximum day-to-day difference of means (%) for intermediate precision.
    /// Unset means the difference is reported without a verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intermediate_max_difference_percent: Option<Decimal>,
}

/// Master recipe settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeConfig {
    /// Default flask volume (mL)
    pub total_volume_ml: Decimal,

    /// Test sets prepared from the stock
    pub sets: Vec<RecipeSet>,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        let pct = |v: i64| Decimal::from(v);
        Self {
            total_volume_ml: Decimal::TEN,
            sets: vec![
                RecipeSet::new(
                    "linearity",
                    vec![pct(80), pct(90), pct(100), pct(110), pct(120)],
                    3,
                ),
                RecipeSet::new("accuracy", vec![pct(80), pct(100), pct(120)], 3),
                RecipeSet::new("precision", vec![pct(100)], 12),
                RecipeSet::new("sst", vec![pct(100)], 1),
                RecipeSet::new("lod_loq", vec![pct(1), pct(3)], 1),
            ],
        }
    }
}

impl RecipeConfig {
    /// Levels of a named set, if configured
    pub fn levels(&self, name: &str) -> Option<&[Decimal]> {
        self.sets
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.levels.as_slice())
    }
}

/// Effective configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub concentration_basis: ConcentrationBasis,
    pub precision: PrecisionConfig,
    pub recipe: RecipeConfig,
}

/// One configuration layer as written on disk; absent keys inherit
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigLayer {
    concentration_basis: Option<ConcentrationBasis>,
    precision: Option<PrecisionLayer>,
    recipe: Option<RecipeLayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PrecisionLayer {
    /// Absent inherits, `~` clears, a number sets the limit
    #[serde(deserialize_with = "present")]
    intermediate_max_difference_percent: Option<Option<Decimal>>,
}

/// Tell an explicit null apart from a missing key
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RecipeLayer {
    total_volume_ml: Option<Decimal>,
    sets: Option<Vec<RecipeSet>>,
}

/// Errors loading configuration files
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("cannot read config file {path}")]
    #[diagnostic(code(amv::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    #[diagnostic(
        code(amv::config::parse),
        help("run `amv config` to see the effective settings")
    )]
    Parse { path: PathBuf, message: String },
}

impl Config {
    /// Load global and project configuration, ignoring unreadable layers
    pub fn load() -> Self {
        let mut config = Config::default();
        for path in Self::search_paths() {
            if !path.exists() {
                continue;
            }
            match read_layer(&path) {
                Ok(layer) => {
                    tracing::debug!(path = %path.display(), "applied config layer");
                    config.apply(layer);
                }
                Err(e) => tracing::warn!("skipping config layer: {}", e),
            }
        }
        config
    }

    /// Load configuration, then apply an explicit file that must be valid
    pub fn load_with(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::load();
        if let Some(path) = explicit {
            config.apply(read_layer(path)?);
            tracing::debug!(path = %path.display(), "applied explicit config");
        }
        Ok(config)
    }

    /// Parse a single YAML document on top of the defaults
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let layer = parse_layer(content, Path::new("<inline>"))?;
        let mut config = Config::default();
        config.apply(layer);
        Ok(config)
    }

    /// Global config file location (platform config directory)
    pub fn global_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "amv").map(|d| d.config_dir().join("config.yaml"))
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(global) = Self::global_path() {
            paths.push(global);
        }
        paths.push(PathBuf::from(PROJECT_CONFIG));
        paths
    }

    fn apply(&mut self, layer: ConfigLayer) {
        if let Some(basis) = layer.concentration_basis {
            self.concentration_basis = basis;
        }
        if let Some(precision) = layer.precision {
            if let Some(limit) = precision.intermediate_max_difference_percent {
                self.precision.intermediate_max_difference_percent = limit;
            }
        }
        if let Some(recipe) = layer.recipe {
            if let Some(volume) = recipe.total_volume_ml {
                self.recipe.total_volume_ml = volume;
            }
            if let Some(sets) = recipe.sets {
                self.recipe.sets = sets;
            }
        }
    }
}

fn read_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_layer(&content, path)
}

fn parse_layer(content: &str, path: &Path) -> Result<ConfigLayer, ConfigError> {
    if content.trim().is_empty() {
        return Ok(ConfigLayer::default());
    }
    serde_yml::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

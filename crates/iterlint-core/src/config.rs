//! Configuration types for iterlint.

use crate::category::{Category, UnknownCategory};
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to start from ("recommended", "strict", "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Exit-code threshold (default: "warning").
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-category overrides, keyed by category name, kebab name or code.
    #[serde(default)]
    pub rules: BTreeMap<String, CategoryConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Resolves the preset and per-category overrides into a [`RuleConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown preset or category name.
    pub fn rule_config(&self) -> Result<RuleConfig, ConfigError> {
        let preset = match &self.preset {
            Some(name) => name.parse()?,
            None => Preset::default(),
        };
        let mut rules = RuleConfig::from_preset(preset);
        for (name, overrides) in &self.rules {
            let category: Category = name.parse()?;
            let settings = rules.settings_mut(category);
            if let Some(enabled) = overrides.enabled {
                settings.enabled = enabled;
            }
            if let Some(severity) = overrides.severity {
                settings.severity = severity;
            }
        }
        Ok(rules)
    }

    /// Parses `fail_on`, if set.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a severity.
    pub fn fail_on(&self) -> Result<Option<Severity>, ConfigError> {
        self.fail_on.as_deref().map(str::parse).transpose()
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum number of parallel file scans.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            respect_gitignore: true,
            parallelism: None,
        }
    }
}

fn default_exclude() -> Vec<String> {
    vec![
        "**/node_modules/**".to_string(),
        "**/target/**".to_string(),
        "**/vendor/**".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

/// Per-category entry of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Whether this category is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this category.
    #[serde(default)]
    pub severity: Option<Severity>,
}

/// Named starting points for [`RuleConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Preset {
    /// Every category, warning severity.
    #[default]
    Recommended,
    /// Every category, error severity.
    Strict,
    /// Only the two categories that are always wrong.
    Minimal,
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "recommended" => Ok(Self::Recommended),
            "strict" => Ok(Self::Strict),
            "minimal" => Ok(Self::Minimal),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

/// Resolved settings for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySettings {
    /// Whether the matcher runs.
    pub enabled: bool,
    /// Severity attached to its findings.
    pub severity: Severity,
}

/// Resolved mapping category → {enabled, severity}.
///
/// Built once per run; scans only read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleConfig {
    settings: BTreeMap<Category, CategorySettings>,
}

impl RuleConfig {
    /// Builds the settings for a preset.
    #[must_use]
    pub fn from_preset(preset: Preset) -> Self {
        let settings = Category::ALL
            .into_iter()
            .map(|c| {
                let settings = match preset {
                    Preset::Recommended => CategorySettings {
                        enabled: true,
                        severity: Severity::Warning,
                    },
                    Preset::Strict => CategorySettings {
                        enabled: true,
                        severity: Severity::Error,
                    },
                    Preset::Minimal => CategorySettings {
                        enabled: matches!(
                            c,
                            Category::IndexedLoopWithoutIndexUse | Category::MapForSideEffectOnly
                        ),
                        severity: Severity::Warning,
                    },
                };
                (c, settings)
            })
            .collect();
        Self { settings }
    }

    /// Settings for a category.
    #[must_use]
    pub fn settings(&self, category: Category) -> CategorySettings {
        self.settings
            .get(&category)
            .copied()
            .unwrap_or(CategorySettings {
                enabled: true,
                severity: Severity::Warning,
            })
    }

    fn settings_mut(&mut self, category: Category) -> &mut CategorySettings {
        self.settings.entry(category).or_insert(CategorySettings {
            enabled: true,
            severity: Severity::Warning,
        })
    }

    /// Whether a category is enabled.
    #[must_use]
    pub fn is_enabled(&self, category: Category) -> bool {
        self.settings(category).enabled
    }

    /// Severity for a category.
    #[must_use]
    pub fn severity(&self, category: Category) -> Severity {
        self.settings(category).severity
    }

    /// Disables a category.
    #[must_use]
    pub fn disable(mut self, category: Category) -> Self {
        self.settings_mut(category).enabled = false;
        self
    }

    /// Sets the severity of a category.
    #[must_use]
    pub fn with_severity(mut self, category: Category, severity: Severity) -> Self {
        self.settings_mut(category).severity = severity;
        self
    }

    /// Enabled categories in priority order.
    pub fn enabled(&self) -> impl Iterator<Item = Category> + '_ {
        self.settings
            .iter()
            .filter(|(_, s)| s.enabled)
            .map(|(c, _)| *c)
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Recommended)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A `[rules.*]` table or `--disable` names no category.
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),

    /// `preset` is not one of the known presets.
    #[error("unknown preset `{0}` (expected recommended, strict or minimal)")]
    UnknownPreset(String),

    /// A severity string is not info, warning or error.
    #[error("unknown severity `{0}` (expected info, warning or error)")]
    UnknownSeverity(String),
}

//! Configuration management for Codelens

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment overrides, e.g. `CODELENS__COMPLEXITY__LOW_MAX=4`
pub const ENV_PREFIX: &str = "CODELENS";

/// Main configuration structure for Codelens
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodelensConfig {
    /// Complexity bucketing thresholds
    pub complexity: ComplexityConfig,

    /// Workspace profiling thresholds
    pub profile: ProfileConfig,

    /// Workspace traversal settings
    pub workspace: WorkspaceConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Threshold pair shared by the structure and body scorers.
/// A score `<= low_max` is low, `<= medium_max` is medium, anything above is high.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityConfig {
    pub low_max: f64,
    pub medium_max: f64,
}

impl Default for ComplexityConfig {
    fn default() -> Self {
        Self {
            low_max: 3.0,
            medium_max: 7.0,
        }
    }
}

/// Thresholds used when classifying a workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// A function body spanning more lines than this is "long"
    pub long_function_lines: usize,

    /// More long functions than this flags code complexity
    pub long_function_max: usize,

    /// More nested callbacks than this flags code complexity
    pub nested_callback_max: usize,

    /// More debug logging calls than this flags debugging practices
    pub debug_log_max: usize,

    /// Comment lines / total lines below this flags documentation
    pub comment_ratio_min: f64,

    /// A language must appear in more files than this to count as a strength
    pub language_strength_min_files: usize,

    /// An idiom cluster must exceed this combined count to count as a strength
    pub cluster_strength_min: usize,

    /// Best-practice thresholds, each worth a skill bonus when exceeded
    pub error_handling_min: usize,
    pub documentation_min: usize,
    pub type_safety_min: usize,
    pub testing_min: usize,

    /// Skill score buckets (strictly greater than)
    pub advanced_score: i64,
    pub intermediate_score: i64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            long_function_lines: 50,
            long_function_max: 2,
            nested_callback_max: 3,
            debug_log_max: 10,
            comment_ratio_min: 0.1,
            language_strength_min_files: 3,
            cluster_strength_min: 10,
            error_handling_min: 5,
            documentation_min: 10,
            type_safety_min: 10,
            testing_min: 3,
            advanced_score: 20,
            intermediate_score: 5,
        }
    }
}

/// Workspace traversal settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Path components that are never descended into
    pub ignore_patterns: Vec<String>,

    /// Files larger than this are skipped
    pub max_file_bytes: u64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: [
                ".git",
                ".svn",
                ".hg",
                "node_modules",
                "target",
                "dist",
                "build",
                "out",
                "coverage",
                ".venv",
                "venv",
                "__pycache__",
                ".idea",
                ".vscode",
                "vendor",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            max_file_bytes: 1024 * 1024,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,

    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl CodelensConfig {
    /// Load a TOML file, layered over defaults and under environment overrides
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let loaded: Self = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Defaults with environment overrides applied
    pub fn load_with_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let loaded: Self = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Parse TOML text directly, without environment overrides
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let loaded: Self = toml::from_str(content).map_err(|e| ConfigError::InvalidFormat {
            message: e.to_string(),
        })?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Render this configuration as pretty TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write this configuration as pretty TOML
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Check threshold ordering and ranges
    pub fn validate(&self) -> Result<()> {
        let complexity = &self.complexity;
        if complexity.low_max < 0.0 || complexity.medium_max < 0.0 {
            return Err(invalid("complexity", "thresholds must be non-negative"));
        }
        if complexity.low_max >= complexity.medium_max {
            return Err(invalid(
                "complexity.low_max",
                &format!(
                    "{} must be lower than medium_max {}",
                    complexity.low_max, complexity.medium_max
                ),
            ));
        }

        let profile = &self.profile;
        if !(0.0..=1.0).contains(&profile.comment_ratio_min) {
            return Err(invalid(
                "profile.comment_ratio_min",
                &profile.comment_ratio_min.to_string(),
            ));
        }
        if profile.intermediate_score >= profile.advanced_score {
            return Err(invalid(
                "profile.intermediate_score",
                &format!(
                    "{} must be lower than advanced_score {}",
                    profile.intermediate_score, profile.advanced_score
                ),
            ));
        }
        if profile.long_function_lines == 0 {
            return Err(invalid("profile.long_function_lines", "0"));
        }

        Ok(())
    }
}

fn invalid(key: &str, value: &str) -> crate::error::CodelensError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodelensError;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = CodelensConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.complexity.low_max, 3.0);
        assert_eq!(config.complexity.medium_max, 7.0);
        assert!(config.workspace.ignore_patterns.contains(&"node_modules".to_string()));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CodelensConfig::from_toml_str(
            r#"
[complexity]
low_max = 4.0

[profile]
debug_log_max = 25
"#,
        )
        .unwrap();

        assert_eq!(config.complexity.low_max, 4.0);
        assert_eq!(config.complexity.medium_max, 7.0);
        assert_eq!(config.profile.debug_log_max, 25);
        assert_eq!(config.profile.long_function_lines, 50);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let result = CodelensConfig::from_toml_str(
            r#"
[complexity]
low_max = 8.0
medium_max = 7.0
"#,
        );
        assert!(matches!(result, Err(CodelensError::Config { .. })));
    }

    #[test]
    fn test_bad_ratio_rejected() {
        let mut config = CodelensConfig::default();
        config.profile.comment_ratio_min = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("codelens.toml");

        let mut config = CodelensConfig::default();
        config.profile.long_function_lines = 80;
        config.logging.json = true;
        config.save_to_file(&path).unwrap();

        let loaded = CodelensConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.profile.long_function_lines, 80);
        assert!(loaded.logging.json);
    }

    #[test]
    fn test_missing_file() {
        let result = CodelensConfig::load_from_file(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(CodelensError::NotFound { .. })));
    }
}

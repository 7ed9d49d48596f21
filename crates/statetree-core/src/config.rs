//! State tree service configuration
//!
//! Loaded from TOML. Every section and field is optional; defaults
//! reproduce the standard navigation and preview behaviour.

use std::path::Path;

use serde::{Deserialize, Serialize};

use statetree_error::{StateTreeError, StateTreeResult};

use crate::navigator::DEFAULT_MAX_INDIRECTION_DEPTH;
use crate::preview::PreviewLimits;

/// Main configuration for the state tree service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateTreeConfig {
    /// Navigation settings
    pub navigation: NavigationConfig,

    /// Preview bounds
    pub preview: PreviewLimits,

    /// Log output settings
    pub logging: LoggingConfig,
}

/// Navigation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Longest chain of indirections followed before reporting corrupt data
    pub max_indirection_depth: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_indirection_depth: DEFAULT_MAX_INDIRECTION_DEPTH,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "statetree_core=trace,info"
    pub level: String,

    /// Emit JSON lines instead of human-readable output
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

impl StateTreeConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> StateTreeResult<Self> {
        toml::from_str(text).map_err(|e| StateTreeError::Config(e.to_string()))
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> StateTreeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| StateTreeError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = StateTreeConfig::from_toml_str("").unwrap();
        assert_eq!(config, StateTreeConfig::default());
        assert_eq!(config.preview.max_sequence_len, 4);
        assert_eq!(config.preview.max_string_chars, 64);
        assert_eq!(config.navigation.max_indirection_depth, 64);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_sections() {
        let config = StateTreeConfig::from_toml_str(
            r#"
            [preview]
            max_string_chars = 16

            [logging]
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.preview.max_string_chars, 16);
        assert_eq!(config.preview.max_sequence_len, 4);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let err = StateTreeConfig::from_toml_str("[navigation]\nmax_indirection_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, StateTreeError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[navigation]\nmax_indirection_depth = 8").unwrap();
        let config = StateTreeConfig::load(file.path()).unwrap();
        assert_eq!(config.navigation.max_indirection_depth, 8);

        let missing = StateTreeConfig::load("/nonexistent/statetree.toml").unwrap_err();
        assert!(missing.to_string().contains("Failed to read"));
    }
}

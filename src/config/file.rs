// * JSON configuration file: { "browser": {...}, "run": {...} }
// * Missing keys fall back to the stock defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::config::{BrowserConfig, CrawlerRunConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub browser: BrowserConfig,
    pub run: CrawlerRunConfig,
}

impl FileConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: FileConfig = serde_json::from_str(raw)?;
        config.browser.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded config file {}", path.display());
        Self::from_json(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchMode;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = FileConfig::from_json(
            r#"{ "browser": { "headless": true }, "run": { "word_count_threshold": 10, "fetch_mode": "http" } }"#,
        )
        .unwrap();

        assert!(config.browser.headless);
        assert_eq!(config.browser.viewport_width, 1366);
        assert_eq!(config.run.word_count_threshold, 10);
        assert_eq!(config.run.fetch_mode, FetchMode::Http);
        assert!(config.run.exclude_external_links);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(FileConfig::from_json("{}").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            FileConfig::from_json("{ browser: "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = FileConfig::from_json(r#"{ "browser": { "viewport_height": 0 } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = FileConfig::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}

// * Browser configuration: lives for the whole crawler session

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::constants::{DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
use crate::config::file::ConfigError;

// * Chromium flags applied in text mode (no images, no remote fonts).
// * Script execution stays under `java_script_enabled`.
const TEXT_MODE_ARGS: &[&str] = &["--blink-settings=imagesEnabled=false", "--disable-remote-fonts"];

/// Options controlling the automated rendering environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Hide the browser window
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Skip images and remote fonts
    pub text_mode: bool,
    pub java_script_enabled: bool,
    /// Debug-level logging
    pub verbose: bool,
    /// Overrides the identity profile user agent
    pub user_agent: Option<String>,
    /// Proxy URL used by both the browser and the HTTP client
    pub proxy: Option<String>,
    pub chrome_executable: Option<PathBuf>,
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            text_mode: false,
            java_script_enabled: true,
            verbose: true,
            user_agent: None,
            proxy: None,
            chrome_executable: None,
            extra_args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "viewport must be non-zero, got {}x{}",
                self.viewport_width, self.viewport_height
            )));
        }

        if let Some(proxy) = &self.proxy {
            url::Url::parse(proxy)
                .map_err(|e| ConfigError::Invalid(format!("proxy '{}': {}", proxy, e)))?;
        }

        Ok(())
    }

    // * Chromium launch flags derived from this config (excluding window/viewport)
    pub fn launch_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--disable-blink-features=AutomationControlled".into(),
            "--disable-infobars".into(),
            "--disable-dev-shm-usage".into(),
        ];

        if self.text_mode {
            args.extend(TEXT_MODE_ARGS.iter().map(|a| a.to_string()));
        }

        if let Some(proxy) = &self.proxy {
            args.push(format!("--proxy-server={}", proxy));
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_script() {
        let config = BrowserConfig::default();
        assert!(!config.headless);
        assert_eq!(config.viewport_width, 1366);
        assert_eq!(config.viewport_height, 768);
        assert!(!config.text_mode);
        assert!(config.java_script_enabled);
        assert!(config.verbose);
    }

    #[test]
    fn test_zero_viewport_rejected() {
        let config = BrowserConfig {
            viewport_width: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_proxy_rejected() {
        let config = BrowserConfig {
            proxy: Some("not a url".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_text_mode_adds_image_flags() {
        let plain = BrowserConfig::default().launch_args();
        assert!(!plain.iter().any(|a| a.contains("imagesEnabled")));

        let text = BrowserConfig {
            text_mode: true,
            proxy: Some("http://127.0.0.1:8080".into()),
            ..Default::default()
        }
        .launch_args();
        assert!(text.iter().any(|a| a == "--blink-settings=imagesEnabled=false"));
        assert!(text.iter().any(|a| a == "--proxy-server=http://127.0.0.1:8080"));
        assert!(!text.iter().any(|a| a == "--disable-images" || a == "--disable-javascript"));
    }
}

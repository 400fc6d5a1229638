use reqwest::header::{HeaderMap, HeaderValue};

use crate::network::errors::NetworkError;

// * IdentityProfile defines the browser fingerprinting characteristics.
// * The same user agent is handed to Chromium so both fetch paths look alike.
#[derive(Debug, Clone)]
pub struct IdentityProfile {
    pub chrome_version: &'static str,
    pub user_agent: String,
    pub sec_ch_ua: String,
    pub sec_ch_ua_platform: String,
}

impl IdentityProfile {
    // * Desktop Chrome 120 on Windows.
    pub fn chrome_desktop() -> Self {
        let major_version = "120";
        let full_version = "120.0.6099.109";

        Self {
            chrome_version: major_version,
            user_agent: format!(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
                full_version
            ),
            sec_ch_ua: format!(
                r#""Chromium";v="{}", "Google Chrome";v="{}", "Not_A Brand";v="99""#,
                major_version, major_version
            ),
            sec_ch_ua_platform: r#""Windows""#.to_string(),
        }
    }

    // * Desktop profile with an optional user agent override.
    pub fn with_user_agent(user_agent: Option<&str>) -> Self {
        let mut profile = Self::chrome_desktop();
        if let Some(ua) = user_agent {
            profile.user_agent = ua.to_string();
        }
        profile
    }

    // * Applies the configured profile to a mutable HeaderMap.
    pub fn apply_to_headers(&self, headers: &mut HeaderMap) -> Result<(), NetworkError> {
        let value = |raw: &str| {
            HeaderValue::from_str(raw).map_err(|_| NetworkError::InvalidHeader(raw.to_string()))
        };

        headers.insert("User-Agent", value(&self.user_agent)?);
        headers.insert("sec-ch-ua", value(&self.sec_ch_ua)?);
        headers.insert("sec-ch-ua-platform", value(&self.sec_ch_ua_platform)?);
        headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
        headers.insert("Accept-Language", HeaderValue::from_static("en-US,en;q=0.9"));
        Ok(())
    }
}

impl Default for IdentityProfile {
    fn default() -> Self {
        Self::chrome_desktop()
    }
}

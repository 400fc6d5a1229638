// * Browser rendering via ChromiumOxide
// * Owns one Chromium process for the lifetime of a crawler session

use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetScriptExecutionDisabledParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::constants::OVERLAY_Z_INDEX;
use crate::config::{BrowserConfig, CrawlerRunConfig};
use crate::network::identity::IdentityProfile;

// * Removes dialogs, consent banners and large fixed layers, then unlocks scrolling.
// * __Z_INDEX__ is substituted before injection.
const OVERLAY_REMOVAL_JS: &str = r#"
(() => {
    const selectors = [
        '[role="dialog"]', '[aria-modal="true"]',
        '[class*="modal" i]', '[id*="modal" i]',
        '[class*="popup" i]', '[id*="popup" i]',
        '[class*="overlay" i]', '[class*="lightbox" i]',
        '[class*="cookie" i]', '[id*="cookie" i]',
        '[class*="consent" i]', '[id*="consent" i]'
    ];
    const overlayWords = ['modal', 'popup', 'overlay', 'lightbox', 'cookie', 'consent'];
    const statePrefixes = ['no', 'not', 'non', 'has', 'is', 'with', 'without'];
    const namesOverlay = token => {
        const words = token.replace(/([a-z0-9])([A-Z])/g, '$1-$2').toLowerCase().split(/[-_]+/).filter(Boolean);
        if (words.length && statePrefixes.includes(words[0])) return false;
        return words.some(w => overlayWords.includes(w) || overlayWords.includes(w.replace(/s$/, '')));
    };
    const isOverlay = el => {
        if (el === document.body || el === document.documentElement) return false;
        if (el.querySelector('article, main, [role="main"], h1')) return false;
        const role = el.getAttribute('role');
        if (role === 'dialog' || role === 'alertdialog' || el.getAttribute('aria-modal') === 'true') return true;
        return [...el.classList, el.id].some(t => t && namesOverlay(t));
    };

    const doomed = new Set();
    for (const sel of selectors) {
        document.querySelectorAll(sel).forEach(el => { if (isOverlay(el)) doomed.add(el); });
    }

    const viewportArea = window.innerWidth * window.innerHeight;
    document.querySelectorAll('body *').forEach(el => {
        const style = window.getComputedStyle(el);
        if (style.position !== 'fixed' && style.position !== 'sticky') return;
        const z = parseInt(style.zIndex, 10);
        if (isNaN(z) || z <= __Z_INDEX__) return;
        const rect = el.getBoundingClientRect();
        if (rect.width * rect.height <= viewportArea * 0.5) return;
        if (!el.querySelector('article, main, [role="main"], h1')) doomed.add(el);
    });

    doomed.forEach(el => el.remove());
    if (document.body) document.body.style.overflow = 'auto';
    document.documentElement.style.overflow = 'auto';
    return doomed.size;
})()
"#;

// * Swaps readable (same-origin) iframes for their body markup
const IFRAME_INLINE_JS: &str = r#"
(() => {
    let inlined = 0;
    document.querySelectorAll('iframe').forEach(frame => {
        let doc = null;
        try { doc = frame.contentDocument; } catch (e) { doc = null; }
        if (!doc || !doc.body) return;
        const div = document.createElement('div');
        div.className = 'iframe-content';
        div.setAttribute('data-iframe-src', frame.src || '');
        div.innerHTML = doc.body.innerHTML;
        frame.replaceWith(div);
        inlined++;
    });
    return inlined;
})()
"#;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("Page navigation failed: {0}")]
    Navigation(String),

    #[error("Page timeout after {0}ms")]
    Timeout(u64),

    #[error("Script injection failed: {0}")]
    ScriptInjection(String),

    #[error("Content extraction failed: {0}")]
    ContentExtraction(String),
}

// * Per-render knobs gathered from both config records
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub page_timeout_ms: u64,
    pub delay_before_return_ms: u64,
    pub java_script_enabled: bool,
    pub remove_overlays: bool,
    pub process_iframes: bool,
    pub user_agent: String,
}

impl RenderOptions {
    pub fn from_configs(browser: &BrowserConfig, run: &CrawlerRunConfig) -> Self {
        Self {
            page_timeout_ms: run.page_timeout_ms,
            delay_before_return_ms: run.delay_before_return_ms,
            java_script_enabled: browser.java_script_enabled,
            remove_overlays: run.remove_overlay_elements,
            process_iframes: run.process_iframes,
            user_agent: IdentityProfile::with_user_agent(browser.user_agent.as_deref()).user_agent,
        }
    }
}

#[derive(Debug)]
pub struct RenderedPage {
    pub html: String,
    pub final_url: String,
}

// * Builds the chromiumoxide launch config from ours
pub fn chrome_config(config: &BrowserConfig) -> Result<ChromeConfig, RenderError> {
    let mut builder = ChromeConfig::builder()
        .no_sandbox()
        .window_size(config.viewport_width, config.viewport_height)
        .viewport(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            ..Default::default()
        })
        .args(config.launch_args());

    if !config.headless {
        builder = builder.with_head();
    }

    if let Some(path) = &config.chrome_executable {
        builder = builder.chrome_executable(path);
    }

    builder.build().map_err(RenderError::BrowserLaunch)
}

// * A live browser plus the task pumping its CDP event stream
pub struct BrowserSession {
    browser: Browser,
    handler: Option<tokio::task::JoinHandle<()>>,
}

impl BrowserSession {
    pub async fn launch(config: &BrowserConfig) -> Result<Self, RenderError> {
        let (browser, mut handler) = Browser::launch(chrome_config(config)?)
            .await
            .map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler event error: {}", e);
                }
            }
        });

        info!(
            "Browser launched (headless={}, viewport={}x{})",
            config.headless, config.viewport_width, config.viewport_height
        );

        Ok(Self {
            browser,
            handler: Some(handle),
        })
    }

    // * Renders a page and returns the post-script DOM
    pub async fn render(&self, url: &str, options: &RenderOptions) -> Result<RenderedPage, RenderError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        let result = self.render_on(&page, url, options).await;

        if let Err(e) = page.close().await {
            debug!("Page close failed: {}", e);
        }

        result
    }

    async fn render_on(&self, page: &Page, url: &str, options: &RenderOptions) -> Result<RenderedPage, RenderError> {
        page.execute(SetUserAgentOverrideParams::new(options.user_agent.clone()))
            .await
            .map_err(|e| RenderError::ScriptInjection(e.to_string()))?;

        if !options.java_script_enabled {
            page.execute(SetScriptExecutionDisabledParams::new(true))
                .await
                .map_err(|e| RenderError::ScriptInjection(e.to_string()))?;
        }

        let timeout = Duration::from_millis(options.page_timeout_ms);
        match tokio::time::timeout(timeout, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(RenderError::Navigation(e.to_string())),
            Err(_) => return Err(RenderError::Timeout(options.page_timeout_ms)),
        }

        // * Let late scripts settle
        tokio::time::sleep(Duration::from_millis(options.delay_before_return_ms)).await;

        if options.java_script_enabled {
            if options.remove_overlays {
                let script = OVERLAY_REMOVAL_JS.replace("__Z_INDEX__", &OVERLAY_Z_INDEX.to_string());
                match evaluate_count(page, &script).await {
                    Ok(n) => debug!("Removed {} overlay elements", n),
                    Err(e) => warn!("Overlay removal failed: {}", e),
                }
            }

            if options.process_iframes {
                match evaluate_count(page, IFRAME_INLINE_JS).await {
                    Ok(n) => debug!("Inlined {} same-origin iframes", n),
                    Err(e) => warn!("Iframe inlining failed: {}", e),
                }
            }
        }

        let final_url = page
            .url()
            .await
            .map_err(|e| RenderError::ContentExtraction(e.to_string()))?
            .unwrap_or_else(|| url.to_string());

        let html = page
            .content()
            .await
            .map_err(|e| RenderError::ContentExtraction(e.to_string()))?;

        Ok(RenderedPage { html, final_url })
    }

    // * Closes the browser gracefully
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            debug!("Browser close failed: {}", e);
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        info!("Browser session closed");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // * Can't await in drop; Browser's own Drop kills the child process
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

async fn evaluate_count(page: &Page, script: &str) -> Result<u64, RenderError> {
    page.evaluate(script)
        .await
        .map_err(|e| RenderError::ScriptInjection(e.to_string()))?
        .into_value::<u64>()
        .map_err(|e| RenderError::ScriptInjection(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_script_targets_dialogs_and_fixed_layers() {
        assert!(OVERLAY_REMOVAL_JS.contains(r#"[role="dialog"]"#));
        assert!(OVERLAY_REMOVAL_JS.contains("position !== 'fixed'"));
        assert!(OVERLAY_REMOVAL_JS.contains("__Z_INDEX__"));
        assert!(OVERLAY_REMOVAL_JS.contains("statePrefixes"));
    }

    #[test]
    fn test_iframe_script_marks_inlined_content() {
        assert!(IFRAME_INLINE_JS.contains("iframe-content"));
        assert!(IFRAME_INLINE_JS.contains("data-iframe-src"));
    }

    #[test]
    fn test_render_options_follow_configs() {
        let browser = BrowserConfig {
            java_script_enabled: false,
            user_agent: Some("scribe-test/1.0".into()),
            ..Default::default()
        };
        let run = CrawlerRunConfig {
            page_timeout_ms: 1_000,
            process_iframes: false,
            ..Default::default()
        };

        let options = RenderOptions::from_configs(&browser, &run);
        assert!(!options.java_script_enabled);
        assert!(!options.process_iframes);
        assert!(options.remove_overlays);
        assert_eq!(options.page_timeout_ms, 1_000);
        assert_eq!(options.user_agent, "scribe-test/1.0");
    }

    #[test]
    fn test_chrome_config_builds_for_defaults() {
        // * Only the builder runs here; no process is spawned
        let config = BrowserConfig {
            chrome_executable: Some("/usr/bin/chromium".into()),
            ..Default::default()
        };
        assert!(chrome_config(&config).is_ok());
    }
}

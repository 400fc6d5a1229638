// * Command-line surface. Every flag is optional; with none given the
// * crawl matches the stock browser/run configuration.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use page_scribe::config::constants::DEFAULT_URL;
use page_scribe::config::{BrowserConfig, ConfigError, CrawlerRunConfig, FetchMode, FileConfig};

#[derive(Parser, Debug)]
#[command(
    name = "page-scribe",
    version,
    about = "Render a web page and print its content as markdown",
    long_about = None
)]
pub struct Args {
    /// Page to crawl: http(s)://..., file://... or raw:<html>
    #[arg(default_value = DEFAULT_URL)]
    pub url: String,

    /// JSON file with "browser" and "run" sections; flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Hide the browser window
    #[arg(long)]
    pub headless: bool,

    /// Show the browser window, even if the config file says headless
    #[arg(long, conflicts_with = "headless")]
    pub headed: bool,

    #[arg(long)]
    pub viewport_width: Option<u32>,

    #[arg(long)]
    pub viewport_height: Option<u32>,

    /// Do not load images or remote fonts
    #[arg(long)]
    pub text_mode: bool,

    /// Disable page JavaScript (also skips in-browser overlay/iframe scripts)
    #[arg(long)]
    pub no_javascript: bool,

    /// Info-level logging instead of debug
    #[arg(short, long)]
    pub quiet: bool,

    /// Minimum words per retained content block
    #[arg(short, long)]
    pub word_count_threshold: Option<usize>,

    #[arg(long)]
    pub keep_external_links: bool,

    /// Keep popups, modals and cookie banners
    #[arg(long)]
    pub keep_overlays: bool,

    /// Leave iframes out of the output
    #[arg(long)]
    pub skip_iframes: bool,

    /// browser, http or auto
    #[arg(short, long)]
    pub mode: Option<FetchMode>,

    /// Navigation timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Raw markdown
    Markdown,
    /// Markdown with numbered citations and a reference list
    Citations,
    /// Full crawl result as JSON
    Json,
}

impl Args {
    // * Config file (or defaults) with flag overrides applied, validated
    pub fn resolve(&self) -> Result<(BrowserConfig, CrawlerRunConfig), ConfigError> {
        let FileConfig { mut browser, mut run } = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        if self.headless {
            browser.headless = true;
        }
        if self.headed {
            browser.headless = false;
        }
        if let Some(width) = self.viewport_width {
            browser.viewport_width = width;
        }
        if let Some(height) = self.viewport_height {
            browser.viewport_height = height;
        }
        if self.text_mode {
            browser.text_mode = true;
        }
        if self.no_javascript {
            browser.java_script_enabled = false;
        }
        if self.quiet {
            browser.verbose = false;
        }

        if let Some(threshold) = self.word_count_threshold {
            run.word_count_threshold = threshold;
        }
        if self.keep_external_links {
            run.exclude_external_links = false;
        }
        if self.keep_overlays {
            run.remove_overlay_elements = false;
        }
        if self.skip_iframes {
            run.process_iframes = false;
        }
        if let Some(mode) = self.mode {
            run.fetch_mode = mode;
        }
        if let Some(timeout) = self.timeout_ms {
            run.page_timeout_ms = timeout;
        }

        browser.validate()?;
        Ok((browser, run))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_no_flags_reproduce_stock_crawl() {
        let args = Args::try_parse_from(["page-scribe"]).unwrap();
        let (browser, run) = args.resolve().unwrap();

        assert_eq!(args.url, DEFAULT_URL);
        assert_eq!(args.output, OutputFormat::Markdown);
        assert_eq!(browser, BrowserConfig::default());
        assert_eq!(run, CrawlerRunConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "page-scribe",
            "https://example.com",
            "--headless",
            "--viewport-width",
            "1920",
            "--no-javascript",
            "--quiet",
            "-w",
            "10",
            "--keep-external-links",
            "--skip-iframes",
            "--mode",
            "auto",
            "--output",
            "json",
        ])
        .unwrap();
        let (browser, run) = args.resolve().unwrap();

        assert!(browser.headless);
        assert_eq!(browser.viewport_width, 1920);
        assert!(!browser.java_script_enabled);
        assert!(!browser.verbose);
        assert_eq!(run.word_count_threshold, 10);
        assert!(!run.exclude_external_links);
        assert!(!run.process_iframes);
        assert!(run.remove_overlay_elements);
        assert_eq!(run.fetch_mode, FetchMode::Auto);
        assert_eq!(args.output, OutputFormat::Json);
    }

    #[test]
    fn test_headed_overrides_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "browser": {{ "headless": true }} }}"#).unwrap();
        let path = file.path().to_str().unwrap();

        let from_file = Args::try_parse_from(["page-scribe", "--config", path]).unwrap();
        assert!(from_file.resolve().unwrap().0.headless);

        let headed = Args::try_parse_from(["page-scribe", "--config", path, "--headed"]).unwrap();
        assert!(!headed.resolve().unwrap().0.headless);
    }

    #[test]
    fn test_headless_and_headed_conflict() {
        assert!(Args::try_parse_from(["page-scribe", "--headless", "--headed"]).is_err());
    }

    #[test]
    fn test_bad_mode_rejected() {
        assert!(Args::try_parse_from(["page-scribe", "--mode", "carrier-pigeon"]).is_err());
    }

    #[test]
    fn test_zero_viewport_rejected() {
        let args = Args::try_parse_from(["page-scribe", "--viewport-height", "0"]).unwrap();
        assert!(args.resolve().is_err());
    }
}

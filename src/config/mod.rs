// * Configuration layer: constants, browser/run records and file loading

pub mod browser;
pub mod constants;
pub mod file;
pub mod run;

pub use browser::BrowserConfig;
pub use file::{ConfigError, FileConfig};
pub use run::{CrawlerRunConfig, FetchMode};

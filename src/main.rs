mod cli;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cli::{Args, OutputFormat};
use page_scribe::{BrowserConfig, CrawlError, Crawler, CrawlerRunConfig};

// * Logs go to stderr so stdout carries only page content
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "page_scribe=debug,info"
    } else {
        "page_scribe=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();
}

async fn crawl(args: &Args, browser: BrowserConfig, run: CrawlerRunConfig) -> Result<String, CrawlError> {
    let mut crawler = Crawler::start(browser)?;
    let result = crawler.run(&args.url, &run).await;
    crawler.close().await;
    let result = result?;

    Ok(match args.output {
        OutputFormat::Markdown => result.markdown.to_string(),
        OutputFormat::Citations => result.markdown.with_references(),
        OutputFormat::Json => result.to_json_pretty(),
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let resolved = args.resolve();
    init_tracing(resolved.as_ref().map(|(browser, _)| browser.verbose).unwrap_or(true));

    let (browser, run) = match resolved {
        Ok(configs) => configs,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match crawl(&args, browser, run).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

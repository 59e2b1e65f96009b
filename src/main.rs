//! Webharvest main entry point
//!
//! This is the command-line interface for the Webharvest crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use webharvest::config::{load_config, validate, CliOverrides, CrawlConfig, OutputFormat};
use webharvest::crawler::{run_crawl, CrawlEvent};
use webharvest::output::write_output;
use webharvest::render::{RendererKind, WaitUntil};
use webharvest::RunState;

/// Exit status after an interrupt, as a shell would report SIGINT
const EXIT_INTERRUPTED: u8 = 130;

/// Webharvest: a bounded, scope-limited recursive web crawler
///
/// Renders the seed page, extracts its content, and follows links under
/// the same scope breadth-first until the page budget is used up.
#[derive(Parser, Debug)]
#[command(name = "webharvest")]
#[command(version)]
#[command(about = "Harvest page content from a site into JSON or Markdown", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// CSS selector of the content region [default: body]
    #[arg(short, long)]
    selector: Option<String>,

    /// Output file (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Maximum number of pages to capture [default: 10]
    #[arg(short, long)]
    max_pages: Option<usize>,

    /// Scope glob, `*` within a path segment and `**` across segments
    /// [default: the seed path followed by **]
    #[arg(short, long)]
    pattern: Option<String>,

    /// Output format [default: json]
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Rendering back-end [default: chrome]
    #[arg(long, value_enum)]
    renderer: Option<RendererKind>,

    /// TOML file with crawl and renderer settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// Navigation timeout in milliseconds [default: 30000]
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// How long to wait for the selector, in milliseconds [default: 5000]
    #[arg(long, value_name = "MS")]
    selector_timeout: Option<u64>,

    /// When navigation counts as finished [default: networkidle]
    #[arg(long, value_enum)]
    wait_until: Option<WaitUntil>,

    /// Load images, fonts and media during navigation
    #[arg(long)]
    no_block: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress everything but errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            selector: self.selector.clone(),
            max_pages: self.max_pages,
            pattern: self.pattern.clone(),
            format: self.format,
            output: self.output.clone(),
            renderer: self.renderer,
            headful: self.headful,
            navigation_timeout_ms: self.timeout,
            selector_timeout_ms: self.selector_timeout,
            wait_until: self.wait_until,
            no_block_resources: self.no_block,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match handle_crawl(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout stays clean for results.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("webharvest=info,warn"),
            2 => EnvFilter::new("webharvest=debug,info"),
            3 => EnvFilter::new("webharvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Merges the config file and flags into the effective configuration
fn resolve_config(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => CrawlConfig::default(),
    };

    cli.overrides().apply(&mut config);
    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Prints progress lines while the crawl runs
///
/// Only used at the default verbosity; with `-v` the log lines carry the
/// same information.
async fn report_progress(mut events: mpsc::UnboundedReceiver<CrawlEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            CrawlEvent::Started { seed, max_pages } => {
                eprintln!("Crawling {} (up to {} pages)", seed, max_pages);
            }
            CrawlEvent::PageCaptured {
                url,
                title,
                captured,
                max_pages,
            } => {
                if title.is_empty() {
                    eprintln!("[{}/{}] {}", captured, max_pages, url);
                } else {
                    eprintln!("[{}/{}] {} ({})", captured, max_pages, url, title);
                }
            }
            CrawlEvent::PageFailed { .. } | CrawlEvent::Enqueued { .. } => {}
            CrawlEvent::Finished { .. } => break,
        }
    }
}

/// Handles the main crawl operation
async fn handle_crawl(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = resolve_config(&cli)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping");
            interrupt.cancel();
        }
    });

    let (events, progress) = if cli.verbose == 0 && !cli.quiet {
        let (tx, rx) = mpsc::unbounded_channel();
        (Some(tx), Some(tokio::spawn(report_progress(rx))))
    } else {
        (None, None)
    };

    let outcome = run_crawl(&cli.url, &config, cancel, events).await?;
    if let Some(progress) = progress {
        // the sender is dropped with the coordinator, so this cannot hang
        let _ = progress.await;
    }

    write_output(&outcome.pages, config.crawl.format, config.crawl.output.as_deref())
        .context("Failed to write results")?;

    if !cli.quiet {
        eprintln!("{}", outcome.summary);
    }

    if let Some(e) = &outcome.release_error {
        tracing::error!("{}", e);
        return Ok(ExitCode::FAILURE);
    }

    if outcome.state == RunState::Aborted {
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    }

    Ok(ExitCode::SUCCESS)
}

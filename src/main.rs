//! Site-Sweep main entry point
//!
//! This is the command-line interface for the Site-Sweep domain crawler.

use anyhow::{bail, Context};
use clap::Parser;
use site_sweep::config::{load_settings, CrawlConfig, Settings};
use site_sweep::crawler::crawl_until_cancelled;
use site_sweep::output::{print_console_summary, write_log_file};
use site_sweep::url::validate_domain_input;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Site-Sweep: a polite single-domain crawler
///
/// Site-Sweep crawls every reachable page of one domain (and its `www.` variant),
/// lists the pages and static assets it found, and writes them to
/// `<domain>_log.txt`.
#[derive(Parser, Debug)]
#[command(name = "site-sweep")]
#[command(version)]
#[command(about = "A polite single-domain crawler", long_about = None)]
struct Cli {
    /// Domain to crawl, e.g. example.com (prompted for when omitted)
    #[arg(value_name = "DOMAIN")]
    domain: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory the log file is written to (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut settings = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_settings(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Settings::default(),
    };
    if let Some(dir) = cli.output_dir {
        settings.output.directory = dir;
    }

    let domain = match cli.domain {
        Some(domain) => validate_domain_input(&domain)?,
        None => prompt_for_domain()?,
    };

    let config = CrawlConfig::new(&domain, &settings)?;
    tracing::info!(
        "Crawling {} (allowed: {})",
        config.seed,
        config.allowed_domains.join(", ")
    );

    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with the pages found so far");
            ctrl_c.cancel();
        }
    });

    let report = crawl_until_cancelled(config, token).await?;
    tracing::info!(
        "{} pages in {:.2}s ({:.2} pages/sec, {:.1}% success)",
        report.stats.visited,
        report.stats.elapsed.as_secs_f64(),
        report.stats.pages_per_second(),
        report.stats.success_rate()
    );

    print_console_summary(&report.result);

    let path = write_log_file(&settings.output.directory, &domain, &report.result)
        .with_context(|| {
            format!(
                "Failed to write crawl log to {}",
                settings.output.directory.display()
            )
        })?;
    tracing::info!("Crawl log written to: {}", path.display());

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_sweep=info,warn"),
            1 => EnvFilter::new("site_sweep=debug,info"),
            2 => EnvFilter::new("site_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(io::stderr)
        .init();
}

/// Asks for a domain on stdin until a valid one is entered
fn prompt_for_domain() -> anyhow::Result<String> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        print!("Enter domain (e.g. example.com): ");
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            bail!("No domain entered");
        }

        match validate_domain_input(&line) {
            Ok(domain) => return Ok(domain),
            Err(e) => println!("{}", e),
        }
    }
}

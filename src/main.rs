//! docmirror main entry point
//!
//! This is the command-line interface for the docmirror documentation mirror.

use anyhow::{bail, Context};
use clap::Parser;
use docmirror::config::{read_config, validate, Config};
use docmirror::output::print_summary;
use docmirror::{Mirror, SiteFamily};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// docmirror: mirror a documentation site as Markdown
///
/// docmirror discovers the pages of a documentation site (sitemap, navigation
/// manifest or sidebar), extracts the main content of each page and saves it
/// as Markdown, with images, under a path derived from the page URL.
#[derive(Parser, Debug)]
#[command(name = "docmirror")]
#[command(version)]
#[command(about = "Mirror a documentation site as Markdown", long_about = None)]
struct Cli {
    /// Root URL of the documentation site
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short, long)]
    concurrency: Option<u32>,

    /// Leave existing Markdown files untouched and skip their download
    #[arg(short, long)]
    skip_existing: bool,

    /// Documentation platform the site is built with
    #[arg(long, value_enum)]
    family: Option<SiteFamily>,

    /// Try raw `.md`/`.mdx` page sources before converting HTML
    #[arg(long)]
    prefer_source: Option<bool>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
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

    let config = build_config(&cli)?;
    tracing::info!(
        "Mirroring {} with {} workers",
        config.mirror.base_url,
        config.mirror.concurrency
    );

    let mirror = Mirror::new(config).context("Failed to start mirror")?;
    let stats = mirror
        .run_with_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Received Ctrl-C");
            }
        })
        .await
        .context("Mirror run failed")?;

    if !cli.quiet {
        print_summary(&stats);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("docmirror=info,warn"),
            1 => EnvFilter::new("docmirror=debug,info"),
            _ => EnvFilter::new("docmirror=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the optional config file and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            read_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(url) = &cli.url {
        config.mirror.base_url = url.clone();
    }
    if let Some(output) = &cli.output {
        config.mirror.output_dir = output.display().to_string();
    }
    if let Some(concurrency) = cli.concurrency {
        config.mirror.concurrency = concurrency;
    }
    if cli.skip_existing {
        config.mirror.skip_existing = true;
    }
    if let Some(family) = cli.family {
        config.mirror.family = family;
    }
    if cli.prefer_source.is_some() {
        config.mirror.prefer_source = cli.prefer_source;
    }

    if config.mirror.base_url.is_empty() {
        bail!("No base URL given; pass it as an argument or set base-url in [mirror]");
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

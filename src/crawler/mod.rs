//! Crawler module for page fetching and processing
//!
//! This module contains the core mirroring logic, including:
//! - HTTP fetching under one run-wide concurrency limit
//! - The deduplicating frontier shared by all workers
//! - Exactly-once image downloads
//! - Optional rendered-DOM capture and raw-source probing
//! - The worker pool that drives a run ([`Mirror`])

mod fetcher;
mod frontier;
mod images;
mod pool;
mod render;
mod source;

pub use fetcher::{build_http_client, FetchResult, Fetched, HttpFetcher};
pub use frontier::{Claim, Frontier, FrontierEntry, Origin, Take};
pub use images::ImagePipeline;
pub use pool::Mirror;
pub use render::PageRenderer;
pub use source::{looks_like_html, probe_source, source_candidates};

use crate::config::Config;
use crate::output::RunStats;
use crate::Result;

/// Runs a complete mirror operation
///
/// This is the main entry point for mirroring a site. It will:
/// 1. Create the output root and HTTP client
/// 2. Discover seed pages
/// 3. Drain the frontier with a pool of workers
/// 4. Return the final statistics
///
/// # Arguments
///
/// * `config` - A validated configuration
///
/// # Returns
///
/// * `Ok(RunStats)` - The run finished (individual pages may have failed)
/// * `Err(MirrorError)` - The run could not start
pub async fn mirror(config: Config) -> Result<RunStats> {
    Mirror::new(config)?.run().await
}

//! Mirror coordinator - discovery, worker pool and per-page processing
//!
//! This module contains the run loop that coordinates all aspects of a
//! mirror, including:
//! - Seeding the frontier from the site's discovery strategies
//! - Running a fixed pool of workers until the frontier is drained
//! - Fetching, extracting, converting and saving each page
//! - Feeding discovered links back into the frontier
//! - Handling interrupts and reporting progress

use crate::config::Config;
use crate::crawler::frontier::{Claim, Frontier, Origin, Take};
use crate::crawler::source::probe_source;
use crate::crawler::{build_http_client, HttpFetcher, ImagePipeline, PageRenderer};
use crate::discovery::{adapter_chain, discover, SiteAdapter};
use crate::extract::ContentExtractor;
use crate::markdown::{compose_document, is_stub, Conversion, MarkdownConverter};
use crate::output::{write_markdown, RunStats, StatsRecorder};
use crate::site::SiteProfile;
use crate::state::{PageOutcome, SkipReason};
use crate::url::{normalize_url, page_output_path, PageUrl, SiteScope};
use crate::{MirrorError, Result};
use futures::future::join_all;
use scraper::Html;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use url::Url;

/// Progress is logged every this many processed pages
const PROGRESS_INTERVAL: u64 = 10;

/// Main mirror structure
///
/// Built from a validated [`Config`]; consumed by [`Mirror::run`].
pub struct Mirror {
    config: Arc<Config>,
    scope: SiteScope,
    profile: &'static SiteProfile,
    output_root: PathBuf,
    fetcher: HttpFetcher,
    extractor: Arc<ContentExtractor>,
    renderer: Option<Arc<dyn PageRenderer>>,
    stats: Arc<StatsRecorder>,
}

/// State shared by all workers of one run
struct Worker {
    scope: SiteScope,
    output_root: PathBuf,
    fetcher: HttpFetcher,
    frontier: Arc<Frontier>,
    adapter: Arc<dyn SiteAdapter>,
    extractor: Arc<ContentExtractor>,
    converter: MarkdownConverter,
    images: ImagePipeline,
    renderer: Option<Arc<dyn PageRenderer>>,
    stats: Arc<StatsRecorder>,
    processed: AtomicU64,
    skip_existing: bool,
    prefer_source: bool,
    min_content_chars: usize,
    idle: Duration,
}

/// Owned result of the synchronous parse step
struct Prepared {
    links: Vec<PageUrl>,
    converted: Result<(Option<String>, Conversion)>,
}

impl Mirror {
    /// Creates a new mirror instance
    ///
    /// # Arguments
    ///
    /// * `config` - A validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Mirror)` - Ready to run; the output root exists
    /// * `Err(MirrorError)` - Bad base URL, client setup failure, or the
    ///   output root could not be created
    pub fn new(config: Config) -> Result<Self> {
        let base = normalize_url(&config.mirror.base_url, config.content.keep_query)?;
        let scope = SiteScope::new(base, config.content.keep_query);
        let profile = config.mirror.family.profile();

        let output_root = PathBuf::from(&config.mirror.output_dir);
        std::fs::create_dir_all(&output_root)
            .map_err(|e| MirrorError::filesystem(&output_root, e))?;

        let client = build_http_client(&config.user_agent, &config.http)?;
        let fetcher = HttpFetcher::new(client, config.mirror.concurrency as usize);
        let extractor = ContentExtractor::new(profile, &config.content)?;

        Ok(Self {
            config: Arc::new(config),
            scope,
            profile,
            output_root,
            fetcher,
            extractor: Arc::new(extractor),
            renderer: None,
            stats: Arc::new(StatsRecorder::new()),
        })
    }

    /// Supplies the rendered-DOM capability for client-side rendered sites
    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Runs the mirror until the frontier is drained
    pub async fn run(self) -> Result<RunStats> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the mirror until the frontier is drained or `shutdown` completes
    ///
    /// On shutdown the frontier is closed: workers finish the page they are
    /// working on and exit, queued pages are abandoned.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use docmirror::config::Config;
    /// use docmirror::Mirror;
    ///
    /// # async fn example(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    /// let mirror = Mirror::new(config)?;
    /// let stats = mirror
    ///     .run_with_shutdown(async {
    ///         let _ = tokio::signal::ctrl_c().await;
    ///     })
    ///     .await?;
    /// println!("{} pages saved", stats.downloaded);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> Result<RunStats>
    where
        F: Future<Output = ()> + Send,
    {
        info!(
            "Mirroring {} ({}) into {}",
            self.scope.base(),
            self.config.mirror.family,
            self.output_root.display()
        );

        let renderer = if self.profile.requires_rendering {
            if self.renderer.is_none() {
                warn!(
                    "{} sites render client-side but no renderer is available; falling back to plain HTTP",
                    self.config.mirror.family
                );
            }
            self.renderer.clone()
        } else {
            None
        };

        let chain = adapter_chain(&self.scope, self.profile);
        let discovery = discover(chain, &self.scope, &self.fetcher).await;

        let frontier = Frontier::new();
        let accepted = discovery
            .seeds
            .into_iter()
            .filter(|seed| frontier.offer(seed.clone(), Origin::Seed))
            .count();
        self.stats.record_discovered(accepted as u64);
        info!("Seeded frontier with {} pages", accepted);

        let worker = Arc::new(Worker {
            scope: self.scope.clone(),
            output_root: self.output_root.clone(),
            fetcher: self.fetcher.clone(),
            frontier: frontier.clone(),
            adapter: discovery.adapter,
            extractor: self.extractor.clone(),
            converter: MarkdownConverter::new(self.profile),
            images: ImagePipeline::new(
                self.fetcher.clone(),
                self.output_root.clone(),
                self.stats.clone(),
            ),
            renderer,
            stats: self.stats.clone(),
            processed: AtomicU64::new(0),
            skip_existing: self.config.mirror.skip_existing,
            prefer_source: self
                .config
                .mirror
                .prefer_source
                .unwrap_or(self.profile.publishes_sources),
            min_content_chars: self.config.content.min_content_chars,
            idle: Duration::from_secs(self.config.http.idle_timeout_secs),
        });

        let mut workers = JoinSet::new();
        for id in 0..self.config.mirror.concurrency.max(1) {
            let worker = worker.clone();
            workers.spawn(async move { worker.run(id).await });
        }

        tokio::pin!(shutdown);
        let mut interrupted = false;
        loop {
            tokio::select! {
                joined = workers.join_next() => match joined {
                    Some(Ok(())) => {}
                    Some(Err(e)) => error!("Worker task failed: {}", e),
                    None => break,
                },
                _ = &mut shutdown, if !interrupted => {
                    warn!("Interrupted; finishing pages in progress");
                    frontier.close();
                    interrupted = true;
                }
            }
        }

        let stats = self.stats.snapshot();
        info!(
            "Mirror completed: {} of {} known pages processed, {} distinct images in {:?}",
            stats.processed(),
            frontier.seen(),
            worker.images.distinct(),
            stats.elapsed
        );
        Ok(stats)
    }
}

impl Worker {
    /// Worker loop: claim, process, repeat until drained or closed
    async fn run(self: Arc<Self>, id: u32) {
        debug!("Worker {} started", id);
        loop {
            match self.frontier.take(self.idle).await {
                Take::Entry(claim) => {
                    let outcome = self.process(&claim).await;
                    debug!("[worker {}] {} ({:?}): {}", id, claim.url(), claim.origin(), outcome);
                    self.stats.record_page(&outcome);
                    drop(claim);
                    self.report_progress();
                }
                Take::Idle => continue,
                Take::Drained | Take::Closed => break,
            }
        }
        debug!("Worker {} finished", id);
    }

    fn report_progress(&self) {
        let processed = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if processed % PROGRESS_INTERVAL == 0 {
            info!(
                "Progress: {} pages processed, {} in frontier, {} in flight, {:.2} pages/sec",
                processed,
                self.frontier.queued(),
                self.frontier.in_flight(),
                self.stats.snapshot().pages_per_second()
            );
        }
    }

    /// Processes one claimed page; every failure becomes a `Failed` outcome
    async fn process(&self, claim: &Claim) -> PageOutcome {
        let page = claim.url();
        let relative = page_output_path(&self.scope, page);
        let target = self.output_root.join(&relative);

        if self.skip_existing && tokio::fs::try_exists(&target).await.unwrap_or(false) {
            return PageOutcome::Skipped(SkipReason::AlreadyExists);
        }

        match self.mirror_page(page, &relative, &target).await {
            Ok(outcome) => outcome,
            Err(e) => e.into(),
        }
    }

    /// Fetches, converts and saves one page
    ///
    /// Links found on the page are offered to the frontier before this
    /// returns, so they are queued while the page is still in flight.
    async fn mirror_page(&self, page: &PageUrl, relative: &Path, target: &Path) -> Result<PageOutcome> {
        let (html, page_url) = self.fetch_page(page).await?;
        let prepared = self.prepare(&html, &page_url, relative);

        let offered = prepared
            .links
            .into_iter()
            .filter(|link| self.frontier.offer(link.clone(), Origin::Link))
            .count();
        if offered > 0 {
            self.stats.record_discovered(offered as u64);
        }

        if self.prefer_source {
            if let Some(markdown) = probe_source(&self.fetcher, &self.images, page, relative).await {
                write_markdown(target, &markdown).await?;
                return Ok(PageOutcome::Downloaded {
                    path: relative.to_path_buf(),
                });
            }
        }

        let (title, conversion) = prepared.converted?;
        let document = compose_document(title.as_deref(), &conversion.markdown);
        if is_stub(&document, self.min_content_chars) {
            return Ok(PageOutcome::Skipped(SkipReason::NoContent));
        }

        // Failed images are logged and counted by the pipeline
        join_all(conversion.images.iter().map(|image| self.images.ensure(image))).await;

        write_markdown(target, &document).await?;
        Ok(PageOutcome::Downloaded {
            path: relative.to_path_buf(),
        })
    }

    /// Returns the page HTML and the URL relative links resolve against
    async fn fetch_page(&self, page: &PageUrl) -> Result<(String, Url)> {
        let location = page.location();
        if let Some(renderer) = &self.renderer {
            let html = renderer.render(location.as_str()).await?;
            return Ok((html, location.clone()));
        }

        let fetched = self.fetcher.get(location.as_str()).await?;
        if !fetched.is_html() {
            return Err(MirrorError::Parse {
                what: "page",
                url: page.to_string(),
                message: format!("unexpected content type {}", fetched.content_type),
            });
        }

        let page_url = Url::parse(&fetched.final_url).unwrap_or_else(|_| location.clone());
        Ok((fetched.text(), page_url))
    }

    /// Parses a page and returns owned links and Markdown
    fn prepare(&self, html: &str, page_url: &Url, relative: &Path) -> Prepared {
        let document = Html::parse_document(html);
        let links = self.adapter.extract_links(&document, page_url);

        let converted = self
            .extractor
            .extract(document, page_url.as_str())
            .and_then(|extracted| {
                let root = extracted.root().ok_or_else(|| MirrorError::Extraction {
                    url: page_url.to_string(),
                })?;
                let conversion = self.converter.convert_at(root, page_url, relative);
                Ok((extracted.title().map(str::to_string), conversion))
            });

        Prepared { links, converted }
    }
}

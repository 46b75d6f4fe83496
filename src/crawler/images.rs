//! Run-wide image download deduplication
//!
//! Every distinct image URL is fetched at most once per run, no matter how
//! many pages reference it or how many workers ask for it at the same time.
//! Concurrent callers for the same URL wait on one shared cell and all observe
//! the same outcome; a failed download is not retried within the run.

use crate::crawler::HttpFetcher;
use crate::markdown::ImageReference;
use crate::output::{write_atomic, StatsRecorder};
use crate::{MirrorError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Cached result of one image download
#[derive(Debug, Clone)]
enum ImageOutcome {
    Saved(PathBuf),
    Failed(String),
}

/// Downloads images exactly once and stores them under the output root
pub struct ImagePipeline {
    fetcher: HttpFetcher,
    output_root: PathBuf,
    cells: Mutex<HashMap<String, Arc<OnceCell<ImageOutcome>>>>,
    stats: Arc<StatsRecorder>,
}

impl ImagePipeline {
    pub fn new(fetcher: HttpFetcher, output_root: impl Into<PathBuf>, stats: Arc<StatsRecorder>) -> Self {
        Self {
            fetcher,
            output_root: output_root.into(),
            cells: Mutex::new(HashMap::new()),
            stats,
        }
    }

    /// Number of distinct image URLs requested so far
    pub fn distinct(&self) -> usize {
        self.cells
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn cell(&self, source_url: &str) -> Arc<OnceCell<ImageOutcome>> {
        let mut cells = self
            .cells
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cells
            .entry(source_url.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Makes sure the referenced image exists on disk
    ///
    /// # Arguments
    ///
    /// * `image` - Source URL and root-relative target path
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Absolute path of the stored image
    /// * `Err(MirrorError)` - The download or write failed (now or earlier in the run)
    pub async fn ensure(&self, image: &ImageReference) -> Result<PathBuf> {
        let cell = self.cell(&image.source_url);
        let outcome = cell
            .get_or_init(|| async {
                let target = self.output_root.join(&image.local_path);
                let outcome = match self.download(&image.source_url, &target).await {
                    Ok(()) => {
                        debug!("Saved image {} -> {}", image.source_url, target.display());
                        ImageOutcome::Saved(target)
                    }
                    Err(e) => {
                        warn!("Failed to download image {}: {}", image.source_url, e);
                        ImageOutcome::Failed(e.to_string())
                    }
                };
                self.stats
                    .record_image(matches!(outcome, ImageOutcome::Saved(_)));
                outcome
            })
            .await;

        match outcome {
            ImageOutcome::Saved(path) => Ok(path.clone()),
            ImageOutcome::Failed(message) => Err(MirrorError::Transport {
                url: image.source_url.clone(),
                message: message.clone(),
            }),
        }
    }

    async fn download(&self, source_url: &str, target: &Path) -> Result<()> {
        let fetched = self.fetcher.get(source_url).await?;
        write_atomic(target, &fetched.body).await
    }
}

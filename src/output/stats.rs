//! Run statistics
//!
//! Workers report outcomes through a [`StatsRecorder`] owned by the mirror;
//! at the end of the run it is frozen into an immutable [`RunStats`] snapshot.

use crate::state::PageOutcome;
use chrono::{DateTime, Local};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Immutable snapshot of a run's counters
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    /// Distinct in-scope page URLs seen (seeds plus discovered links)
    pub discovered: u64,

    /// Pages written to disk
    pub downloaded: u64,

    /// Pages not written (already present or no content)
    pub skipped: u64,

    /// Pages whose processing failed
    pub failed: u64,

    /// Distinct images written to disk
    pub images_downloaded: u64,

    /// Distinct images that could not be downloaded
    pub images_failed: u64,

    /// Wall-clock start of the run
    pub started_at: DateTime<Local>,

    /// Time from start to snapshot
    pub elapsed: Duration,
}

impl RunStats {
    /// Pages that reached a final outcome
    pub fn processed(&self) -> u64 {
        self.downloaded + self.skipped + self.failed
    }

    /// Throughput over the whole run
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.processed() as f64 / secs
        } else {
            0.0
        }
    }
}

#[derive(Debug, Default)]
struct RunCounters {
    discovered: u64,
    downloaded: u64,
    skipped: u64,
    failed: u64,
    images_downloaded: u64,
    images_failed: u64,
}

/// Synchronized, run-wide counters
#[derive(Debug)]
pub struct StatsRecorder {
    counters: Mutex<RunCounters>,
    started_at: DateTime<Local>,
    started: Instant,
}

impl Default for StatsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsRecorder {
    /// Starts a new set of counters at zero
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(RunCounters::default()),
            started_at: Local::now(),
            started: Instant::now(),
        }
    }

    fn counters(&self) -> MutexGuard<'_, RunCounters> {
        // Counters stay meaningful even if a holder panicked mid-increment
        self.counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records newly discovered page URLs
    pub fn record_discovered(&self, count: u64) {
        self.counters().discovered += count;
    }

    /// Records the final outcome of one page
    pub fn record_page(&self, outcome: &PageOutcome) {
        let mut counters = self.counters();
        match outcome {
            PageOutcome::Downloaded { .. } => counters.downloaded += 1,
            PageOutcome::Skipped(_) => counters.skipped += 1,
            PageOutcome::Failed(_) => counters.failed += 1,
        }
    }

    /// Records the result of one distinct image download
    pub fn record_image(&self, success: bool) {
        let mut counters = self.counters();
        if success {
            counters.images_downloaded += 1;
        } else {
            counters.images_failed += 1;
        }
    }

    /// Freezes the current counters into a snapshot
    pub fn snapshot(&self) -> RunStats {
        let counters = self.counters();
        RunStats {
            discovered: counters.discovered,
            downloaded: counters.downloaded,
            skipped: counters.skipped,
            failed: counters.failed,
            images_downloaded: counters.images_downloaded,
            images_failed: counters.images_failed,
            started_at: self.started_at,
            elapsed: self.started.elapsed(),
        }
    }
}

/// Prints the end-of-run summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_summary(stats: &RunStats) {
    println!("=== Mirror Summary ===\n");

    println!("Pages:");
    println!("  Discovered: {}", stats.discovered);
    println!("  Downloaded: {}", stats.downloaded);
    println!("  Skipped: {}", stats.skipped);
    println!("  Failed: {}", stats.failed);
    println!();

    println!("Images:");
    println!("  Downloaded: {}", stats.images_downloaded);
    println!("  Failed: {}", stats.images_failed);
    println!();

    println!(
        "Started {} | {:.1}s elapsed | {:.2} pages/sec",
        stats.started_at.format("%Y-%m-%d %H:%M:%S"),
        stats.elapsed.as_secs_f64(),
        stats.pages_per_second()
    );
}

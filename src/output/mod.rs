//! Output module for persisting pages and reporting results
//!
//! This module handles:
//! - Writing Markdown pages and image payloads atomically under the output root
//! - Recording run statistics and printing the final summary

pub mod stats;
mod writer;

pub use stats::{print_summary, RunStats, StatsRecorder};
pub use writer::{write_atomic, write_markdown};

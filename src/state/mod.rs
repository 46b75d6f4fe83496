//! State module for per-page results
//!
//! # Components
//!
//! - `PageOutcome`: how processing of one claimed page ended (downloaded, skipped, failed)
//! - `SkipReason`: why a page was deliberately not written

mod page_outcome;

// Re-export main types
pub use page_outcome::{PageOutcome, SkipReason};

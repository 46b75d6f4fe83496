//! URL handling module for docmirror
//!
//! This module provides:
//! - URL normalization into [`PageUrl`], the deduplication key of a run
//! - [`SiteScope`], deciding which links belong to the mirrored site
//! - href resolution against a page URL
//! - derivation of output file paths for pages and images

mod normalize;
mod paths;
mod resolve;
mod scope;

// Re-export main types and functions
pub use normalize::{normalize_parsed, normalize_url, PageUrl};
pub use paths::{image_link_prefix, image_local_path, page_output_path, IMAGE_DIR};
pub use resolve::resolve_href;
pub use scope::SiteScope;

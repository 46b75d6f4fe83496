//! Content extraction
//!
//! This module turns a parsed page into its content region:
//! - choosing the main-content node per site family
//! - removing navigation, pagination, copy buttons and other site furniture
//! - removing heading permalink anchors
//! - resolving the page title

mod boilerplate;
mod content;
mod permalink;

pub use boilerplate::is_furniture;
pub use content::{ContentExtractor, ExtractedPage};
pub use permalink::{clean_heading_text, heading_level, heading_text, is_permalink_anchor};

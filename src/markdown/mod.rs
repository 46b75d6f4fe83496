//! HTML to Markdown conversion
//!
//! This module provides:
//! - [`ElementKind`], the closed set of element categories the converter handles
//! - [`MarkdownConverter`], a depth-first walk that emits normalized Markdown
//!   and collects image references
//! - post-processing, title composition and stub detection

mod converter;
mod element;
mod postprocess;

pub use converter::{Conversion, ImageReference, MarkdownConverter};
pub use element::ElementKind;
pub use postprocess::{compose_document, is_stub, postprocess};

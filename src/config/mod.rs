//! Configuration module for docmirror
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every field has a default, so a file is optional; the command line supplies
//! or overrides the values that matter most (base URL, output directory,
//! concurrency, skip-existing).
//!
//! # Example
//!
//! ```no_run
//! use docmirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Workers: {}", config.mirror.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ContentConfig, HttpConfig, MirrorConfig, UserAgentConfig};

// Re-export parser and validation functions
pub use parser::{load_config, read_config};
pub use validation::{validate, validate_selector};

//! Configuration module for docsync
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so the binary also runs without a file.
//!
//! # Example
//!
//! ```no_run
//! use docsync::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("docsync.toml")).unwrap();
//! println!("Pages go to: {}", config.output.content_dir.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, read_config_with_hash,
};
pub use validation::validate;

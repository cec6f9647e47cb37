//! Output module for writing synced pages to disk
//!
//! This module handles:
//! - Deriving deterministic output paths from page URLs
//! - Converting HTML to Markdown and plain text
//! - Writing the selected URL list
//! - Displaying run statistics

mod convert;
mod paths;
pub mod stats;
mod url_list;
mod writer;

pub use convert::{Converter, HtmlConverter};
pub use paths::{resolve_output_path, MAX_PATH_LEN, TRUNCATED_STEM_LEN};
pub use stats::{format_statistics, print_statistics};
pub use url_list::{store_urls, url_list_bucket, URL_LIST_FILE};
pub use writer::{write_output, OutputError, OutputKind, OutputOptions};

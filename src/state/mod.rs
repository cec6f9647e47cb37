//! State module for change detection across runs
//!
//! # Components
//!
//! - `PageState`: the URL to content-hash mapping from the last successful writes
//! - `StateStore`: loads and atomically saves that mapping as JSON

mod page_state;
mod store;

// Re-export main types
pub use page_state::{calculate_hash, PageState};
pub use store::{StateError, StateStore};

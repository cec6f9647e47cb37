//! Run statistics display
//!
//! This module formats [`StatsSnapshot`] totals for the terminal.

use crate::crawler::StatsSnapshot;

/// Formats the totals block for a snapshot
///
/// # Arguments
///
/// * `stats` - The counters to display
/// * `detailed` - Include the sync counters and last URL
pub fn format_statistics(stats: &StatsSnapshot, detailed: bool) -> String {
    let mut out = String::new();

    out.push_str("=== Statistics ===\n");
    out.push_str(&format!("  Processed: {}\n", stats.processed));
    out.push_str(&format!("  Relevant:  {}\n", stats.relevant));
    out.push_str(&format!("  Errors:    {}\n", stats.errors));

    if detailed {
        out.push_str(&format!("  Written:   {}\n", stats.written));
        out.push_str(&format!("  Unchanged: {}\n", stats.unchanged));
        if let Some(url) = &stats.current_url {
            out.push_str(&format!("  Last URL:  {}\n", url));
        }
    }

    out
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &StatsSnapshot, detailed: bool) {
    print!("{}", format_statistics(stats, detailed));
}

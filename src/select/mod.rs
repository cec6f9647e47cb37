//! Page selection
//!
//! The sync phase only sees the list of URLs a [`PageSelector`] returns.
//! [`SelectionState`] holds the interactive selection logic without any I/O;
//! [`TerminalSelector`] drives it from a terminal.

mod terminal;

pub use terminal::{truncate_title, TerminalSelector};

use crate::crawler::Sitemap;
use crate::{Result, SyncError};
use std::collections::BTreeSet;
use std::io;
use std::ops::RangeInclusive;

/// Entries shown per page
pub const PAGE_SIZE: usize = 10;

/// Chooses which sitemap pages to sync
pub trait PageSelector {
    /// Returns the chosen URLs in sitemap order
    fn select_pages(&mut self, sitemap: &Sitemap) -> io::Result<Vec<String>>;
}

/// Selects every page without asking
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectAll;

impl PageSelector for SelectAll {
    fn select_pages(&mut self, sitemap: &Sitemap) -> io::Result<Vec<String>> {
        Ok(sitemap.urls())
    }
}

/// Runs a selector and rejects an empty selection
pub fn choose_pages(sitemap: &Sitemap, selector: &mut dyn PageSelector) -> Result<Vec<String>> {
    let selected = selector
        .select_pages(sitemap)
        .map_err(SyncError::Selection)?;

    if selected.is_empty() {
        return Err(SyncError::NothingSelected);
    }
    tracing::info!("Selected {} of {} pages", selected.len(), sitemap.len());
    Ok(selected)
}

/// A parsed selection command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Toggle these inclusive ranges of 1-based indices
    Toggle(Vec<RangeInclusive<usize>>),
    All,
    Clear,
    Next,
    Prev,
    Done,
}

/// Parses one line of selection input
///
/// Accepts `all`, `none`, `n`, `p`, `done`, or a list of indices and
/// inclusive ranges separated by spaces or commas (`1 3 5-7`). Returns
/// `None` for anything else.
pub fn parse_command(input: &str) -> Option<Command> {
    let input = input.trim();
    match input.to_ascii_lowercase().as_str() {
        "" => return None,
        "all" | "a" => return Some(Command::All),
        "none" => return Some(Command::Clear),
        "n" | "next" => return Some(Command::Next),
        "p" | "prev" => return Some(Command::Prev),
        "done" | "d" | "q" => return Some(Command::Done),
        _ => {}
    }

    let mut ranges = Vec::new();
    for token in input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        match token.split_once('-') {
            Some((start, end)) => {
                let start: usize = start.trim().parse().ok()?;
                let end: usize = end.trim().parse().ok()?;
                if start == 0 || end < start {
                    return None;
                }
                ranges.push(start..=end);
            }
            None => {
                let index: usize = token.parse().ok()?;
                if index == 0 {
                    return None;
                }
                ranges.push(index..=index);
            }
        }
    }

    Some(Command::Toggle(ranges))
}

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    Invalid(String),
    Done,
}

/// Paginated multi-selection over a sitemap's entries
#[derive(Debug, Clone)]
pub struct SelectionState {
    entries: Vec<(String, String)>,
    selected: BTreeSet<usize>,
    page: usize,
}

impl SelectionState {
    pub fn new(sitemap: &Sitemap) -> Self {
        Self {
            entries: sitemap
                .iter()
                .map(|(url, title)| (url.clone(), title.clone()))
                .collect(),
            selected: BTreeSet::new(),
            page: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Zero-based current page
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.entries.len().div_ceil(PAGE_SIZE).max(1)
    }

    /// Entries on the current page with their 1-based indices
    pub fn visible(&self) -> impl Iterator<Item = (usize, &str, &str)> {
        let start = self.page * PAGE_SIZE;
        self.entries
            .iter()
            .enumerate()
            .skip(start)
            .take(PAGE_SIZE)
            .map(|(i, (url, title))| (i + 1, url.as_str(), title.as_str()))
    }

    /// Whether the entry at a 1-based index is selected
    pub fn is_selected(&self, index: usize) -> bool {
        index > 0 && self.selected.contains(&(index - 1))
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected URLs in sitemap order
    pub fn selected_urls(&self) -> Vec<String> {
        self.selected
            .iter()
            .map(|&i| self.entries[i].0.clone())
            .collect()
    }

    /// Applies a command; an invalid command leaves the selection unchanged
    pub fn apply(&mut self, command: Command) -> Step {
        match command {
            Command::Toggle(ranges) => {
                if let Some(bad) = ranges
                    .iter()
                    .find(|r| *r.start() == 0 || *r.end() > self.len())
                {
                    let shown = if bad.start() == bad.end() {
                        bad.start().to_string()
                    } else {
                        format!("{}-{}", bad.start(), bad.end())
                    };
                    return Step::Invalid(format!(
                        "{} is out of range (1-{})",
                        shown,
                        self.len()
                    ));
                }
                for index in ranges.into_iter().flatten() {
                    if !self.selected.remove(&(index - 1)) {
                        self.selected.insert(index - 1);
                    }
                }
            }
            Command::All => self.selected = (0..self.len()).collect(),
            Command::Clear => self.selected.clear(),
            Command::Next => {
                if self.page + 1 < self.page_count() {
                    self.page += 1;
                }
            }
            Command::Prev => self.page = self.page.saturating_sub(1),
            Command::Done => return Step::Done,
        }
        Step::Continue
    }

    /// Parses and applies one line of input
    pub fn handle_input(&mut self, input: &str) -> Step {
        match parse_command(input) {
            Some(command) => self.apply(command),
            None => Step::Invalid(format!("Unrecognized input: '{}'", input.trim())),
        }
    }
}

/// Per-page content digests carried between runs
///
/// This module defines the URL to content-hash mapping used for change detection.
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Computes the SHA-256 digest of page content as 64 lowercase hex characters
///
/// # Example
///
/// ```
/// use docsync::calculate_hash;
///
/// assert_eq!(calculate_hash("abc").len(), 64);
/// assert_eq!(calculate_hash("abc"), calculate_hash("abc"));
/// ```
pub fn calculate_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// The content hash last written for each URL
///
/// Serializes as a plain JSON object with sorted keys. An entry means the
/// URL was fetched and fully written with that hash in some earlier run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageState {
    hashes: BTreeMap<String, String>,
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored hash for a URL
    pub fn get(&self, url: &str) -> Option<&str> {
        self.hashes.get(url).map(String::as_str)
    }

    /// Records a hash for a URL, returning the previous one
    pub fn insert(&mut self, url: impl Into<String>, hash: impl Into<String>) -> Option<String> {
        self.hashes.insert(url.into(), hash.into())
    }

    /// Returns true if the URL was seen before with exactly this hash
    pub fn is_unchanged(&self, url: &str, hash: &str) -> bool {
        self.get(url) == Some(hash)
    }

    /// Applies every entry of `other`, overwriting existing hashes
    pub fn merge(&mut self, other: PageState) {
        self.hashes.extend(other.hashes);
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Iterates entries sorted by URL
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.hashes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl IntoIterator for PageState {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.hashes.into_iter()
    }
}

impl FromIterator<(String, String)> for PageState {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            hashes: iter.into_iter().collect(),
        }
    }
}

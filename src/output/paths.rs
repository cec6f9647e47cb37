//! Output path derivation
//!
//! Maps a URL path to a file path relative to the output root. The mapping
//! is pure: identical inputs always produce identical paths, across runs and
//! machines.

use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Longest relative path emitted before falling back to a hashed file name
pub const MAX_PATH_LEN: usize = 255;

/// Length the flattened stem is cut to when the path overflows
pub const TRUNCATED_STEM_LEN: usize = 200;

/// Hex characters of the path digest appended to a truncated stem
const HASH_FRAGMENT_LEN: usize = 5;

/// File stem used for the site root
const INDEX_STEM: &str = "index";

/// Replaces characters that are invalid in file names on common filesystems
pub(crate) fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Drops the final extension of a segment, if it has one
///
/// A leading dot does not start an extension (`.config` keeps its name).
fn strip_extension(segment: &str) -> &str {
    match segment.rfind('.') {
        Some(idx) if idx > 0 => &segment[..idx],
        _ => segment,
    }
}

/// Splits a URL path into sanitized directory segments and a file stem
fn split_path(url_path: &str) -> (Vec<String>, String) {
    let mut segments: Vec<String> = url_path
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(sanitize_segment)
        .collect();

    let stem = match segments.pop() {
        Some(last) => strip_extension(&last).to_string(),
        None => INDEX_STEM.to_string(),
    };

    (segments, stem)
}

/// Resolves the output path for a URL path
///
/// # Arguments
///
/// * `url_path` - The path component of the page URL (e.g. `/en/guide/intro`)
/// * `flatten` - Collapse directories into one file name joined with `_`
/// * `suffix` - File suffix including the dot (e.g. `.md`); replaces any
///   extension on the final segment
///
/// # Overflow
///
/// If the relative path would exceed [`MAX_PATH_LEN`] characters, the result
/// is a single file name: the flattened stem cut to [`TRUNCATED_STEM_LEN`]
/// characters, then five hex characters of the SHA-256 of the over-length
/// path, then the suffix.
///
/// # Examples
///
/// ```
/// use docsync::output::resolve_output_path;
/// use std::path::PathBuf;
///
/// assert_eq!(
///     resolve_output_path("/en/guide/intro", false, ".md"),
///     PathBuf::from("en").join("guide").join("intro.md")
/// );
/// assert_eq!(
///     resolve_output_path("/en/guide/intro", true, ".md"),
///     PathBuf::from("en_guide_intro.md")
/// );
/// ```
pub fn resolve_output_path(url_path: &str, flatten: bool, suffix: &str) -> PathBuf {
    let (dirs, stem) = split_path(url_path);

    let flat_stem = if dirs.is_empty() {
        stem.clone()
    } else {
        format!("{}_{}", dirs.join("_"), stem)
    };

    let relative = if flatten {
        format!("{}{}", flat_stem, suffix)
    } else if dirs.is_empty() {
        format!("{}{}", stem, suffix)
    } else {
        format!("{}/{}{}", dirs.join("/"), stem, suffix)
    };

    if relative.chars().count() > MAX_PATH_LEN {
        return PathBuf::from(overflow_file_name(&flat_stem, &relative, suffix));
    }

    if flatten {
        PathBuf::from(relative)
    } else {
        let mut path: PathBuf = dirs.iter().collect();
        path.push(format!("{}{}", stem, suffix));
        path
    }
}

/// Builds the short, deterministic fallback name for an over-length path
fn overflow_file_name(flat_stem: &str, full_path: &str, suffix: &str) -> String {
    let truncated: String = flat_stem.chars().take(TRUNCATED_STEM_LEN).collect();
    let digest = hex::encode(Sha256::digest(full_path.as_bytes()));
    format!("{}{}{}", truncated, &digest[..HASH_FRAGMENT_LEN], suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_path(segments: usize) -> String {
        (0..segments)
            .map(|i| format!("/section-{:02}-with-a-rather-long-name", i))
            .collect()
    }

    #[test]
    fn test_nested_mirrors_hierarchy() {
        assert_eq!(
            resolve_output_path("/en/guide/intro", false, ".md"),
            PathBuf::from("en/guide/intro.md")
        );
    }

    #[test]
    fn test_flatten_joins_with_underscore() {
        assert_eq!(
            resolve_output_path("/en/guide/intro", true, ".html"),
            PathBuf::from("en_guide_intro.html")
        );
        assert_eq!(
            resolve_output_path("/intro", true, ".md"),
            PathBuf::from("intro.md")
        );
    }

    #[test]
    fn test_trailing_slash_ignored() {
        assert_eq!(
            resolve_output_path("/en/guide/", false, ".md"),
            resolve_output_path("/en/guide", false, ".md")
        );
    }

    #[test]
    fn test_root_maps_to_index() {
        assert_eq!(resolve_output_path("/", false, ".md"), PathBuf::from("index.md"));
        assert_eq!(resolve_output_path("", true, ".txt"), PathBuf::from("index.txt"));
    }

    #[test]
    fn test_suffix_replaces_extension() {
        assert_eq!(
            resolve_output_path("/api/page.html", false, ".md"),
            PathBuf::from("api/page.md")
        );
        assert_eq!(
            resolve_output_path("/api/.hidden", false, ".md"),
            PathBuf::from("api/.hidden.md")
        );
    }

    #[test]
    fn test_traversal_segments_dropped() {
        assert_eq!(
            resolve_output_path("/en/../../etc/passwd", false, ".md"),
            PathBuf::from("en/etc/passwd.md")
        );
    }

    #[test]
    fn test_invalid_characters_replaced() {
        assert_eq!(
            resolve_output_path("/api/a:b*c?", true, ".md"),
            PathBuf::from("api_a_b_c_.md")
        );
    }

    #[test]
    fn test_deterministic() {
        let path = long_path(12);
        for flatten in [false, true] {
            assert_eq!(
                resolve_output_path(&path, flatten, ".md"),
                resolve_output_path(&path, flatten, ".md")
            );
        }
    }

    #[test]
    fn test_overflow_is_bounded_and_keeps_suffix() {
        let path = long_path(12);
        for flatten in [false, true] {
            for suffix in [".md", ".html", ".txt"] {
                let resolved = resolve_output_path(&path, flatten, suffix);
                let name = resolved.to_str().unwrap();
                assert!(name.chars().count() <= MAX_PATH_LEN, "{}", name);
                assert!(name.ends_with(suffix));
                assert_eq!(resolved.components().count(), 1);
                assert_eq!(
                    name.chars().count(),
                    TRUNCATED_STEM_LEN + HASH_FRAGMENT_LEN + suffix.len()
                );
            }
        }
    }

    #[test]
    fn test_overflow_names_differ_for_different_paths() {
        let a = format!("{}/a", long_path(12));
        let b = format!("{}/b", long_path(12));
        assert_ne!(
            resolve_output_path(&a, true, ".md"),
            resolve_output_path(&b, true, ".md")
        );
    }

    #[test]
    fn test_path_at_limit_is_kept() {
        let stem = "x".repeat(MAX_PATH_LEN - 3);
        let resolved = resolve_output_path(&format!("/{}", stem), true, ".md");
        assert_eq!(resolved, PathBuf::from(format!("{}.md", stem)));
    }
}

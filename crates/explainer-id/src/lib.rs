//! Identifier generation for explainers.
//!
//! An id is a human-readable slug of the title followed by a hyphen and a
//! suffix. The suffix is either random ([`make_id`]) or derived from the
//! title and source markdown ([`content_id`]), selected by [`IdStrategy`].
//!
//! ```
//! let id = explainer_id::make_id("Hello, World!");
//! assert!(id.starts_with("hello-world-"));
//! ```

use std::fmt;
use std::str::FromStr;

use rand::RngExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Slug used when a title has no usable characters.
pub const FALLBACK_SLUG: &str = "untitled";

/// Length of the random suffix (about 62 bits of entropy).
pub const RANDOM_SUFFIX_LEN: usize = 12;

/// Length of the content-derived suffix, in hex digits.
pub const CONTENT_SUFFIX_LEN: usize = 16;

const MAX_SLUG_LEN: usize = 80;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Derive a URL-safe slug from a title.
///
/// Decomposes the title, drops combining marks and anything but ASCII word
/// characters, whitespace and hyphens, then joins whitespace runs with a
/// single hyphen and lowercases. Leading and trailing hyphens are dropped.
/// Never empty.
///
/// ```
/// use explainer_id::slugify;
///
/// assert_eq!(slugify("Crème Brûlée Recipe"), "creme-brulee-recipe");
/// assert_eq!(slugify("???"), "untitled");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    let cleaned: String = title
        .nfd()
        .filter(|&c| !is_combining_mark(c))
        .filter(|&c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c.is_whitespace())
        .collect();

    // Ids may not start with a hyphen.
    let mut slug = cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .trim_matches('-')
        .to_ascii_lowercase();

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        let trimmed_len = slug.trim_end_matches('-').len();
        slug.truncate(trimmed_len);
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_owned()
    } else {
        slug
    }
}

/// Slug of `title` plus a random suffix.
///
/// Two calls almost surely differ, but uniqueness is not guaranteed; a
/// store rejects the rare collision and the caller retries.
#[must_use]
pub fn make_id(title: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect();
    format!("{}-{suffix}", slugify(title))
}

/// Slug of `title` plus a suffix hashed from the title and source markdown.
///
/// Identical input always yields the identical id.
#[must_use]
pub fn content_id(title: &str, source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update([0u8]);
    hasher.update(source.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}-{}", slugify(title), &digest[..CONTENT_SUFFIX_LEN])
}

/// How id suffixes are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Random suffix; regenerating the same input gives a new id.
    #[default]
    Random,
    /// Hash of title and source; regenerating the same input is idempotent.
    Content,
}

impl IdStrategy {
    /// Generate an id for a document with this strategy.
    #[must_use]
    pub fn generate(self, title: &str, source: &str) -> String {
        match self {
            Self::Random => make_id(title),
            Self::Content => content_id(title, source),
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Random => "random",
            Self::Content => "content",
        })
    }
}

/// Unrecognized [`IdStrategy`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown id strategy {0:?} (expected \"random\" or \"content\")")]
pub struct UnknownStrategy(pub String);

impl FromStr for IdStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "content" => Ok(Self::Content),
            _ => Err(UnknownStrategy(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn suffix(id: &str) -> &str {
        id.rsplit_once('-').map_or("", |(_, suffix)| suffix)
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Leading and trailing  "), "leading-and-trailing");
        assert_eq!(slugify("Tabs\tand\nnewlines"), "tabs-and-newlines");
    }

    #[test]
    fn test_slugify_keeps_hyphen_and_underscore() {
        assert_eq!(slugify("snake_case vs kebab-case"), "snake_case-vs-kebab-case");
    }

    #[test]
    fn test_slugify_strips_diacritics() {
        assert_eq!(slugify("Ångström Café"), "angstrom-cafe");
        assert_eq!(slugify("naïve résumé"), "naive-resume");
    }

    #[test]
    fn test_slugify_drops_non_ascii_letters() {
        assert_eq!(slugify("Rust 入門 guide"), "rust-guide");
    }

    #[test]
    fn test_slugify_fallback() {
        assert_eq!(slugify(""), FALLBACK_SLUG);
        assert_eq!(slugify("!!! ???"), FALLBACK_SLUG);
        assert_eq!(slugify("日本語"), FALLBACK_SLUG);
    }

    #[test]
    fn test_slugify_trims_edge_hyphens() {
        assert_eq!(slugify("-Quick Sort"), "quick-sort");
        assert_eq!(slugify("- Intro -"), "intro");
        assert_eq!(slugify("a - b"), "a---b");
        assert_eq!(slugify("---"), FALLBACK_SLUG);
    }

    #[test]
    fn test_ids_never_start_with_hyphen() {
        for title in ["-x", "- Intro", "--", "-- Setup --"] {
            assert!(!make_id(title).starts_with('-'), "{title}");
            assert!(!content_id(title, "src").starts_with('-'), "{title}");
        }
        assert!(make_id("-x").starts_with("x-"));
    }

    #[test]
    fn test_slugify_truncates() {
        let title = "word ".repeat(40);
        let slug = slugify(&title);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
        assert!(slug.starts_with("word-word"));
    }

    #[test]
    fn test_make_id_format() {
        let id = make_id("Hello, World!");
        assert!(id.starts_with("hello-world-"));
        let suffix = suffix(&id);
        assert_eq!(suffix.len(), RANDOM_SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn test_make_id_differs() {
        assert_ne!(make_id("Hello, World!"), make_id("Hello, World!"));
    }

    #[test]
    fn test_make_id_empty_title() {
        assert!(make_id("").starts_with("untitled-"));
    }

    #[test]
    fn test_content_id_deterministic() {
        let a = content_id("Sorting", "```rust\nv.sort();\n```");
        let b = content_id("Sorting", "```rust\nv.sort();\n```");
        assert_eq!(a, b);
        assert!(a.starts_with("sorting-"));
        assert_eq!(suffix(&a).len(), CONTENT_SUFFIX_LEN);
    }

    #[test]
    fn test_content_id_depends_on_source_and_title() {
        let base = content_id("Sorting", "a");
        assert_ne!(base, content_id("Sorting", "b"));
        assert_ne!(suffix(&base), suffix(&content_id("Sorting!", "a")));
    }

    #[test]
    fn test_content_id_field_boundary() {
        assert_ne!(
            suffix(&content_id("ab", "c")),
            suffix(&content_id("a", "bc"))
        );
    }

    #[test]
    fn test_strategy_parse_and_display() {
        assert_eq!("content".parse::<IdStrategy>().unwrap(), IdStrategy::Content);
        assert_eq!(" Random ".parse::<IdStrategy>().unwrap(), IdStrategy::Random);
        assert!("sequential".parse::<IdStrategy>().is_err());
        assert_eq!(IdStrategy::Content.to_string(), "content");
        assert_eq!(IdStrategy::default(), IdStrategy::Random);
    }

    #[test]
    fn test_strategy_generate() {
        let a = IdStrategy::Content.generate("T", "src");
        assert_eq!(a, content_id("T", "src"));
        assert!(IdStrategy::Random.generate("T", "src").starts_with("t-"));
    }
}

//! Heading text to anchor id.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static NON_SLUG_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));

/// Convert heading text into a URL-safe anchor id.
///
/// Lower-cases the text, collapses every run of characters outside
/// `[a-z0-9]` into a single hyphen and trims hyphens from both ends.
///
/// # Examples
///
/// ```
/// use docshelf::parser::slugify;
///
/// assert_eq!(slugify("Getting Started!"), "getting-started");
/// assert_eq!(slugify("  ---  "), "");
/// ```
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    NON_SLUG_RUN
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Hands out collision-free ids for one render.
///
/// The first occurrence of a slug keeps it unchanged; later ones get a
/// numeric suffix (`intro`, `intro-1`, `intro-2`).
#[derive(Debug, Default)]
pub struct SlugRegistry {
    seen: HashMap<String, usize>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `slug`, returning the id to use for it.
    pub fn claim(&mut self, slug: String) -> String {
        let count = self.seen.entry(slug.clone()).or_insert(0);
        let id = if *count == 0 {
            slug
        } else {
            format!("{}-{}", slug, count)
        };
        *count += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Getting Started!"), "getting-started");
        assert_eq!(slugify("API Reference"), "api-reference");
        assert_eq!(slugify("1. Getting Started"), "1-getting-started");
    }

    #[test]
    fn test_slugify_only_separators() {
        assert_eq!(slugify("  ---  "), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_collapses_runs() {
        assert_eq!(slugify("a -- b__c"), "a-b-c");
        assert_eq!(slugify("--Edge--"), "edge");
    }

    #[test]
    fn test_slugify_non_ascii_is_separator() {
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
    }

    #[test]
    fn test_slugify_output_alphabet() {
        let inputs = ["Hello, World!", "  x  ", "Ünïcødé 42", "a/b\\c", "ALL CAPS"];
        for input in inputs {
            let slug = slugify(input);
            assert!(
                slug.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            );
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            assert!(!slug.contains("--"));
        }
    }

    #[test]
    fn test_registry_suffixes_collisions() {
        let mut registry = SlugRegistry::new();
        assert_eq!(registry.claim("intro".to_string()), "intro");
        assert_eq!(registry.claim("intro".to_string()), "intro-1");
        assert_eq!(registry.claim("other".to_string()), "other");
        assert_eq!(registry.claim("intro".to_string()), "intro-2");
    }
}

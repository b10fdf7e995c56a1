//! Search-suggestion rules.
//!
//! Suggestions are only requested for keywords of at least
//! [`MIN_KEYWORD_LEN`] characters (after trimming), after
//! [`SUGGEST_DEBOUNCE`] of typing inactivity. When the backend's suggestion
//! endpoint fails, the [`POPULAR_SEARCHES`] list filtered by
//! case-insensitive substring match stands in for it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Minimum trimmed keyword length before suggestions are requested.
pub const MIN_KEYWORD_LEN: usize = 2;

/// Typing inactivity before a suggestion request fires.
pub const SUGGEST_DEBOUNCE: Duration = Duration::from_millis(300);

/// Recent searches kept per shopper.
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Terms offered when there is nothing better to show.
pub const POPULAR_SEARCHES: [&str; 7] = [
    "iPhone",
    "Samsung",
    "Laptop",
    "Headphones",
    "Shoes",
    "Dress",
    "Watch",
];

/// A keyword long enough to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword(String);

impl Keyword {
    /// `None` when the trimmed input is shorter than [`MIN_KEYWORD_LEN`]
    /// characters, in which case the suggestion list is empty.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (trimmed.chars().count() >= MIN_KEYWORD_LEN).then(|| Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Keyword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Popular terms containing the keyword, case-insensitively.
#[must_use]
pub fn fallback_suggestions(keyword: &Keyword) -> Vec<String> {
    let needle = keyword.as_str().to_lowercase();
    POPULAR_SEARCHES
        .iter()
        .filter(|term| term.to_lowercase().contains(&needle))
        .map(|term| (*term).to_owned())
        .collect()
}

/// Where a suggestion list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSource {
    /// The keyword was too short; nothing was requested.
    None,
    Remote,
    Fallback,
}

/// Suggestions for one keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestions {
    pub items: Vec<String>,
    pub source: SuggestionSource,
}

impl Suggestions {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            source: SuggestionSource::None,
        }
    }

    #[must_use]
    pub const fn remote(items: Vec<String>) -> Self {
        Self {
            items,
            source: SuggestionSource::Remote,
        }
    }

    #[must_use]
    pub fn fallback(keyword: &Keyword) -> Self {
        Self {
            items: fallback_suggestions(keyword),
            source: SuggestionSource::Fallback,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The shopper's most recent searches, newest first, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentSearches(Vec<String>);

impl RecentSearches {
    /// Put `term` at the front, dropping any earlier copy and anything past
    /// [`MAX_RECENT_SEARCHES`]. Blank terms are ignored. Returns whether the
    /// list changed.
    pub fn record(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }

        let before = self.0.clone();
        self.0.retain(|existing| existing != term);
        self.0.insert(0, term.to_owned());
        self.0.truncate(MAX_RECENT_SEARCHES);
        self.0 != before
    }

    /// Remove one entry. Returns whether it was present.
    pub fn remove(&mut self, term: &str) -> bool {
        let len = self.0.len();
        self.0.retain(|existing| existing != term);
        self.0.len() != len
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_requires_two_trimmed_chars() {
        assert!(Keyword::parse("").is_none());
        assert!(Keyword::parse("a").is_none());
        assert!(Keyword::parse("  a  ").is_none());
        assert_eq!(Keyword::parse(" ip ").unwrap().as_str(), "ip");
    }

    #[test]
    fn test_keyword_counts_chars_not_bytes() {
        // One two-byte character is still too short
        assert!(Keyword::parse("é").is_none());
        assert!(Keyword::parse("éé").is_some());
    }

    #[test]
    fn test_fallback_is_case_insensitive_substring() {
        let keyword = Keyword::parse("PHONE").unwrap();
        assert_eq!(fallback_suggestions(&keyword), ["iPhone", "Headphones"]);

        let keyword = Keyword::parse("ss").unwrap();
        assert_eq!(fallback_suggestions(&keyword), ["Dress"]);

        let keyword = Keyword::parse("zz").unwrap();
        assert!(fallback_suggestions(&keyword).is_empty());
    }

    #[test]
    fn test_suggestions_constructors() {
        assert_eq!(Suggestions::empty().source, SuggestionSource::None);
        let keyword = Keyword::parse("wat").unwrap();
        let fallback = Suggestions::fallback(&keyword);
        assert_eq!(fallback.source, SuggestionSource::Fallback);
        assert_eq!(fallback.items, ["Watch"]);
    }

    #[test]
    fn test_recent_searches_most_recent_first_without_duplicates() {
        let mut recent = RecentSearches::default();
        recent.record("shoes");
        recent.record("laptop");
        recent.record("shoes");
        assert_eq!(recent.terms(), ["shoes", "laptop"]);
    }

    #[test]
    fn test_recent_searches_capped_at_five() {
        let mut recent = RecentSearches::default();
        for term in ["a1", "a2", "a3", "a4", "a5", "a6", "a7"] {
            recent.record(term);
        }
        assert_eq!(recent.terms(), ["a7", "a6", "a5", "a4", "a3"]);
    }

    #[test]
    fn test_recent_searches_ignore_blank() {
        let mut recent = RecentSearches::default();
        assert!(!recent.record("   "));
        assert!(recent.is_empty());
    }

    #[test]
    fn test_recent_searches_record_reports_change() {
        let mut recent = RecentSearches::default();
        assert!(recent.record("watch"));
        assert!(!recent.record("watch"));
        assert!(recent.record("dress"));
        assert!(recent.record("watch"));
    }

    #[test]
    fn test_recent_searches_remove() {
        let mut recent = RecentSearches::default();
        recent.record("watch");
        recent.record("dress");
        assert!(recent.remove("watch"));
        assert!(!recent.remove("watch"));
        assert_eq!(recent.terms(), ["dress"]);
    }
}

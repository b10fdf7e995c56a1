//! Data table component types.
//!
//! Shared by the products, orders and users lists: the filter dropdowns and
//! the "Showing N of M" footer.

/// Option for a filter dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    /// Option value.
    pub value: String,
    /// Display label.
    pub label: String,
    /// Whether this option is the active filter.
    pub selected: bool,
}

impl FilterOption {
    /// Create a new filter option, selected when `value` equals `current`.
    #[must_use]
    pub fn new(value: &str, label: &str, current: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            selected: value == current,
        }
    }

    /// Leading "all" option followed by `options`.
    #[must_use]
    pub fn with_all<'a>(
        all_label: &str,
        options: impl IntoIterator<Item = (&'a str, &'a str)>,
        current: &str,
    ) -> Vec<Self> {
        let current = if current.is_empty() { "all" } else { current };
        std::iter::once(Self::new("all", all_label, current))
            .chain(
                options
                    .into_iter()
                    .map(|(value, label)| Self::new(value, label, current)),
            )
            .collect()
    }
}

/// Counts for the list footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSummary {
    pub shown: usize,
    pub total: usize,
    /// Plural noun, e.g. "products".
    pub noun: &'static str,
}

impl ListSummary {
    #[must_use]
    pub const fn new(shown: usize, total: usize, noun: &'static str) -> Self {
        Self { shown, total, noun }
    }
}

impl std::fmt::Display for ListSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Showing {} of {} {}", self.shown, self.total, self.noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_all_marks_current() {
        let options = FilterOption::with_all("All Roles", [("admin", "Admin"), ("user", "User")], "admin");
        assert_eq!(options.len(), 3);
        assert!(!options[0].selected);
        assert!(options[1].selected);
    }

    #[test]
    fn test_with_all_defaults_to_all() {
        let options = FilterOption::with_all("All Roles", [("admin", "Admin")], "");
        assert!(options[0].selected);
        assert_eq!(options[0].value, "all");
    }

    #[test]
    fn test_summary_display() {
        assert_eq!(
            ListSummary::new(3, 10, "products").to_string(),
            "Showing 3 of 10 products"
        );
    }
}

//! Label catalog and per-image label selection.
//!
//! The catalog is an ordered list of known labels that only grows. The
//! selection is the set of labels attached to the current image and is
//! independent of catalog order.

use std::collections::HashSet;

/// Known labels plus the labels selected for the current image.
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    catalog: Vec<String>,
    selected: HashSet<String>,
    /// Bumped whenever the catalog changes, so views know to rebuild the checklist
    revision: u64,
}

impl LabelSet {
    /// Create a label set seeded with `defaults`, nothing selected.
    pub fn new<I, L>(defaults: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        let mut set = Self::default();
        for label in defaults {
            set.insert(label.into());
        }
        set.revision = 0;
        set
    }

    /// Labels in catalog order.
    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    /// Catalog revision counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Check whether `label` is in the catalog.
    pub fn contains(&self, label: &str) -> bool {
        self.catalog.iter().any(|l| l == label)
    }

    /// Add a user-entered label.
    ///
    /// The input is trimmed; blank input and labels already in the catalog
    /// are ignored. Returns true if the catalog grew.
    pub fn add(&mut self, raw: &str) -> bool {
        let label = raw.trim();
        if label.is_empty() || self.contains(label) {
            return false;
        }
        self.insert(label.to_string());
        log::debug!("Added label '{}'", label);
        true
    }

    /// Append every label in `labels` that the catalog does not know yet.
    ///
    /// Returns true if the catalog grew.
    pub fn merge<'a, I>(&mut self, labels: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut changed = false;
        for label in labels {
            if !self.contains(label) {
                self.insert(label.clone());
                changed = true;
            }
        }
        changed
    }

    /// Check or uncheck a catalog label. Unknown labels are ignored.
    pub fn set_selected(&mut self, label: &str, selected: bool) {
        if !self.contains(label) {
            log::debug!("Ignoring selection of unknown label '{}'", label);
            return;
        }
        if selected {
            self.selected.insert(label.to_string());
        } else {
            self.selected.remove(label);
        }
    }

    /// Check whether `label` is selected.
    pub fn is_selected(&self, label: &str) -> bool {
        self.selected.contains(label)
    }

    /// Replace the selection, merging unknown labels into the catalog first.
    ///
    /// Returns true if the catalog grew.
    pub fn restore_selection(&mut self, labels: &[String]) -> bool {
        let grew = self.merge(labels);
        self.selected = labels.iter().cloned().collect();
        grew
    }

    /// Uncheck every label.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Selected labels as a list (catalog order).
    pub fn selected_labels(&self) -> Vec<String> {
        self.catalog
            .iter()
            .filter(|l| self.selected.contains(*l))
            .cloned()
            .collect()
    }

    fn insert(&mut self, label: String) {
        self.catalog.push(label);
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> LabelSet {
        LabelSet::new(["Person", "Tier", "Nacht"])
    }

    #[test]
    fn test_seeded_catalog() {
        let set = labels();
        assert_eq!(set.catalog(), ["Person", "Tier", "Nacht"]);
        assert_eq!(set.revision(), 0);
        assert!(set.selected_labels().is_empty());
    }

    #[test]
    fn test_add_trims_and_ignores_duplicates() {
        let mut set = labels();
        assert!(set.add("  Sunset "));
        assert!(!set.add("Sunset"));
        assert!(!set.add("Person"));
        assert!(!set.add("   "));
        assert_eq!(set.catalog().iter().filter(|l| *l == "Sunset").count(), 1);
        assert_eq!(set.catalog().last().map(String::as_str), Some("Sunset"));
        assert_eq!(set.revision(), 1);
    }

    #[test]
    fn test_merge_appends_in_order() {
        let mut set = labels();
        let loaded = vec!["Tier".to_string(), "Beach".to_string(), "Fog".to_string()];
        assert!(set.merge(&loaded));
        assert_eq!(set.catalog(), ["Person", "Tier", "Nacht", "Beach", "Fog"]);
        assert!(!set.merge(&loaded));
    }

    #[test]
    fn test_check_and_uncheck() {
        let mut set = labels();
        set.set_selected("Tier", true);
        assert!(set.is_selected("Tier"));
        set.set_selected("Tier", false);
        assert!(!set.is_selected("Tier"));
        set.set_selected("Unknown", true);
        assert!(!set.is_selected("Unknown"));
    }

    #[test]
    fn test_restore_selection_merges() {
        let mut set = labels();
        set.set_selected("Person", true);
        assert!(set.restore_selection(&["Nacht".to_string(), "Beach".to_string()]));
        assert!(!set.is_selected("Person"));
        assert_eq!(set.selected_labels(), ["Nacht", "Beach"]);
        assert!(set.contains("Beach"));
    }
}
